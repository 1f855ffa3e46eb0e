//! Per-algorithm results and the comparative view over them.

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::measure::{MemorySample, TimingSample};
use crate::probes::SecurityProbeResult;

/// Complete results of one algorithm at one payload size. Once inserted in a
/// [`ComparativeReport`] it is only handed out by shared reference.
#[derive(Clone, Debug)]
pub struct BenchmarkReport {
    pub algorithm: String,
    pub payload_size: usize,
    pub iterations: usize,
    pub warmup: usize,
    pub encrypt: TimingSample,
    pub decrypt: TimingSample,
    pub memory: MemorySample,
    pub probes: SecurityProbeResult,
}

impl BenchmarkReport {
    pub fn encrypt_throughput_ops_sec(&self) -> f64 {
        self.encrypt.throughput_ops_sec()
    }

    pub fn decrypt_throughput_ops_sec(&self) -> f64 {
        self.decrypt.throughput_ops_sec()
    }
}

#[derive(Clone, Debug)]
pub enum ReportEntry {
    Valid(Box<BenchmarkReport>),
    /// The run failed; no numbers are kept for it.
    Invalid { algorithm: String, reason: String },
}

impl ReportEntry {
    pub fn algorithm(&self) -> &str {
        match self {
            ReportEntry::Valid(r) => &r.algorithm,
            ReportEntry::Invalid { algorithm, .. } => algorithm,
        }
    }

    pub fn report(&self) -> Option<&BenchmarkReport> {
        match self {
            ReportEntry::Valid(r) => Some(r.as_ref()),
            ReportEntry::Invalid { .. } => None,
        }
    }
}

/// Percentage differences `(a - b) / b * 100` between two algorithms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Delta {
    pub encrypt_latency_pct: f64,
    pub decrypt_latency_pct: f64,
    pub peak_memory_pct: f64,
}

pub fn pct_delta(a: f64, b: f64) -> Result<f64> {
    if b == 0.0 || !b.is_finite() || !a.is_finite() {
        return Err(BenchError::config(format!(
            "cannot compute a percentage delta against baseline {b}"
        )));
    }
    Ok((a - b) / b * 100.0)
}

/// All algorithm entries for one payload size, keyed by algorithm name in
/// insertion order. Entries are written once and never replaced.
#[derive(Clone, Debug, Default)]
pub struct ComparativeReport {
    pub payload_size: usize,
    entries: Vec<ReportEntry>,
}

impl ComparativeReport {
    pub fn new(payload_size: usize) -> Self {
        ComparativeReport {
            payload_size,
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, entry: ReportEntry) -> Result<()> {
        if self.get(entry.algorithm()).is_some() {
            return Err(BenchError::config(format!(
                "a result for {} at {} bytes is already recorded",
                entry.algorithm(),
                self.payload_size
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, algorithm: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.algorithm() == algorithm)
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.algorithm())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn comparable(&self, algorithm: &str) -> Result<&BenchmarkReport> {
        let entry = self.get(algorithm).ok_or_else(|| {
            BenchError::config(format!(
                "no result for {algorithm} at {} bytes",
                self.payload_size
            ))
        })?;
        match entry {
            ReportEntry::Invalid { reason, .. } => Err(BenchError::config(format!(
                "{algorithm} has no valid result to compare: {reason}"
            ))),
            ReportEntry::Valid(report) if !report.probes.all_passed() => {
                Err(BenchError::config(format!(
                    "refusing to compare {algorithm}: failed probes {:?}",
                    report.probes.failures()
                )))
            }
            ReportEntry::Valid(report) => Ok(report.as_ref()),
        }
    }

    /// Percentage difference of `a` relative to baseline `b`.
    ///
    /// Refused when either side is missing, invalid, or failed a probe.
    pub fn delta(&self, a: &str, b: &str) -> Result<Delta> {
        let ra = self.comparable(a)?;
        let rb = self.comparable(b)?;
        Ok(Delta {
            encrypt_latency_pct: pct_delta(ra.encrypt.mean_us(), rb.encrypt.mean_us())?,
            decrypt_latency_pct: pct_delta(ra.decrypt.mean_us(), rb.decrypt.mean_us())?,
            peak_memory_pct: pct_delta(ra.memory.avg_peak_kb(), rb.memory.avg_peak_kb())?,
        })
    }
}

/// Results of a whole run, one comparative report per payload size.
#[derive(Clone, Debug, Default)]
pub struct BenchmarkRun {
    pub config: BenchConfig,
    pub reports: Vec<ComparativeReport>,
    /// Set when the wall-clock budget stopped the run early.
    pub truncated: bool,
}

impl BenchmarkRun {
    pub fn for_payload(&self, payload_size: usize) -> Option<&ComparativeReport> {
        self.reports.iter().find(|r| r.payload_size == payload_size)
    }
}
