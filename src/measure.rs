//! Latency and memory measurement loops.

use std::hint::black_box;
use std::time::Instant;

use serde::Serialize;

use crate::alloc_track::TraceScope;
use crate::error::{BenchError, Result, Stage};

const NS_PER_US: f64 = 1_000.0;
const BYTES_PER_KB: f64 = 1024.0;

/// Per-iteration timings of one (algorithm, operation) pair. Read-only once
/// built.
#[derive(Clone, Debug, Serialize)]
pub struct TimingSample {
    /// Elapsed nanoseconds, in execution order.
    #[serde(skip)]
    samples_ns: Vec<u128>,
    n: usize,
    mean_us: f64,
    /// Sample standard deviation (N-1). Zero for a single sample.
    std_us: f64,
    min_us: f64,
    max_us: f64,
    p50_us: f64,
    p95_us: f64,
}

impl TimingSample {
    pub fn from_nanos(samples_ns: Vec<u128>) -> Result<Self> {
        if samples_ns.is_empty() {
            return Err(BenchError::config("a timing sample needs at least one measurement"));
        }

        let mut xs = samples_ns.clone();
        xs.sort_unstable();
        let n = xs.len();
        let min_ns = xs[0];
        let max_ns = xs[n - 1];
        let p50_ns = xs[n / 2];
        let p95_ns = xs[((n * 95) / 100).min(n - 1)];

        let sum: f64 = xs.iter().map(|&x| x as f64).sum();
        let mean_ns = sum / (n as f64);

        let mut var = 0.0;
        for &x in &xs {
            let d = (x as f64) - mean_ns;
            var += d * d;
        }
        let stddev_ns = if n > 1 { (var / ((n - 1) as f64)).sqrt() } else { 0.0 };

        Ok(TimingSample {
            samples_ns,
            n,
            mean_us: mean_ns / NS_PER_US,
            std_us: stddev_ns / NS_PER_US,
            min_us: min_ns as f64 / NS_PER_US,
            max_us: max_ns as f64 / NS_PER_US,
            p50_us: p50_ns as f64 / NS_PER_US,
            p95_us: p95_ns as f64 / NS_PER_US,
        })
    }

    /// Elapsed nanoseconds, in execution order.
    pub fn samples_ns(&self) -> &[u128] {
        &self.samples_ns
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn mean_us(&self) -> f64 {
        self.mean_us
    }

    pub fn std_us(&self) -> f64 {
        self.std_us
    }

    pub fn min_us(&self) -> f64 {
        self.min_us
    }

    pub fn max_us(&self) -> f64 {
        self.max_us
    }

    pub fn p50_us(&self) -> f64 {
        self.p50_us
    }

    pub fn p95_us(&self) -> f64 {
        self.p95_us
    }

    /// Operations per second implied by the mean latency.
    pub fn throughput_ops_sec(&self) -> f64 {
        throughput_ops_sec(self.mean_us)
    }
}

/// `1e6 / mean_us`, or 0 when the mean is not positive.
pub fn throughput_ops_sec(mean_us: f64) -> f64 {
    if mean_us > 0.0 {
        1e6 / mean_us
    } else {
        0.0
    }
}

/// Peak traced heap usage over a bounded number of calls.
#[derive(Clone, Debug, Serialize)]
pub struct MemorySample {
    /// Peak bytes of each call, in execution order.
    #[serde(skip)]
    peaks_bytes: Vec<usize>,
    iterations: usize,
    avg_peak_kb: f64,
    min_peak_kb: f64,
    max_peak_kb: f64,
}

impl MemorySample {
    pub fn from_peaks(peaks_bytes: Vec<usize>) -> Result<Self> {
        if peaks_bytes.is_empty() {
            return Err(BenchError::config("a memory sample needs at least one measurement"));
        }
        let n = peaks_bytes.len();
        let sum: f64 = peaks_bytes.iter().map(|&b| b as f64).sum();
        let min = peaks_bytes.iter().copied().min().unwrap_or(0);
        let max = peaks_bytes.iter().copied().max().unwrap_or(0);
        Ok(MemorySample {
            iterations: n,
            avg_peak_kb: sum / (n as f64) / BYTES_PER_KB,
            min_peak_kb: min as f64 / BYTES_PER_KB,
            max_peak_kb: max as f64 / BYTES_PER_KB,
            peaks_bytes,
        })
    }

    pub fn peaks_bytes(&self) -> &[usize] {
        &self.peaks_bytes
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn avg_peak_kb(&self) -> f64 {
        self.avg_peak_kb
    }

    pub fn min_peak_kb(&self) -> f64 {
        self.min_peak_kb
    }

    pub fn max_peak_kb(&self) -> f64 {
        self.max_peak_kb
    }

    /// Highest single-call peak, in KiB.
    pub fn peak_kb(&self) -> f64 {
        self.max_peak_kb
    }
}

fn aborted<E>(stage: Stage, iteration: usize, err: E) -> BenchError
where
    E: std::error::Error + Send + Sync + 'static,
{
    BenchError::MeasurementAborted {
        stage,
        iteration,
        source: Box::new(err),
    }
}

/// Runs `operation` `warmup` times untimed, then `iterations` times timed.
///
/// Any failing call aborts the measurement; failed calls are never recorded.
pub fn measure_latency<R, E, F>(
    mut operation: F,
    iterations: usize,
    warmup: usize,
) -> Result<TimingSample>
where
    F: FnMut() -> std::result::Result<R, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    if iterations == 0 {
        return Err(BenchError::config("latency iterations must be at least 1"));
    }

    for i in 0..warmup {
        let out = operation().map_err(|e| aborted(Stage::Warmup, i, e))?;
        black_box(out);
    }

    let mut xs = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let t0 = Instant::now();
        let out = operation();
        let elapsed = t0.elapsed();
        let out = out.map_err(|e| aborted(Stage::Timed, i, e))?;
        black_box(out);
        xs.push(elapsed.as_nanos());
    }

    TimingSample::from_nanos(xs)
}

/// Runs `operation` `iterations` times, each inside its own allocation trace.
///
/// Tracing is far more expensive per call than timing, so callers should use
/// a much smaller iteration count here than for [`measure_latency`].
pub fn measure_memory<R, E, F>(mut operation: F, iterations: usize) -> Result<MemorySample>
where
    F: FnMut() -> std::result::Result<R, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    if iterations == 0 {
        return Err(BenchError::config("memory iterations must be at least 1"));
    }

    let mut peaks = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let scope = TraceScope::start()?;
        let out = operation();
        let traced = scope.stop();
        let out = out.map_err(|e| aborted(Stage::Traced, i, e))?;
        // Result is dropped outside the scope.
        black_box(out);
        peaks.push(traced.peak);
    }

    MemorySample::from_peaks(peaks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_over_known_samples() {
        let s = TimingSample::from_nanos(vec![2_000, 4_000, 4_000, 4_000, 5_000, 5_000, 7_000, 9_000])
            .unwrap();
        assert_eq!(s.n(), 8);
        assert!((s.mean_us() - 5.0).abs() < 1e-9);
        // sum of squared deviations = 32 over 7 degrees of freedom
        assert!((s.std_us() - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
        assert_eq!(s.min_us(), 2.0);
        assert_eq!(s.max_us(), 9.0);
        assert_eq!(s.p50_us(), 5.0);
        assert_eq!(s.samples_ns()[0], 2_000);
    }

    #[test]
    fn samples_keep_execution_order() {
        let s = TimingSample::from_nanos(vec![30, 10, 20]).unwrap();
        assert_eq!(s.samples_ns(), &[30, 10, 20]);
        assert_eq!(s.min_us(), 0.01);
    }

    #[test]
    fn empty_sample_is_refused() {
        assert!(matches!(
            TimingSample::from_nanos(Vec::new()),
            Err(BenchError::Configuration(_))
        ));
    }

    #[test]
    fn throughput_from_mean() {
        assert_eq!(throughput_ops_sec(4.0), 250_000.0);
        assert_eq!(throughput_ops_sec(0.0), 0.0);
    }

    #[test]
    fn memory_sample_in_kib() {
        let m = MemorySample::from_peaks(vec![1024, 2048, 3072]).unwrap();
        assert_eq!(m.iterations(), 3);
        assert_eq!(m.avg_peak_kb(), 2.0);
        assert_eq!(m.min_peak_kb(), 1.0);
        assert_eq!(m.peak_kb(), 3.0);
    }
}
