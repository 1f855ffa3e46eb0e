//! Result tables: CSV for spreadsheets, whitespace `.dat` for gnuplot.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::report::{BenchmarkRun, ReportEntry};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Csv,
    Dat,
}

impl Format {
    pub fn default_file_name(self) -> &'static str {
        match self {
            Format::Csv => "lockbench_results.csv",
            Format::Dat => "lockbench_results.dat",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Csv => "csv",
            Format::Dat => "dat",
        })
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "dat" => Ok(Format::Dat),
            other => Err(format!("unknown output format '{other}' (use csv or dat)")),
        }
    }
}

/// One exported line. Numeric fields are `None` for invalid entries.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Row {
    pub payload_size: usize,
    pub algorithm: String,
    pub valid: bool,
    pub iterations: Option<usize>,
    pub warmup: Option<usize>,
    pub encrypt_mean_us: Option<f64>,
    pub encrypt_std_us: Option<f64>,
    pub encrypt_min_us: Option<f64>,
    pub encrypt_max_us: Option<f64>,
    pub encrypt_p50_us: Option<f64>,
    pub decrypt_mean_us: Option<f64>,
    pub decrypt_std_us: Option<f64>,
    pub decrypt_min_us: Option<f64>,
    pub decrypt_max_us: Option<f64>,
    pub decrypt_p50_us: Option<f64>,
    pub memory_avg_peak_kb: Option<f64>,
    pub memory_max_peak_kb: Option<f64>,
    pub throughput_ops_sec: Option<f64>,
    pub decrypt_throughput_ops_sec: Option<f64>,
    pub round_trip: Option<bool>,
    pub nonce_unique: Option<bool>,
    pub tamper_rejected: Option<bool>,
    pub context_bound: Option<bool>,
    pub error: String,
}

const COLUMNS: [&str; 24] = [
    "payload_size",
    "algorithm",
    "valid",
    "iterations",
    "warmup",
    "encrypt_mean_us",
    "encrypt_std_us",
    "encrypt_min_us",
    "encrypt_max_us",
    "encrypt_p50_us",
    "decrypt_mean_us",
    "decrypt_std_us",
    "decrypt_min_us",
    "decrypt_max_us",
    "decrypt_p50_us",
    "memory_avg_peak_kb",
    "memory_max_peak_kb",
    "throughput_ops_sec",
    "decrypt_throughput_ops_sec",
    "round_trip",
    "nonce_unique",
    "tamper_rejected",
    "context_bound",
    "error",
];

impl Row {
    fn from_entry(payload_size: usize, entry: &ReportEntry) -> Self {
        match entry {
            ReportEntry::Valid(r) => Row {
                payload_size,
                algorithm: r.algorithm.clone(),
                valid: true,
                iterations: Some(r.iterations),
                warmup: Some(r.warmup),
                encrypt_mean_us: Some(r.encrypt.mean_us()),
                encrypt_std_us: Some(r.encrypt.std_us()),
                encrypt_min_us: Some(r.encrypt.min_us()),
                encrypt_max_us: Some(r.encrypt.max_us()),
                encrypt_p50_us: Some(r.encrypt.p50_us()),
                decrypt_mean_us: Some(r.decrypt.mean_us()),
                decrypt_std_us: Some(r.decrypt.std_us()),
                decrypt_min_us: Some(r.decrypt.min_us()),
                decrypt_max_us: Some(r.decrypt.max_us()),
                decrypt_p50_us: Some(r.decrypt.p50_us()),
                memory_avg_peak_kb: Some(r.memory.avg_peak_kb()),
                memory_max_peak_kb: Some(r.memory.max_peak_kb()),
                throughput_ops_sec: Some(r.encrypt_throughput_ops_sec()),
                decrypt_throughput_ops_sec: Some(r.decrypt_throughput_ops_sec()),
                round_trip: Some(r.probes.round_trip),
                nonce_unique: Some(r.probes.nonce_unique),
                tamper_rejected: Some(r.probes.tamper_rejected),
                context_bound: Some(r.probes.context_bound),
                error: String::new(),
            },
            ReportEntry::Invalid { algorithm, reason } => Row {
                payload_size,
                algorithm: algorithm.clone(),
                valid: false,
                iterations: None,
                warmup: None,
                encrypt_mean_us: None,
                encrypt_std_us: None,
                encrypt_min_us: None,
                encrypt_max_us: None,
                encrypt_p50_us: None,
                decrypt_mean_us: None,
                decrypt_std_us: None,
                decrypt_min_us: None,
                decrypt_max_us: None,
                decrypt_p50_us: None,
                memory_avg_peak_kb: None,
                memory_max_peak_kb: None,
                throughput_ops_sec: None,
                decrypt_throughput_ops_sec: None,
                round_trip: None,
                nonce_unique: None,
                tamper_rejected: None,
                context_bound: None,
                error: reason.clone(),
            },
        }
    }
}

/// Flattens a run into rows, payload sizes in run order, then algorithms in
/// insertion order.
pub fn rows(run: &BenchmarkRun) -> Vec<Row> {
    run.reports
        .iter()
        .flat_map(|report| {
            report
                .entries()
                .iter()
                .map(move |entry| Row::from_entry(report.payload_size, entry))
        })
        .collect()
}

pub fn write(path: impl AsRef<Path>, format: Format, run: &BenchmarkRun) -> Result<()> {
    match format {
        Format::Csv => write_csv(path, run),
        Format::Dat => write_dat(path, run),
    }
}

pub fn write_csv(path: impl AsRef<Path>, run: &BenchmarkRun) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows(run) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_dat(path: impl AsRef<Path>, run: &BenchmarkRun) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write_header(&mut out)?;
    for row in rows(run) {
        write_row(&mut out, &row)?;
    }
    out.flush()?;
    Ok(())
}

fn write_header(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", COLUMNS.join(" "))
}

// Missing values are written as "-" so the column count stays fixed.
fn num<T: fmt::Display>(v: Option<T>) -> String {
    v.map_or_else(|| "-".to_string(), |x| x.to_string())
}

fn us(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |x| format!("{x:.3}"))
}

fn flag(v: Option<bool>) -> &'static str {
    match v {
        Some(true) => "1",
        Some(false) => "0",
        None => "-",
    }
}

// Keeps free text inside one quoted field on one line.
fn dat_text(s: &str) -> String {
    s.replace('"', "'").replace(['\n', '\r'], " ")
}

fn write_row(out: &mut impl Write, row: &Row) -> std::io::Result<()> {
    writeln!(
        out,
        "{} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} \"{}\"",
        row.payload_size,
        row.algorithm,
        if row.valid { 1 } else { 0 },
        num(row.iterations),
        num(row.warmup),
        us(row.encrypt_mean_us),
        us(row.encrypt_std_us),
        us(row.encrypt_min_us),
        us(row.encrypt_max_us),
        us(row.encrypt_p50_us),
        us(row.decrypt_mean_us),
        us(row.decrypt_std_us),
        us(row.decrypt_min_us),
        us(row.decrypt_max_us),
        us(row.decrypt_p50_us),
        us(row.memory_avg_peak_kb),
        us(row.memory_max_peak_kb),
        us(row.throughput_ops_sec),
        us(row.decrypt_throughput_ops_sec),
        flag(row.round_trip),
        flag(row.nonce_unique),
        flag(row.tamper_rejected),
        flag(row.context_bound),
        dat_text(&row.error),
    )
}
