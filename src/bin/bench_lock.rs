use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lockbench::export::{self, Format};
use lockbench::report::{BenchmarkRun, ComparativeReport, ReportEntry};
use lockbench::{Algorithm, BenchConfig, Runner};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Latency, memory and AEAD-probe benchmark for encrypted bike-lock unlock commands"
)]
struct Args {
    /// TOML file with benchmark parameters; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated algorithm ids (ascon128, aes128gcm, xchacha20poly1305)
    #[arg(long, value_delimiter = ',')]
    algorithms: Option<Vec<Algorithm>>,

    /// Comma-separated plaintext sizes in bytes
    #[arg(long, value_delimiter = ',')]
    payload_sizes: Option<Vec<usize>>,

    /// Timed iterations per operation
    #[arg(long)]
    iterations: Option<usize>,

    /// Untimed warm-up calls before timing
    #[arg(long)]
    warmup: Option<usize>,

    /// Traced encrypt calls for the memory measurement
    #[arg(long)]
    memory_iterations: Option<usize>,

    /// Encryptions drawn by the nonce-uniqueness probe
    #[arg(long)]
    nonce_draws: Option<usize>,

    /// Bike station of the simulated lock
    #[arg(long)]
    station: Option<String>,

    /// Slot number of the simulated lock
    #[arg(long)]
    slot: Option<u32>,

    /// Seed for reproducible keys and payloads
    #[arg(long)]
    seed: Option<u64>,

    /// Output file (default depends on --format)
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long, default_value_t = Format::Csv)]
    format: Format,

    /// Stop scheduling new algorithm runs after this many seconds
    #[arg(long)]
    time_budget_secs: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<(BenchConfig, PathBuf, Format)> {
        let mut cfg = match &self.config {
            Some(path) => BenchConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => BenchConfig::default(),
        };

        if let Some(v) = self.algorithms {
            cfg.algorithms = v;
        }
        if let Some(v) = self.payload_sizes {
            cfg.payload_sizes = v;
        }
        if let Some(v) = self.iterations {
            cfg.iterations = v;
        }
        if let Some(v) = self.warmup {
            cfg.warmup = v;
        }
        if let Some(v) = self.memory_iterations {
            cfg.memory_iterations = v;
        }
        if let Some(v) = self.nonce_draws {
            cfg.nonce_draws = v;
        }
        if let Some(v) = self.station {
            cfg.station = v;
        }
        if let Some(v) = self.slot {
            cfg.slot = v;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        if self.time_budget_secs.is_some() {
            cfg.time_budget_secs = self.time_budget_secs;
        }

        let out = self
            .out
            .unwrap_or_else(|| PathBuf::from(self.format.default_file_name()));
        Ok((cfg, out, self.format))
    }
}

fn print_table(report: &ComparativeReport) {
    println!();
    println!("payload {} bytes", report.payload_size);
    println!(
        "{:<20} {:>12} {:>10} {:>12} {:>10} {:>10} {:>14}  probes",
        "algorithm", "enc mean us", "enc std", "dec mean us", "dec std", "peak KiB", "enc ops/s"
    );
    for entry in report.entries() {
        match entry {
            ReportEntry::Valid(r) => {
                let probes = if r.probes.all_passed() {
                    "ok".to_string()
                } else {
                    format!("FAILED {:?}", r.probes.failures())
                };
                println!(
                    "{:<20} {:>12.3} {:>10.3} {:>12.3} {:>10.3} {:>10.3} {:>14.0}  {}",
                    r.algorithm,
                    r.encrypt.mean_us(),
                    r.encrypt.std_us(),
                    r.decrypt.mean_us(),
                    r.decrypt.std_us(),
                    r.memory.avg_peak_kb(),
                    r.encrypt_throughput_ops_sec(),
                    probes
                );
            }
            ReportEntry::Invalid { algorithm, reason } => {
                println!("{algorithm:<20} invalid: {reason}");
            }
        }
    }
}

// Deltas of every algorithm against the last one in the report.
fn print_deltas(report: &ComparativeReport) {
    let names: Vec<&str> = report.algorithms().collect();
    let Some((&baseline, others)) = names.split_last() else {
        return;
    };
    for &name in others {
        match report.delta(name, baseline) {
            Ok(d) => println!(
                "  {name} vs {baseline}: encrypt {:+.1}%  decrypt {:+.1}%  peak memory {:+.1}%",
                d.encrypt_latency_pct, d.decrypt_latency_pct, d.peak_memory_pct
            ),
            Err(e) => warn!(
                payload = report.payload_size,
                algorithm = name,
                baseline,
                error = %e,
                "comparison refused"
            ),
        }
    }
}

fn print_summary(run: &BenchmarkRun) {
    for report in &run.reports {
        print_table(report);
        print_deltas(report);
    }
    if run.truncated {
        println!();
        println!("time budget exhausted: results above are partial");
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let (cfg, out, format) = Args::parse().into_config()?;
    info!(
        algorithms = ?cfg.algorithms,
        payloads = ?cfg.payload_sizes,
        iterations = cfg.iterations,
        warmup = cfg.warmup,
        "starting benchmark"
    );

    let runner = Runner::new(cfg)?;
    let run = runner.run()?;

    export::write(&out, format, &run)
        .with_context(|| format!("writing {}", out.display()))?;
    info!(path = %out.display(), %format, "results written");

    print_summary(&run);
    Ok(())
}
