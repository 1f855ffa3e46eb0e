//! Drives probes and measurements over every (payload size, algorithm) pair.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::BenchConfig;
use crate::crypto::AeadScheme;
use crate::error::{BenchError, Phase, Result};
use crate::fixture::{fixture_rng, generate_payload, Workload};
use crate::measure::{measure_latency, measure_memory};
use crate::probes;
use crate::report::{BenchmarkReport, BenchmarkRun, ComparativeReport, ReportEntry};

pub struct Runner {
    config: BenchConfig,
}

impl Runner {
    pub fn new(config: BenchConfig) -> Result<Self> {
        config.validate()?;
        if config.memory_iterations_look_heavy() {
            warn!(
                memory_iterations = config.memory_iterations,
                iterations = config.iterations,
                "memory tracing is slow; use far fewer memory iterations than timed ones"
            );
        }
        Ok(Runner { config })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Runs every configured algorithm at every configured payload size.
    pub fn run(&self) -> Result<BenchmarkRun> {
        let schemes: Vec<Box<dyn AeadScheme>> =
            self.config.algorithms.iter().map(|a| a.scheme()).collect();
        self.run_schemes(&schemes)
    }

    /// Same as [`Runner::run`] over an explicit adapter list.
    ///
    /// Algorithms run one after another in list order. A fatal error (nonce
    /// collision, configuration, i/o) aborts the whole run; any other failure
    /// marks that algorithm's entry invalid and the run moves on.
    pub fn run_schemes(&self, schemes: &[Box<dyn AeadScheme>]) -> Result<BenchmarkRun> {
        let cfg = &self.config;
        let started = Instant::now();
        let deadline = cfg
            .time_budget_secs
            .map(|secs| started + Duration::from_secs(secs));
        let context = cfg.context();

        let mut run = BenchmarkRun {
            config: cfg.clone(),
            ..BenchmarkRun::default()
        };

        for &payload_size in &cfg.payload_sizes {
            let mut rng = fixture_rng(cfg.seed, payload_size);
            let plaintext = generate_payload(payload_size, &mut rng);
            let mut report = ComparativeReport::new(payload_size);

            for scheme in schemes {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    warn!(
                        elapsed_secs = started.elapsed().as_secs(),
                        payload = payload_size,
                        next = scheme.name(),
                        "time budget exhausted; returning partial results"
                    );
                    run.truncated = true;
                    if !report.is_empty() {
                        run.reports.push(report);
                    }
                    return Ok(run);
                }

                let workload =
                    Workload::new(scheme.as_ref(), plaintext.clone(), context.clone(), &mut rng);
                let entry = match self.run_algorithm(scheme.as_ref(), &workload) {
                    Ok(result) => ReportEntry::Valid(Box::new(result)),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        warn!(
                            algorithm = scheme.name(),
                            payload = payload_size,
                            error = %e,
                            "run invalidated"
                        );
                        ReportEntry::Invalid {
                            algorithm: scheme.name().to_string(),
                            reason: e.to_string(),
                        }
                    }
                };
                report.insert(entry)?;
            }

            run.reports.push(report);
        }

        info!(
            payloads = run.reports.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "benchmark run complete"
        );
        Ok(run)
    }

    /// Probes first, then encrypt latency, decrypt latency and encrypt memory.
    pub fn run_algorithm(
        &self,
        scheme: &dyn AeadScheme,
        workload: &Workload,
    ) -> Result<BenchmarkReport> {
        let cfg = &self.config;
        let name = scheme.name();
        let payload_size = workload.plaintext.len();
        let key = workload.key.as_slice();
        let ad = workload.associated_data.as_slice();
        let pt = workload.plaintext.as_slice();

        let probes = probes::run_all(scheme, workload, cfg.nonce_draws)?;
        if !probes.all_passed() {
            warn!(algorithm = name, payload = payload_size, failed = ?probes.failures(), "probe failed");
        } else {
            debug!(algorithm = name, payload = payload_size, "probes passed");
        }

        let encrypt = measure_latency(|| scheme.encrypt(key, ad, pt), cfg.iterations, cfg.warmup)
            .map_err(|e| e.attribute(name, Phase::EncryptLatency))?;

        let sealed = scheme
            .encrypt(key, ad, pt)
            .map_err(|e| BenchError::from(e).attribute(name, Phase::DecryptLatency))?;
        let decrypt = measure_latency(
            || scheme.decrypt(key, &sealed.nonce, ad, &sealed.ciphertext),
            cfg.iterations,
            cfg.warmup,
        )
        .map_err(|e| e.attribute(name, Phase::DecryptLatency))?;

        let memory = measure_memory(|| scheme.encrypt(key, ad, pt), cfg.memory_iterations)
            .map_err(|e| e.attribute(name, Phase::EncryptMemory))?;

        info!(
            algorithm = name,
            payload = payload_size,
            encrypt_mean_us = encrypt.mean_us(),
            decrypt_mean_us = decrypt.mean_us(),
            peak_kb = memory.avg_peak_kb(),
            "measured"
        );

        Ok(BenchmarkReport {
            algorithm: name.to_string(),
            payload_size,
            iterations: cfg.iterations,
            warmup: cfg.warmup,
            encrypt,
            decrypt,
            memory,
            probes,
        })
    }
}
