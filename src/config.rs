use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::crypto::Algorithm;
use crate::error::{BenchError, Result};
use crate::fixture::LockContext;
use crate::probes::DEFAULT_NONCE_DRAWS;

/// Benchmark parameters.
///
/// Defaults match the reference run: 10 000 timed iterations after 100
/// warm-up calls, 100 traced calls for memory, payloads of 8/16/32/64 bytes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub algorithms: Vec<Algorithm>,
    pub payload_sizes: Vec<usize>,
    pub iterations: usize,
    pub warmup: usize,
    pub memory_iterations: usize,
    pub nonce_draws: usize,
    pub station: String,
    pub slot: u32,
    /// Seeds key and payload generation; OS entropy when absent.
    pub seed: Option<u64>,
    /// Wall-clock budget checked between algorithm runs.
    pub time_budget_secs: Option<u64>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            algorithms: vec![Algorithm::Ascon128, Algorithm::Aes128Gcm],
            payload_sizes: vec![8, 16, 32, 64],
            iterations: 10_000,
            warmup: 100,
            memory_iterations: 100,
            nonce_draws: DEFAULT_NONCE_DRAWS,
            station: "A".to_string(),
            slot: 42,
            seed: None,
            time_budget_secs: None,
        }
    }
}

impl BenchConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: BenchConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn context(&self) -> LockContext {
        LockContext::new(self.station.clone(), self.slot)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(BenchError::config("iterations must be at least 1"));
        }
        if self.memory_iterations == 0 {
            return Err(BenchError::config("memory_iterations must be at least 1"));
        }
        if self.nonce_draws == 0 {
            return Err(BenchError::config("nonce_draws must be at least 1"));
        }
        if self.algorithms.is_empty() {
            return Err(BenchError::config("no algorithms selected"));
        }
        let mut seen = HashSet::new();
        for alg in &self.algorithms {
            if !seen.insert(*alg) {
                return Err(BenchError::config(format!("algorithm {alg} selected twice")));
            }
        }
        if self.payload_sizes.is_empty() {
            return Err(BenchError::config("no payload sizes selected"));
        }
        if self.station.is_empty() {
            return Err(BenchError::config("station identifier must not be empty"));
        }
        Ok(())
    }

    /// True when memory tracing is not clearly cheaper than the timing run.
    pub fn memory_iterations_look_heavy(&self) -> bool {
        self.memory_iterations > self.iterations / 10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = BenchConfig::default();
        cfg.validate().unwrap();
        assert!(!cfg.memory_iterations_look_heavy());
        assert_eq!(cfg.context().associated_data(), b"lock_id_bike_station_A_slot_42");
    }

    #[test]
    fn toml_overrides_only_given_fields() {
        let cfg = BenchConfig::from_toml_str(
            r#"
            algorithms = ["aes128gcm", "xchacha20poly1305"]
            iterations = 500
            seed = 9
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.algorithms,
            vec![Algorithm::Aes128Gcm, Algorithm::XChaCha20Poly1305]
        );
        assert_eq!(cfg.iterations, 500);
        assert_eq!(cfg.seed, Some(9));
        assert_eq!(cfg.warmup, 100);
        assert_eq!(cfg.payload_sizes, vec![8, 16, 32, 64]);
    }

    #[test]
    fn file_accepts_command_line_spellings() {
        let cfg = BenchConfig::from_toml_str(
            r#"algorithms = ["ASCON-128", "aes_128_gcm", "XChaCha20-Poly1305"]"#,
        )
        .unwrap();
        assert_eq!(
            cfg.algorithms,
            vec![
                Algorithm::Ascon128,
                Algorithm::Aes128Gcm,
                Algorithm::XChaCha20Poly1305
            ]
        );
        assert!(matches!(
            BenchConfig::from_toml_str(r#"algorithms = ["des"]"#),
            Err(BenchError::ConfigFile(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            BenchConfig::from_toml_str("iterationz = 3"),
            Err(BenchError::ConfigFile(_))
        ));
    }

    #[test]
    fn validation_rejects_bad_counts() {
        let cases: [fn(&mut BenchConfig); 7] = [
            |c| c.iterations = 0,
            |c| c.memory_iterations = 0,
            |c| c.nonce_draws = 0,
            |c| c.algorithms.clear(),
            |c| c.algorithms = vec![Algorithm::Ascon128, Algorithm::Ascon128],
            |c| c.payload_sizes.clear(),
            |c| c.station.clear(),
        ];
        for mutate in cases {
            let mut cfg = BenchConfig::default();
            mutate(&mut cfg);
            assert!(matches!(cfg.validate(), Err(BenchError::Configuration(_))));
        }
    }

    #[test]
    fn zero_warmup_is_allowed() {
        let cfg = BenchConfig {
            warmup: 0,
            ..BenchConfig::default()
        };
        cfg.validate().unwrap();
    }
}
