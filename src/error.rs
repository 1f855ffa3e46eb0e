use std::fmt;

use thiserror::Error;

/// Errors surfaced by an AEAD adapter.
///
/// `AuthenticationFailure` is the expected outcome for tampered input and is
/// kept apart from the faults that indicate misuse of the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AeadError {
    #[error("authentication failed")]
    AuthenticationFailure,
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("invalid nonce length: expected {expected} bytes, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },
    #[error("encryption failed")]
    Encryption,
}

/// Which loop a measurement was in when its operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Warmup,
    Timed,
    Traced,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Warmup => "warm-up",
            Stage::Timed => "timed",
            Stage::Traced => "traced",
        })
    }
}

/// Benchmark phase used to attribute a failure to part of an algorithm run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RoundTrip,
    NonceUniqueness,
    TamperDetection,
    ContextBinding,
    EncryptLatency,
    DecryptLatency,
    EncryptMemory,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::RoundTrip => "round-trip probe",
            Phase::NonceUniqueness => "nonce-uniqueness probe",
            Phase::TamperDetection => "tamper-detection probe",
            Phase::ContextBinding => "context-binding probe",
            Phase::EncryptLatency => "encrypt latency",
            Phase::DecryptLatency => "decrypt latency",
            Phase::EncryptMemory => "encrypt memory",
        })
    }
}

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(
        "{algorithm}: nonce collision after {draws} encryptions \
         (draw {repeat_index} repeats draw {first_index})"
    )]
    NonceCollision {
        algorithm: String,
        draws: usize,
        first_index: usize,
        repeat_index: usize,
    },

    #[error("measurement aborted in {stage} iteration {iteration}: {source}")]
    MeasurementAborted {
        stage: Stage,
        iteration: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error(transparent)]
    Aead(#[from] AeadError),

    #[error("{algorithm} ({phase}): {source}")]
    Attributed {
        algorithm: String,
        phase: Phase,
        #[source]
        source: Box<BenchError>,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),
}

impl BenchError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        BenchError::Configuration(msg.into())
    }

    /// Tags the error with the algorithm and phase it came from.
    pub fn attribute(self, algorithm: &str, phase: Phase) -> Self {
        BenchError::Attributed {
            algorithm: algorithm.to_string(),
            phase,
            source: Box::new(self),
        }
    }

    /// The error underneath any attribution layers.
    pub fn root(&self) -> &BenchError {
        match self {
            BenchError::Attributed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Errors that must stop the whole run instead of invalidating one entry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.root(),
            BenchError::NonceCollision { .. }
                | BenchError::Configuration(_)
                | BenchError::Io(_)
                | BenchError::Csv(_)
                | BenchError::ConfigFile(_)
        )
    }
}

pub type Result<T, E = BenchError> = std::result::Result<T, E>;
