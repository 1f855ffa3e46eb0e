//! Algorithm-agnostic AEAD correctness and security probes.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::crypto::AeadScheme;
use crate::error::{AeadError, BenchError, Phase, Result};
use crate::fixture::Workload;

pub const DEFAULT_NONCE_DRAWS: usize = 1000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SecurityProbeResult {
    pub round_trip: bool,
    pub nonce_unique: bool,
    pub tamper_rejected: bool,
    pub context_bound: bool,
    pub nonce_draws: usize,
}

impl SecurityProbeResult {
    pub fn all_passed(&self) -> bool {
        self.round_trip && self.nonce_unique && self.tamper_rejected && self.context_bound
    }

    /// Names of the probes that did not pass.
    pub fn failures(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.round_trip {
            out.push("round_trip");
        }
        if !self.nonce_unique {
            out.push("nonce_unique");
        }
        if !self.tamper_rejected {
            out.push("tamper_rejected");
        }
        if !self.context_bound {
            out.push("context_bound");
        }
        out
    }
}

/// Maps a decrypt outcome to "was it rejected as unauthentic".
/// Faults other than an authentication failure propagate.
fn rejected(outcome: std::result::Result<Vec<u8>, AeadError>) -> Result<bool> {
    match outcome {
        Err(AeadError::AuthenticationFailure) => Ok(true),
        Ok(_) => Ok(false),
        Err(other) => Err(other.into()),
    }
}

/// Encrypt then decrypt; passes iff the recovered bytes equal the plaintext.
pub fn round_trip(
    scheme: &dyn AeadScheme,
    key: &[u8],
    associated_data: &[u8],
    plaintext: &[u8],
) -> Result<bool> {
    let sealed = scheme.encrypt(key, associated_data, plaintext)?;
    match scheme.decrypt(key, &sealed.nonce, associated_data, &sealed.ciphertext) {
        Ok(recovered) => Ok(recovered == plaintext),
        Err(AeadError::AuthenticationFailure) => Ok(false),
        Err(other) => Err(other.into()),
    }
}

/// Draws `draws` nonces through `encrypt` under one key.
///
/// Any repeat is a hard `NonceCollision` error, never a `false`.
pub fn nonce_uniqueness(
    scheme: &dyn AeadScheme,
    key: &[u8],
    associated_data: &[u8],
    plaintext: &[u8],
    draws: usize,
) -> Result<()> {
    if draws == 0 {
        return Err(BenchError::config("nonce-uniqueness probe needs at least 1 draw"));
    }

    let mut seen: HashMap<Vec<u8>, usize> = HashMap::with_capacity(draws);
    for i in 0..draws {
        let sealed = scheme.encrypt(key, associated_data, plaintext)?;
        if let Some(&first_index) = seen.get(&sealed.nonce) {
            return Err(BenchError::NonceCollision {
                algorithm: scheme.name().to_string(),
                draws: i + 1,
                first_index,
                repeat_index: i,
            });
        }
        seen.insert(sealed.nonce, i);

        if (i + 1) % 200 == 0 {
            debug!(algorithm = scheme.name(), progress = i + 1, total = draws, "nonce draws");
        }
    }
    Ok(())
}

/// Flips one bit in the tag and, when there is one, in the ciphertext body.
/// Passes iff every tampered message is rejected as unauthentic. Output
/// too short to carry a full tag fails outright.
pub fn tamper_detection(
    scheme: &dyn AeadScheme,
    key: &[u8],
    associated_data: &[u8],
    plaintext: &[u8],
) -> Result<bool> {
    let sealed = scheme.encrypt(key, associated_data, plaintext)?;
    let tag_len = scheme.tag_len();
    if tag_len == 0 || sealed.tag(tag_len).len() < tag_len {
        return Ok(false);
    }
    let tag_start = sealed.ciphertext.len() - tag_len;

    let mut tag_flipped = sealed.ciphertext.clone();
    tag_flipped[tag_start] ^= 0x01;
    if !rejected(scheme.decrypt(key, &sealed.nonce, associated_data, &tag_flipped))? {
        return Ok(false);
    }

    if tag_start > 0 {
        let mut body_flipped = sealed.ciphertext.clone();
        body_flipped[0] ^= 0x01;
        if !rejected(scheme.decrypt(key, &sealed.nonce, associated_data, &body_flipped))? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Decrypts under another context's associated data; passes iff rejected.
pub fn context_binding(
    scheme: &dyn AeadScheme,
    key: &[u8],
    associated_data: &[u8],
    other_associated_data: &[u8],
    plaintext: &[u8],
) -> Result<bool> {
    if associated_data == other_associated_data {
        return Err(BenchError::config(
            "context-binding probe needs two different associated data values",
        ));
    }
    let sealed = scheme.encrypt(key, associated_data, plaintext)?;
    rejected(scheme.decrypt(key, &sealed.nonce, other_associated_data, &sealed.ciphertext))
}

/// Runs every probe against one workload. A nonce collision aborts.
pub fn run_all(
    scheme: &dyn AeadScheme,
    workload: &Workload,
    nonce_draws: usize,
) -> Result<SecurityProbeResult> {
    let name = scheme.name();
    let key = workload.key.as_slice();
    let ad = workload.associated_data.as_slice();
    let pt = workload.plaintext.as_slice();

    let round_trip = round_trip(scheme, key, ad, pt).map_err(|e| e.attribute(name, Phase::RoundTrip))?;

    nonce_uniqueness(scheme, key, ad, pt, nonce_draws)
        .map_err(|e| e.attribute(name, Phase::NonceUniqueness))?;

    let tamper_rejected =
        tamper_detection(scheme, key, ad, pt).map_err(|e| e.attribute(name, Phase::TamperDetection))?;

    let other_ad = workload.context.neighbour().associated_data();
    let context_bound = context_binding(scheme, key, ad, &other_ad, pt)
        .map_err(|e| e.attribute(name, Phase::ContextBinding))?;

    Ok(SecurityProbeResult {
        round_trip,
        nonce_unique: true,
        tamper_rejected,
        context_bound,
        nonce_draws,
    })
}
