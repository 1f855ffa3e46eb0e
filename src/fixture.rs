//! Workload fixtures: lock context, keys and unlock-command payloads.

use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, RngCore, SeedableRng};

use crate::crypto::AeadScheme;

const LONG_PREFIX: &[u8] = b"unlock_bike_12345_";
const SHORT_PREFIX: &[u8] = b"unlock_cmd_";

/// Identifies the lock a command is meant for. Its associated data binds
/// every ciphertext to this lock so it cannot be replayed to another one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockContext {
    pub station: String,
    pub slot: u32,
}

impl LockContext {
    pub fn new(station: impl Into<String>, slot: u32) -> Self {
        LockContext {
            station: station.into(),
            slot,
        }
    }

    pub fn associated_data(&self) -> Vec<u8> {
        format!("lock_id_bike_station_{}_slot_{}", self.station, self.slot).into_bytes()
    }

    /// A context that differs from this one, used to check replay binding.
    pub fn neighbour(&self) -> LockContext {
        LockContext {
            station: self.station.clone(),
            slot: self.slot.wrapping_add(1),
        }
    }
}

impl Default for LockContext {
    fn default() -> Self {
        LockContext::new("A", 42)
    }
}

/// Derives a 32-byte RNG seed from a domain tag and run parameters.
pub fn seed_for(tag: &[u8], seed: u64, payload_size: usize) -> [u8; 32] {
    let mut h = blake3::Hasher::new();
    h.update(tag);
    h.update(&seed.to_le_bytes());
    h.update(&(payload_size as u64).to_le_bytes());
    *h.finalize().as_bytes()
}

/// RNG for keys and payload filler: reproducible when `seed` is given.
pub fn fixture_rng(seed: Option<u64>, payload_size: usize) -> ChaCha20Rng {
    match seed {
        Some(s) => ChaCha20Rng::from_seed(seed_for(b"lockbench/fixture/v1", s, payload_size)),
        None => {
            let mut s = [0u8; 32];
            OsRng.fill_bytes(&mut s);
            ChaCha20Rng::from_seed(s)
        }
    }
}

/// An unlock command of exactly `size` bytes: a readable prefix, then random
/// filler. Short payloads use the short prefix, truncated if needed.
pub fn generate_payload(size: usize, rng: &mut impl RngCore) -> Vec<u8> {
    let prefix = if size <= LONG_PREFIX.len() {
        SHORT_PREFIX
    } else {
        LONG_PREFIX
    };
    let take = prefix.len().min(size);
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&prefix[..take]);
    out.resize(size, 0);
    rng.fill_bytes(&mut out[take..]);
    out
}

pub fn generate_key(scheme: &dyn AeadScheme, rng: &mut impl RngCore) -> Vec<u8> {
    let mut key = vec![0u8; scheme.key_len()];
    rng.fill_bytes(&mut key);
    key
}

/// Everything one algorithm run needs, built outside the timed region.
#[derive(Clone, Debug)]
pub struct Workload {
    pub key: Vec<u8>,
    pub plaintext: Vec<u8>,
    pub context: LockContext,
    pub associated_data: Vec<u8>,
}

impl Workload {
    pub fn new(
        scheme: &dyn AeadScheme,
        plaintext: Vec<u8>,
        context: LockContext,
        rng: &mut impl RngCore,
    ) -> Self {
        let key = generate_key(scheme, rng);
        let associated_data = context.associated_data();
        Workload {
            key,
            plaintext,
            context,
            associated_data,
        }
    }
}
