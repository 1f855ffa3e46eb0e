use std::fmt;
use std::str::FromStr;

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::AeadError;
use crate::schemes::{Aes128GcmScheme, Ascon128Scheme, XChaCha20Poly1305Scheme};

/// Output of one encryption: the nonce it used and `ciphertext || tag`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl Sealed {
    /// Trailing tag bytes, given the scheme's tag length.
    pub fn tag(&self, tag_len: usize) -> &[u8] {
        let split = self.ciphertext.len().saturating_sub(tag_len);
        &self.ciphertext[split..]
    }
}

/// Uniform capability set over an opaque AEAD primitive.
///
/// Keys are always passed in by the caller; implementations keep no secret
/// state between calls.
pub trait AeadScheme {
    fn name(&self) -> &'static str;
    fn key_len(&self) -> usize;
    fn nonce_len(&self) -> usize;
    fn tag_len(&self) -> usize;

    fn key_bits(&self) -> usize {
        self.key_len() * 8
    }
    fn nonce_bits(&self) -> usize {
        self.nonce_len() * 8
    }
    fn tag_bits(&self) -> usize {
        self.tag_len() * 8
    }

    /// Encrypts under a caller-chosen nonce. Returns `ciphertext || tag`.
    fn encrypt_with_nonce(
        &self,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, AeadError>;

    /// Verifies and decrypts `ciphertext || tag`.
    ///
    /// A tag mismatch is `AeadError::AuthenticationFailure`; no plaintext
    /// bytes are ever returned in that case.
    fn decrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, AeadError>;

    /// Encrypts under a fresh OS-random nonce.
    fn encrypt(
        &self,
        key: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Sealed, AeadError> {
        let nonce = random_nonce(self.nonce_len());
        let ciphertext = self.encrypt_with_nonce(key, &nonce, associated_data, plaintext)?;
        Ok(Sealed { nonce, ciphertext })
    }
}

pub fn random_nonce(len: usize) -> Vec<u8> {
    let mut nonce = vec![0u8; len];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

pub(crate) fn check_key(key: &[u8], expected: usize) -> Result<(), AeadError> {
    if key.len() != expected {
        return Err(AeadError::InvalidKeyLength {
            expected,
            actual: key.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_nonce(nonce: &[u8], expected: usize) -> Result<(), AeadError> {
    if nonce.len() != expected {
        return Err(AeadError::InvalidNonceLength {
            expected,
            actual: nonce.len(),
        });
    }
    Ok(())
}

/// Registry of the algorithms the harness knows how to benchmark.
///
/// Config files and the command line accept the same spellings, e.g.
/// `aes128gcm`, `AES-128-GCM` or `aes_128_gcm`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Algorithm {
    Ascon128,
    Aes128Gcm,
    XChaCha20Poly1305,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::Ascon128,
        Algorithm::Aes128Gcm,
        Algorithm::XChaCha20Poly1305,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Algorithm::Ascon128 => "ascon128",
            Algorithm::Aes128Gcm => "aes128gcm",
            Algorithm::XChaCha20Poly1305 => "xchacha20poly1305",
        }
    }

    pub fn scheme(self) -> Box<dyn AeadScheme> {
        match self {
            Algorithm::Ascon128 => Box::new(Ascon128Scheme),
            Algorithm::Aes128Gcm => Box::new(Aes128GcmScheme),
            Algorithm::XChaCha20Poly1305 => Box::new(XChaCha20Poly1305Scheme),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.id() == wanted)
            .ok_or_else(|| {
                format!("unknown algorithm '{s}' (use ascon128, aes128gcm or xchacha20poly1305)")
            })
    }
}

impl TryFrom<String> for Algorithm {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
