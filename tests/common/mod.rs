#![allow(dead_code)]

use lockbench::crypto::AeadScheme;
use lockbench::{AeadError, Algorithm, BenchConfig, Sealed};

/// Wraps a real scheme but encrypts every message under the same nonce.
pub struct FixedNonce {
    pub inner: Box<dyn AeadScheme>,
}

impl FixedNonce {
    pub fn new(alg: Algorithm) -> Self {
        FixedNonce { inner: alg.scheme() }
    }
}

impl AeadScheme for FixedNonce {
    fn name(&self) -> &'static str {
        "fixed-nonce"
    }
    fn key_len(&self) -> usize {
        self.inner.key_len()
    }
    fn nonce_len(&self) -> usize {
        self.inner.nonce_len()
    }
    fn tag_len(&self) -> usize {
        self.inner.tag_len()
    }

    fn encrypt_with_nonce(
        &self,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        self.inner.encrypt_with_nonce(key, nonce, associated_data, plaintext)
    }

    fn decrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        self.inner.decrypt(key, nonce, associated_data, ciphertext)
    }

    fn encrypt(
        &self,
        key: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Sealed, AeadError> {
        let nonce = vec![7u8; self.nonce_len()];
        let ciphertext = self.encrypt_with_nonce(key, &nonce, associated_data, plaintext)?;
        Ok(Sealed { nonce, ciphertext })
    }
}

/// "Encrypts" by appending a zero tag and never checks it on decrypt.
pub struct Unauthenticated;

impl AeadScheme for Unauthenticated {
    fn name(&self) -> &'static str {
        "unauthenticated"
    }
    fn key_len(&self) -> usize {
        16
    }
    fn nonce_len(&self) -> usize {
        12
    }
    fn tag_len(&self) -> usize {
        16
    }

    fn encrypt_with_nonce(
        &self,
        _key: &[u8],
        _nonce: &[u8],
        _associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        let mut out = plaintext.to_vec();
        out.extend_from_slice(&[0u8; 16]);
        Ok(out)
    }

    fn decrypt(
        &self,
        _key: &[u8],
        _nonce: &[u8],
        _associated_data: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        Ok(ciphertext[..ciphertext.len().saturating_sub(16)].to_vec())
    }
}

/// Encrypts normally but every decrypt fails with a non-authentication fault.
pub struct BrokenDecrypt;

impl AeadScheme for BrokenDecrypt {
    fn name(&self) -> &'static str {
        "broken-decrypt"
    }
    fn key_len(&self) -> usize {
        16
    }
    fn nonce_len(&self) -> usize {
        12
    }
    fn tag_len(&self) -> usize {
        16
    }

    fn encrypt_with_nonce(
        &self,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        Algorithm::Aes128Gcm
            .scheme()
            .encrypt_with_nonce(key, nonce, associated_data, plaintext)
    }

    fn decrypt(
        &self,
        _key: &[u8],
        _nonce: &[u8],
        _associated_data: &[u8],
        _ciphertext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        Err(AeadError::Encryption)
    }
}

/// Emits half a tag and rejects every decrypt.
pub struct TruncatedTag;

impl AeadScheme for TruncatedTag {
    fn name(&self) -> &'static str {
        "truncated-tag"
    }
    fn key_len(&self) -> usize {
        16
    }
    fn nonce_len(&self) -> usize {
        12
    }
    fn tag_len(&self) -> usize {
        16
    }

    fn encrypt_with_nonce(
        &self,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        let mut out = Algorithm::Aes128Gcm
            .scheme()
            .encrypt_with_nonce(key, nonce, associated_data, plaintext)?;
        out.truncate(plaintext.len() + 8);
        Ok(out)
    }

    fn decrypt(
        &self,
        _key: &[u8],
        _nonce: &[u8],
        _associated_data: &[u8],
        _ciphertext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        Err(AeadError::AuthenticationFailure)
    }
}

/// Small, seeded configuration so integration runs finish quickly.
pub fn quick_config() -> BenchConfig {
    BenchConfig {
        payload_sizes: vec![8, 32],
        iterations: 50,
        warmup: 5,
        memory_iterations: 5,
        nonce_draws: 100,
        seed: Some(1),
        ..BenchConfig::default()
    }
}
