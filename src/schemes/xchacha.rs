use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};

use crate::crypto::{check_key, check_nonce, AeadScheme};
use crate::error::AeadError;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 24;
pub const TAG_LEN: usize = 16;

/// XChaCha20-Poly1305, kept as a software-only reference point next to the
/// two schemes under comparison.
#[derive(Clone, Copy, Debug, Default)]
pub struct XChaCha20Poly1305Scheme;

impl AeadScheme for XChaCha20Poly1305Scheme {
    fn name(&self) -> &'static str {
        "XChaCha20-Poly1305"
    }
    fn key_len(&self) -> usize {
        KEY_LEN
    }
    fn nonce_len(&self) -> usize {
        NONCE_LEN
    }
    fn tag_len(&self) -> usize {
        TAG_LEN
    }

    fn encrypt_with_nonce(
        &self,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        check_key(key, KEY_LEN)?;
        check_nonce(nonce, NONCE_LEN)?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
        cipher
            .encrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: plaintext,
                    aad: associated_data,
                },
            )
            .map_err(|_| AeadError::Encryption)
    }

    fn decrypt(
        &self,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, AeadError> {
        check_key(key, KEY_LEN)?;
        check_nonce(nonce, NONCE_LEN)?;
        if ciphertext.len() < TAG_LEN {
            return Err(AeadError::AuthenticationFailure);
        }
        let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
        cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: associated_data,
                },
            )
            .map_err(|_| AeadError::AuthenticationFailure)
    }
}
