use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Nonce};

use crate::crypto::{check_key, check_nonce, AeadScheme};
use crate::error::AeadError;

pub const KEY_LEN: usize = 16;
/// 96-bit nonce, the size NIST SP 800-38D recommends for GCM.
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// AES-128 in Galois/Counter Mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct Aes128GcmScheme;

impl AeadScheme for Aes128GcmScheme {
    fn name(&self) -> &'static str {
        "AES-128-GCM"
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
        let cipher = Aes128Gcm::new(GenericArray::from_slice(key));
        cipher
            .encrypt(
                Nonce::from_slice(nonce),
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
        let cipher = Aes128Gcm::new(GenericArray::from_slice(key));
        cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: associated_data,
                },
            )
            .map_err(|_| AeadError::AuthenticationFailure)
    }
}
