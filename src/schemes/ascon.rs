use ascon_aead::aead::generic_array::GenericArray;
use ascon_aead::aead::{Aead, KeyInit, Payload};
use ascon_aead::Ascon128;

use crate::crypto::{check_key, check_nonce, AeadScheme};
use crate::error::AeadError;

pub const KEY_LEN: usize = 16;
pub const NONCE_LEN: usize = 16;
pub const TAG_LEN: usize = 16;

/// ASCON-128, the sponge-based NIST lightweight AEAD.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ascon128Scheme;

impl AeadScheme for Ascon128Scheme {
    fn name(&self) -> &'static str {
        "ASCON-128"
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
        let cipher = Ascon128::new(GenericArray::from_slice(key));
        cipher
            .encrypt(
                GenericArray::from_slice(nonce),
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
        let cipher = Ascon128::new(GenericArray::from_slice(key));
        cipher
            .decrypt(
                GenericArray::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: associated_data,
                },
            )
            .map_err(|_| AeadError::AuthenticationFailure)
    }
}
