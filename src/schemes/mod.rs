mod aes_gcm;
mod ascon;
mod xchacha;

pub use aes_gcm::Aes128GcmScheme;
pub use ascon::Ascon128Scheme;
pub use xchacha::XChaCha20Poly1305Scheme;
