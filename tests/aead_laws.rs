use lockbench::{AeadError, Algorithm};
use proptest::prelude::*;

fn any_algorithm() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(Algorithm::ALL.to_vec())
}

proptest! {
    #[test]
    fn decrypt_inverts_encrypt(
        alg in any_algorithm(),
        plaintext in prop::collection::vec(any::<u8>(), 0..256),
        ad in prop::collection::vec(any::<u8>(), 0..64),
        key_byte in any::<u8>(),
    ) {
        let scheme = alg.scheme();
        let key = vec![key_byte; scheme.key_len()];
        let sealed = scheme.encrypt(&key, &ad, &plaintext).unwrap();
        prop_assert_eq!(sealed.nonce.len(), scheme.nonce_len());
        prop_assert_eq!(sealed.ciphertext.len(), plaintext.len() + scheme.tag_len());
        let recovered = scheme.decrypt(&key, &sealed.nonce, &ad, &sealed.ciphertext).unwrap();
        prop_assert_eq!(recovered, plaintext);
    }

    #[test]
    fn any_single_bit_flip_is_rejected(
        alg in any_algorithm(),
        plaintext in prop::collection::vec(any::<u8>(), 0..128),
        pos in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let scheme = alg.scheme();
        let key = vec![0x42; scheme.key_len()];
        let ad = b"lock_id_bike_station_A_slot_42";
        let sealed = scheme.encrypt(&key, ad, &plaintext).unwrap();

        let mut tampered = sealed.ciphertext.clone();
        let i = pos.index(tampered.len());
        tampered[i] ^= 1 << bit;
        prop_assert_eq!(
            scheme.decrypt(&key, &sealed.nonce, ad, &tampered),
            Err(AeadError::AuthenticationFailure)
        );
    }
}

#[test]
fn wrong_lengths_are_reported() {
    for alg in Algorithm::ALL {
        let scheme = alg.scheme();
        let key = vec![0u8; scheme.key_len()];
        let nonce = vec![0u8; scheme.nonce_len()];
        assert_eq!(
            scheme.encrypt_with_nonce(&key[1..], &nonce, b"", b"x"),
            Err(AeadError::InvalidKeyLength {
                expected: scheme.key_len(),
                actual: scheme.key_len() - 1,
            })
        );
        assert_eq!(
            scheme.decrypt(&key, &nonce[1..], b"", &[0u8; 32]),
            Err(AeadError::InvalidNonceLength {
                expected: scheme.nonce_len(),
                actual: scheme.nonce_len() - 1,
            })
        );
    }
}

#[test]
fn truncated_ciphertext_is_unauthentic() {
    for alg in Algorithm::ALL {
        let scheme = alg.scheme();
        let key = vec![1u8; scheme.key_len()];
        let nonce = vec![2u8; scheme.nonce_len()];
        assert_eq!(
            scheme.decrypt(&key, &nonce, b"", &[0u8; 5]),
            Err(AeadError::AuthenticationFailure)
        );
    }
}
