//! Property-based tests for the content cipher

#[cfg(feature = "ssr")]
mod tests {
    use heyboo::backend::crypto::{CipherError, ContentCipher};
    use proptest::prelude::*;

    fn cipher() -> ContentCipher {
        ContentCipher::new(&[0x42; 32])
    }

    proptest! {
        #[test]
        fn test_roundtrip(message in ".*") {
            let cipher = cipher();
            let blob = cipher.encrypt(&message).unwrap();
            prop_assert_eq!(cipher.decrypt(&blob).unwrap(), message);
        }

        #[test]
        fn test_nonce_freshness(message in ".*") {
            let cipher = cipher();
            prop_assert_ne!(cipher.encrypt(&message).unwrap(), cipher.encrypt(&message).unwrap());
        }

        #[test]
        fn test_single_byte_corruption_detected(message in ".{0,64}", position in any::<prop::sample::Index>()) {
            let cipher = cipher();
            let mut bytes = hex::decode(cipher.encrypt(&message).unwrap()).unwrap();
            let index = position.index(bytes.len());
            bytes[index] ^= 0x01;

            let result = cipher.decrypt(&hex::encode(&bytes));
            prop_assert!(matches!(result, Err(CipherError::Decryption(_))));
        }

        #[test]
        fn test_short_blobs_rejected(bytes in proptest::collection::vec(any::<u8>(), 0..28)) {
            let result = cipher().decrypt(&hex::encode(&bytes));
            prop_assert_eq!(result, Err(CipherError::Decryption("ciphertext too short")));
        }
    }
}
