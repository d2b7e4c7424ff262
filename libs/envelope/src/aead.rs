//! AES-256-GCM sealing with a random nonce prepended to the ciphertext.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

use crate::EnvelopeError;

/// AES-256 key size.
pub const KEY_BYTES: usize = 32;

/// GCM nonce size (96 bits).
pub const NONCE_BYTES: usize = 12;

/// Encrypt `plaintext` under `key`, returning `nonce || ciphertext`.
pub fn seal(key: &[u8; KEY_BYTES], plaintext: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EnvelopeError::InvalidKey)?;

    let mut nonce_bytes = [0u8; NONCE_BYTES];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| EnvelopeError::Encrypt)?;

    let mut sealed = Vec::with_capacity(NONCE_BYTES + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt `nonce || ciphertext` produced by [`seal`].
pub fn open(key: &[u8; KEY_BYTES], sealed: &[u8]) -> Result<Vec<u8>, EnvelopeError> {
    if sealed.len() < NONCE_BYTES {
        return Err(EnvelopeError::MalformedCiphertext(format!(
            "sealed payload is {} bytes, shorter than the {NONCE_BYTES}-byte nonce",
            sealed.len()
        )));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_BYTES);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EnvelopeError::InvalidKey)?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| EnvelopeError::Decrypt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = [7u8; KEY_BYTES];
        let sealed = seal(&key, b"hello feed").unwrap();

        assert_eq!(sealed.len(), NONCE_BYTES + b"hello feed".len() + 16);
        assert_eq!(open(&key, &sealed).unwrap(), b"hello feed");
    }

    #[test]
    fn test_nonce_is_fresh_per_seal() {
        let key = [7u8; KEY_BYTES];
        let a = seal(&key, b"same").unwrap();
        let b = seal(&key, b"same").unwrap();

        assert_ne!(a[..NONCE_BYTES], b[..NONCE_BYTES]);
    }

    #[test]
    fn test_open_short_input_is_malformed() {
        let err = open(&[0u8; KEY_BYTES], &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedCiphertext(_)));
    }

    #[test]
    fn test_open_with_wrong_key_fails() {
        let sealed = seal(&[1u8; KEY_BYTES], b"secret").unwrap();
        let err = open(&[2u8; KEY_BYTES], &sealed).unwrap_err();
        assert!(matches!(err, EnvelopeError::Decrypt));
    }
}
