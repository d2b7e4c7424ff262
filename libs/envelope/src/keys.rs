//! Key service interface and key material containers.

use async_trait::async_trait;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{EnvelopeError, KEY_BYTES};

/// Prefix applied to configured key aliases.
pub const KEY_ALIAS_PREFIX: &str = "alias/";

/// Qualify a configured alias name (`feed-key` becomes `alias/feed-key`).
pub fn key_alias(name: &str) -> String {
    if name.starts_with(KEY_ALIAS_PREFIX) {
        name.to_string()
    } else {
        format!("{KEY_ALIAS_PREFIX}{name}")
    }
}

/// A plaintext 256-bit key, zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial([u8; KEY_BYTES]);

impl KeyMaterial {
    pub fn new(bytes: [u8; KEY_BYTES]) -> Self {
        Self(bytes)
    }

    /// Copy key bytes out of `bytes`, zeroizing the source buffer.
    pub fn take_from(mut bytes: Vec<u8>) -> Result<Self, EnvelopeError> {
        let result = <[u8; KEY_BYTES]>::try_from(bytes.as_slice())
            .map(Self)
            .map_err(|_| EnvelopeError::InvalidKey);
        bytes.zeroize();
        result
    }

    pub fn as_bytes(&self) -> &[u8; KEY_BYTES] {
        &self.0
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial(..)")
    }
}

/// A freshly generated data key: plaintext for sealing, ciphertext for shipping.
#[derive(Debug)]
pub struct DataKey {
    pub plaintext: KeyMaterial,
    pub ciphertext: Vec<u8>,
}

/// Remote (or local) key management.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Generate a new AES-256 data key under the master key named by `key_alias`.
    async fn generate_data_key(&self, key_alias: &str) -> Result<DataKey, EnvelopeError>;

    /// Recover the plaintext data key from its ciphertext blob.
    async fn decrypt_data_key(&self, ciphertext: &[u8]) -> Result<KeyMaterial, EnvelopeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_alias_prefix() {
        assert_eq!(key_alias("feed"), "alias/feed");
        assert_eq!(key_alias("alias/feed"), "alias/feed");
    }

    #[test]
    fn test_take_from_rejects_wrong_length() {
        assert!(matches!(
            KeyMaterial::take_from(vec![1u8; 16]),
            Err(EnvelopeError::InvalidKey)
        ));
        let key = KeyMaterial::take_from(vec![9u8; KEY_BYTES]).unwrap();
        assert_eq!(key.as_bytes(), &[9u8; KEY_BYTES]);
    }

    #[test]
    fn test_debug_hides_key() {
        let key = KeyMaterial::new([1u8; KEY_BYTES]);
        assert_eq!(format!("{key:?}"), "KeyMaterial(..)");
    }
}
