//! Output cipher applied to every serialized response.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{decode_envelope, encode_envelope, open, seal, DataKey, EnvelopeError, KeyService};

/// Transformation applied to a serialized document before it is sent.
#[async_trait]
pub trait OutputCipher: Send + Sync {
    /// Encrypt (or pass through) a serialized document.
    async fn encrypt(&self, plaintext: Vec<u8>) -> Result<Vec<u8>, EnvelopeError>;

    /// Whether output is actually encrypted.
    fn is_enabled(&self) -> bool;

    /// Verify the key service can issue data keys. No-op when disabled.
    async fn check(&self) -> Result<(), EnvelopeError>;
}

/// Identity cipher used when no key alias is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainOutput;

#[async_trait]
impl OutputCipher for PlainOutput {
    async fn encrypt(&self, plaintext: Vec<u8>) -> Result<Vec<u8>, EnvelopeError> {
        Ok(plaintext)
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn check(&self) -> Result<(), EnvelopeError> {
        Ok(())
    }
}

/// Envelope encryption with a fresh data key per response.
#[derive(Clone)]
pub struct EnvelopeCipher {
    key_alias: String,
    keys: Arc<dyn KeyService>,
}

impl EnvelopeCipher {
    pub fn new(key_alias: impl Into<String>, keys: Arc<dyn KeyService>) -> Self {
        Self {
            key_alias: key_alias.into(),
            keys,
        }
    }

    pub fn key_alias(&self) -> &str {
        &self.key_alias
    }
}

#[async_trait]
impl OutputCipher for EnvelopeCipher {
    async fn encrypt(&self, plaintext: Vec<u8>) -> Result<Vec<u8>, EnvelopeError> {
        encrypt(&plaintext, self.keys.as_ref(), &self.key_alias).await
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn check(&self) -> Result<(), EnvelopeError> {
        self.keys.generate_data_key(&self.key_alias).await.map(|_| ())
    }
}

/// Seal `plaintext` under a new data key and encode the envelope.
///
/// The plaintext data key is zeroized as soon as the payload is sealed.
pub async fn encrypt(
    plaintext: &[u8],
    keys: &dyn KeyService,
    key_alias: &str,
) -> Result<Vec<u8>, EnvelopeError> {
    let DataKey {
        plaintext: key,
        ciphertext: key_ciphertext,
    } = keys.generate_data_key(key_alias).await?;
    let sealed = seal(key.as_bytes(), plaintext);
    drop(key);
    let sealed = sealed?;

    debug!(
        key_alias = %key_alias,
        plaintext_len = plaintext.len(),
        sealed_len = sealed.len(),
        "Encrypted output"
    );
    Ok(encode_envelope(&key_ciphertext, &sealed))
}

/// Reverse of [`encrypt`]: unwrap the data key through `keys` and open the payload.
pub async fn decrypt(blob: &[u8], keys: &dyn KeyService) -> Result<Vec<u8>, EnvelopeError> {
    let (key_ciphertext, sealed) = decode_envelope(blob)?;
    let key = keys.decrypt_data_key(&key_ciphertext).await?;
    let plaintext = open(key.as_bytes(), &sealed);
    drop(key);
    plaintext
}
