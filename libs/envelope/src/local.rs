//! In-process key service backed by a single master key.
//!
//! Data keys are random per call and wrapped with AES-256-GCM under the
//! master key. The key blob is `master key id || nonce || wrapped key`, so a
//! blob produced under a different master key is rejected up front.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroize;

use crate::{open, seal, DataKey, EnvelopeError, KeyMaterial, KeyService, KEY_BYTES};

const KEY_ID_LEN: usize = 8;

/// Key service holding the master key in process memory.
pub struct LocalKeyService {
    master: KeyMaterial,
    key_id: String,
}

impl LocalKeyService {
    pub fn new(master: KeyMaterial) -> Self {
        let key_id = master_key_id(master.as_bytes());
        Self { master, key_id }
    }

    /// Load the master key from its base64 encoding.
    pub fn from_base64(encoded: &str) -> Result<Self, EnvelopeError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| EnvelopeError::InvalidKey)?;
        Ok(Self::new(KeyMaterial::take_from(bytes)?))
    }

    /// Short identifier derived from the master key.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

fn master_key_id(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)[..KEY_ID_LEN].to_string()
}

#[async_trait]
impl KeyService for LocalKeyService {
    async fn generate_data_key(&self, key_alias: &str) -> Result<DataKey, EnvelopeError> {
        let mut bytes = [0u8; KEY_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let plaintext = KeyMaterial::new(bytes);
        bytes.zeroize();

        let wrapped = seal(self.master.as_bytes(), plaintext.as_bytes())?;
        let mut ciphertext = Vec::with_capacity(KEY_ID_LEN + wrapped.len());
        ciphertext.extend_from_slice(self.key_id.as_bytes());
        ciphertext.extend_from_slice(&wrapped);

        debug!(key_alias = %key_alias, master_key_id = %self.key_id, "Generated local data key");
        Ok(DataKey {
            plaintext,
            ciphertext,
        })
    }

    async fn decrypt_data_key(&self, ciphertext: &[u8]) -> Result<KeyMaterial, EnvelopeError> {
        if ciphertext.len() < KEY_ID_LEN {
            return Err(EnvelopeError::MalformedCiphertext(
                "key blob shorter than master key id".into(),
            ));
        }

        let (key_id, wrapped) = ciphertext.split_at(KEY_ID_LEN);
        if key_id != self.key_id.as_bytes() {
            return Err(EnvelopeError::UnknownMasterKey(
                String::from_utf8_lossy(key_id).into_owned(),
            ));
        }

        KeyMaterial::take_from(open(self.master.as_bytes(), wrapped)?)
    }
}
