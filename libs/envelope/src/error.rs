//! Error types for envelope encryption.

use thiserror::Error;

/// Errors raised by the encryption layer.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The key service could not be reached or refused the request.
    #[error("key service error: {0}")]
    KeyService(String),

    /// The envelope or sealed payload is structurally invalid.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Key material has the wrong size or encoding.
    #[error("invalid key material")]
    InvalidKey,

    /// The key blob was wrapped under a different master key.
    #[error("unknown master key id: {0}")]
    UnknownMasterKey(String),

    /// Sealing failed.
    #[error("encryption failed")]
    Encrypt,

    /// Opening failed (wrong key or tampered ciphertext).
    #[error("decryption failed")]
    Decrypt,
}
