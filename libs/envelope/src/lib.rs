//! # esatom-envelope
//!
//! Optional envelope encryption for serialized feed responses.
//!
//! Each response is sealed with a fresh AES-256-GCM data key obtained from a
//! key service. The key service also returns the data key encrypted under a
//! master key; that blob travels with the response so the consumer can ask
//! the key service to unwrap it.
//!
//! ## Wire Format
//!
//! ```text
//! base64(key ciphertext) "::" base64(nonce || AES-GCM ciphertext)
//! ```
//!
//! The base64 alphabet never contains `:`, so the separator is unambiguous.
//!
//! When no key alias is configured, [`PlainOutput`] passes bytes through
//! unchanged.

mod aead;
mod cipher;
mod error;
mod keys;
mod kms;
mod local;
mod wire;

pub use aead::{open, seal, KEY_BYTES, NONCE_BYTES};
pub use cipher::{decrypt, encrypt, EnvelopeCipher, OutputCipher, PlainOutput};
pub use error::EnvelopeError;
pub use keys::{key_alias, DataKey, KeyMaterial, KeyService, KEY_ALIAS_PREFIX};
pub use kms::KmsKeyService;
pub use local::LocalKeyService;
pub use wire::{decode_envelope, encode_envelope, looks_like_envelope, SEPARATOR};
