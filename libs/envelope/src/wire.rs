//! Text encoding of an envelope: `base64(key blob)::base64(sealed payload)`.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::EnvelopeError;

/// Separates the key blob from the sealed payload.
pub const SEPARATOR: &str = "::";

/// Encode a key blob and sealed payload into the wire form.
pub fn encode_envelope(key_ciphertext: &[u8], sealed: &[u8]) -> Vec<u8> {
    format!(
        "{}{SEPARATOR}{}",
        STANDARD.encode(key_ciphertext),
        STANDARD.encode(sealed)
    )
    .into_bytes()
}

/// Split and decode the wire form into `(key ciphertext, sealed payload)`.
pub fn decode_envelope(blob: &[u8]) -> Result<(Vec<u8>, Vec<u8>), EnvelopeError> {
    let text = std::str::from_utf8(blob)
        .map_err(|_| EnvelopeError::MalformedCiphertext("envelope is not ASCII text".into()))?
        .trim();

    let parts: Vec<&str> = text.split(SEPARATOR).collect();
    if parts.len() != 2 {
        return Err(EnvelopeError::MalformedCiphertext(format!(
            "expected two parts separated by '{SEPARATOR}', got {}",
            parts.len()
        )));
    }

    let key_ciphertext = STANDARD
        .decode(parts[0])
        .map_err(|e| EnvelopeError::MalformedCiphertext(format!("key blob: {e}")))?;
    let sealed = STANDARD
        .decode(parts[1])
        .map_err(|e| EnvelopeError::MalformedCiphertext(format!("payload: {e}")))?;

    Ok((key_ciphertext, sealed))
}

/// Whether `body` looks like an envelope rather than a plain XML document.
pub fn looks_like_envelope(body: &[u8]) -> bool {
    let body = match std::str::from_utf8(body) {
        Ok(text) => text.trim_start(),
        Err(_) => return false,
    };
    !body.starts_with('<') && body.contains(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let wire = encode_envelope(b"key-blob", b"sealed-bytes");
        let text = String::from_utf8(wire.clone()).unwrap();
        assert_eq!(text.matches(SEPARATOR).count(), 1);

        let (key, sealed) = decode_envelope(&wire).unwrap();
        assert_eq!(key, b"key-blob");
        assert_eq!(sealed, b"sealed-bytes");
    }

    #[test]
    fn test_decode_missing_separator() {
        let err = decode_envelope(b"a2V5").unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedCiphertext(_)));
    }

    #[test]
    fn test_decode_extra_separator() {
        let err = decode_envelope(b"a2V5::cGF5::bW9yZQ==").unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedCiphertext(_)));
    }

    #[test]
    fn test_decode_bad_base64() {
        let err = decode_envelope(b"not base64!::cGF5").unwrap_err();
        assert!(matches!(err, EnvelopeError::MalformedCiphertext(_)));
    }

    #[test]
    fn test_looks_like_envelope() {
        assert!(looks_like_envelope(b"a2V5::cGF5"));
        assert!(!looks_like_envelope(b"<feed xmlns=\"x\"></feed>"));
        assert!(!looks_like_envelope(b"plain"));
    }
}
