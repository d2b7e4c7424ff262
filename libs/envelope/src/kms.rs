//! Remote key service speaking the KMS JSON protocol.
//!
//! Requests are `POST /` with an `X-Amz-Target` header naming the operation
//! and a JSON body; binary fields travel base64-encoded. Request signing is
//! left to the endpoint (a KMS emulator, or a signing sidecar in front of
//! the real service).

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::{DataKey, EnvelopeError, KeyMaterial, KeyService};

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_GENERATE_DATA_KEY: &str = "TrentService.GenerateDataKey";
const TARGET_DECRYPT: &str = "TrentService.Decrypt";
const KEY_SPEC_AES_256: &str = "AES_256";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GenerateDataKeyRequest<'a> {
    key_id: &'a str,
    key_spec: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GenerateDataKeyResponse {
    ciphertext_blob: String,
    plaintext: Zeroizing<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DecryptRequest {
    ciphertext_blob: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DecryptResponse {
    plaintext: Zeroizing<String>,
}

#[derive(Debug, Deserialize)]
struct KmsErrorBody {
    #[serde(rename = "__type", default)]
    error_type: String,
    #[serde(alias = "Message", default)]
    message: String,
}

/// KMS client over HTTP. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct KmsKeyService {
    client: reqwest::Client,
    endpoint: String,
}

impl KmsKeyService {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, EnvelopeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EnvelopeError::KeyService(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call<Req, Resp>(&self, target: &str, request: &Req) -> Result<Resp, EnvelopeError>
    where
        Req: Serialize + Sync,
        Resp: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/", self.endpoint);
        debug!(url = %url, target = %target, "Calling key service");

        let body = serde_json::to_vec(request)
            .map_err(|e| EnvelopeError::KeyService(format!("failed to encode request: {e}")))?;

        let response = self
            .client
            .post(&url)
            .header("X-Amz-Target", target)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| EnvelopeError::KeyService(format!("{target}: {e}")))?;

        let status = response.status();
        // Success bodies carry plaintext key material.
        let bytes = Zeroizing::new(Vec::<u8>::from(
            response
                .bytes()
                .await
                .map_err(|e| EnvelopeError::KeyService(format!("{target}: {e}")))?,
        ));

        if !status.is_success() {
            let detail = serde_json::from_slice::<KmsErrorBody>(&bytes)
                .map(|err| format!("{} {}", err.error_type, err.message))
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            warn!(status = %status, target = %target, detail = %detail, "Key service request failed");
            return Err(EnvelopeError::KeyService(format!(
                "{target} returned {status}: {}",
                detail.trim()
            )));
        }

        parse_response(target, &bytes)
    }
}

fn parse_response<Resp>(target: &str, body: &[u8]) -> Result<Resp, EnvelopeError>
where
    Resp: for<'de> Deserialize<'de>,
{
    serde_json::from_slice(body)
        .map_err(|e| EnvelopeError::KeyService(format!("{target}: invalid response: {e}")))
}

fn decode_blob(field: &str, value: &str) -> Result<Vec<u8>, EnvelopeError> {
    STANDARD
        .decode(value)
        .map_err(|e| EnvelopeError::KeyService(format!("invalid {field} encoding: {e}")))
}

#[async_trait]
impl KeyService for KmsKeyService {
    async fn generate_data_key(&self, key_alias: &str) -> Result<DataKey, EnvelopeError> {
        let response: GenerateDataKeyResponse = self
            .call(
                TARGET_GENERATE_DATA_KEY,
                &GenerateDataKeyRequest {
                    key_id: key_alias,
                    key_spec: KEY_SPEC_AES_256,
                },
            )
            .await?;

        let plaintext = KeyMaterial::take_from(decode_blob("Plaintext", &response.plaintext)?)?;
        let ciphertext = decode_blob("CiphertextBlob", &response.ciphertext_blob)?;

        Ok(DataKey {
            plaintext,
            ciphertext,
        })
    }

    async fn decrypt_data_key(&self, ciphertext: &[u8]) -> Result<KeyMaterial, EnvelopeError> {
        let response: DecryptResponse = self
            .call(
                TARGET_DECRYPT,
                &DecryptRequest {
                    ciphertext_blob: STANDARD.encode(ciphertext),
                },
            )
            .await?;

        KeyMaterial::take_from(decode_blob("Plaintext", &response.plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::KEY_BYTES;

    #[tokio::test]
    async fn test_generate_data_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("X-Amz-Target", TARGET_GENERATE_DATA_KEY))
            .and(header("Content-Type", CONTENT_TYPE))
            .and(body_json(serde_json::json!({
                "KeyId": "alias/feed",
                "KeySpec": "AES_256"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "CiphertextBlob": STANDARD.encode(b"wrapped"),
                "Plaintext": STANDARD.encode([4u8; KEY_BYTES]),
                "KeyId": "arn:aws:kms:local:0:key/1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let kms = KmsKeyService::new(server.uri()).unwrap();
        let data_key = kms.generate_data_key("alias/feed").await.unwrap();

        assert_eq!(data_key.plaintext.as_bytes(), &[4u8; KEY_BYTES]);
        assert_eq!(data_key.ciphertext, b"wrapped");
    }

    #[tokio::test]
    async fn test_decrypt_data_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-Amz-Target", TARGET_DECRYPT))
            .and(body_json(serde_json::json!({
                "CiphertextBlob": STANDARD.encode(b"wrapped")
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Plaintext": STANDARD.encode([6u8; KEY_BYTES]),
                "KeyId": "arn:aws:kms:local:0:key/1"
            })))
            .mount(&server)
            .await;

        let kms = KmsKeyService::new(server.uri()).unwrap();
        let key = kms.decrypt_data_key(b"wrapped").await.unwrap();

        assert_eq!(key.as_bytes(), &[6u8; KEY_BYTES]);
    }

    #[tokio::test]
    async fn test_error_status_is_key_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "__type": "NotFoundException",
                "message": "Alias not found"
            })))
            .mount(&server)
            .await;

        let kms = KmsKeyService::new(server.uri()).unwrap();
        let err = kms.generate_data_key("alias/missing").await.unwrap_err();

        match err {
            EnvelopeError::KeyService(detail) => {
                assert!(detail.contains("NotFoundException"));
                assert!(detail.contains("Alias not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_short_plaintext_is_invalid_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "CiphertextBlob": STANDARD.encode(b"wrapped"),
                "Plaintext": STANDARD.encode([1u8; 16])
            })))
            .mount(&server)
            .await;

        let kms = KmsKeyService::new(server.uri()).unwrap();
        let err = kms.generate_data_key("alias/feed").await.unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidKey));
    }

    #[test]
    fn test_plaintext_field_is_wiped_on_zeroize() {
        use zeroize::Zeroize;

        let body = serde_json::to_vec(&serde_json::json!({
            "Plaintext": STANDARD.encode([9u8; KEY_BYTES]),
            "KeyId": "arn:aws:kms:local:0:key/1"
        }))
        .unwrap();

        let mut response: DecryptResponse = parse_response(TARGET_DECRYPT, &body).unwrap();
        assert_eq!(
            decode_blob("Plaintext", &response.plaintext).unwrap(),
            [9u8; KEY_BYTES]
        );

        response.plaintext.zeroize();
        assert!(response.plaintext.is_empty());
    }

    #[test]
    fn test_invalid_response_body() {
        let err = parse_response::<GenerateDataKeyResponse>(TARGET_GENERATE_DATA_KEY, b"{}")
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::KeyService(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let kms = KmsKeyService::new("http://127.0.0.1:1").unwrap();
        let err = kms.generate_data_key("alias/feed").await.unwrap_err();
        assert!(matches!(err, EnvelopeError::KeyService(_)));
    }
}
