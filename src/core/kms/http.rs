//! HTTP client for the KMS JSON API (Tencent Cloud API 3.0 style).
//!
//! Every action is a `POST /` with a JSON body, the action name in
//! `X-TC-Action` and a TC3-HMAC-SHA256 `Authorization` header. Responses
//! are wrapped in `{"Response": {...}}`, with failures reported as
//! `{"Response": {"Error": {"Code": ..., "Message": ...}}}`.
//!
//! TLS certificates are verified.

use std::fmt;

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use super::{KmsClient, KmsCredentials, SignatureRequest};
use crate::error::{RemoteError, Result};

const SERVICE: &str = "tseckms";
const API_VERSION: &str = "2019-01-18";
const SIGNATURE_ALGORITHM: &str = "TC3-HMAC-SHA256";
const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host";

/// Blocking HTTP implementation of [`KmsClient`].
pub struct HttpKmsClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    host: String,
    credentials: KmsCredentials,
}

impl HttpKmsClient {
    /// Create a client with a default `reqwest` configuration.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Transport` if the HTTP client cannot be built.
    pub fn new(credentials: KmsCredentials) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self::with_http_client(credentials, http))
    }

    /// Create a client around a caller-configured `reqwest` client, e.g. one
    /// with a timeout or a private CA.
    pub fn with_http_client(credentials: KmsCredentials, http: reqwest::blocking::Client) -> Self {
        let (endpoint, host) = endpoint_and_host(&credentials.kms_server);
        debug!(host = %host, "configured kms endpoint");
        Self {
            http,
            endpoint,
            host,
            credentials,
        }
    }

    fn call<Req, Resp>(&self, action: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_string(request)
            .map_err(|e| RemoteError::Transport(format!("failed to encode request: {}", e)))?;
        let now = Utc::now();
        let timestamp = now.timestamp();
        let date = now.format("%Y-%m-%d").to_string();
        let authorization = authorization(
            &self.credentials.secret_id,
            &self.credentials.secret_key,
            &self.host,
            timestamp,
            &date,
            &payload,
        )?;

        trace!(action, payload_len = payload.len(), "calling kms");
        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", authorization)
            .header("Content-Type", CONTENT_TYPE)
            .header("X-TC-Action", action)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Version", API_VERSION)
            .body(payload)
            .send()
            .map_err(|e| RemoteError::Transport(format!("{}: {}", action, e)))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| RemoteError::Transport(format!("{}: {}", action, e)))?;
        debug!(action, status = status.as_u16(), "kms responded");
        parse_response(&text)
    }
}

impl fmt::Debug for HttpKmsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpKmsClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Accept `host`, `host:port` or a full `https://host[:port][/path]` URL.
fn endpoint_and_host(server: &str) -> (String, String) {
    let (scheme, rest) = match server.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("https", server),
    };
    let host = rest.split('/').next().unwrap_or(rest).to_string();
    (format!("{}://{}/", scheme, host), host)
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
        .map_err(|e| RemoteError::Transport(format!("signing key rejected: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// TC3-HMAC-SHA256 `Authorization` header value.
fn authorization(
    secret_id: &str,
    secret_key: &str,
    host: &str,
    timestamp: i64,
    date: &str,
    payload: &str,
) -> Result<String> {
    let canonical_request = format!(
        "POST\n/\n\ncontent-type:{}\nhost:{}\n\n{}\n{}",
        CONTENT_TYPE,
        host,
        SIGNED_HEADERS,
        hex::encode(Sha256::digest(payload.as_bytes()))
    );
    let scope = format!("{}/{}/tc3_request", date, SERVICE);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        SIGNATURE_ALGORITHM,
        timestamp,
        scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let secret_date = hmac_sha256(format!("TC3{}", secret_key).as_bytes(), date.as_bytes())?;
    let secret_service = hmac_sha256(&secret_date, SERVICE.as_bytes())?;
    let secret_signing = hmac_sha256(&secret_service, b"tc3_request")?;
    let signature = hex::encode(hmac_sha256(&secret_signing, string_to_sign.as_bytes())?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        SIGNATURE_ALGORITHM, secret_id, scope, SIGNED_HEADERS, signature
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiError {
    code: String,
    message: String,
}

fn parse_response<T: DeserializeOwned>(text: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| RemoteError::Response(format!("body is not JSON: {}", e)))?;
    let response = value
        .get("Response")
        .ok_or_else(|| RemoteError::Response("missing Response object".to_string()))?;
    if let Some(error) = response.get("Error") {
        let error: ApiError = serde_json::from_value(error.clone())
            .map_err(|e| RemoteError::Response(format!("malformed Error object: {}", e)))?;
        return Err(RemoteError::Service {
            code: error.code,
            message: error.message,
        }
        .into());
    }
    serde_json::from_value(response.clone())
        .map_err(|e| RemoteError::Response(e.to_string()).into())
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EncryptRequest<'a> {
    key_id: &'a str,
    plaintext: &'a str,
    algorithm: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EncryptResponse {
    ciphertext_blob: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DecryptRequest<'a> {
    ciphertext_blob: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PlaintextResponse {
    plaintext: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Sm2EncryptRequest<'a> {
    key_id: &'a str,
    plaintext: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Sm2EncryptResponse {
    ciphertext: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Sm2DecryptRequest<'a> {
    key_id: &'a str,
    ciphertext: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignRequest<'a> {
    key_id: &'a str,
    algorithm: &'a str,
    message_type: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    signature_value: Option<&'a str>,
}

impl<'a> SignRequest<'a> {
    fn new(request: &SignatureRequest<'a>, signature_value: Option<&'a str>) -> Self {
        Self {
            key_id: request.key_id,
            algorithm: request.algorithm,
            message_type: request.message_type,
            message: request.message,
            signature_value,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignResponse {
    signature: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VerifyResponse {
    signature_valid: bool,
}

impl KmsClient for HttpKmsClient {
    fn encrypt(&self, key_id: &str, algorithm: &str, plaintext_b64: &str) -> Result<String> {
        let response: EncryptResponse = self.call(
            "Encrypt",
            &EncryptRequest {
                key_id,
                plaintext: plaintext_b64,
                algorithm,
            },
        )?;
        Ok(response.ciphertext_blob)
    }

    fn decrypt(&self, ciphertext_blob: &str) -> Result<String> {
        let response: PlaintextResponse =
            self.call("Decrypt", &DecryptRequest { ciphertext_blob })?;
        Ok(response.plaintext)
    }

    fn sm2_encrypt(&self, key_id: &str, plaintext_b64: &str) -> Result<String> {
        let response: Sm2EncryptResponse = self.call(
            "AsymmetricSm2Encrypt",
            &Sm2EncryptRequest {
                key_id,
                plaintext: plaintext_b64,
            },
        )?;
        Ok(response.ciphertext)
    }

    fn sm2_decrypt(&self, key_id: &str, ciphertext: &str) -> Result<String> {
        let response: PlaintextResponse = self.call(
            "AsymmetricSm2Decrypt",
            &Sm2DecryptRequest { key_id, ciphertext },
        )?;
        Ok(response.plaintext)
    }

    fn sign(&self, request: &SignatureRequest<'_>) -> Result<String> {
        let response: SignResponse =
            self.call("SignByAsymmetricKey", &SignRequest::new(request, None))?;
        Ok(response.signature)
    }

    fn verify(&self, request: &SignatureRequest<'_>, signature: &str) -> Result<bool> {
        let response: VerifyResponse = self.call(
            "VerifyByAsymmetricKey",
            &SignRequest::new(request, Some(signature)),
        )?;
        Ok(response.signature_valid)
    }
}
