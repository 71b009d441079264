//! Remote KMS-backed capabilities.
//!
//! `kms-sm4-128-gcm` and `kms-sm2` delegate encryption to the KMS, `kms-sign`
//! delegates signing. All of them talk to the service through [`KmsClient`],
//! which is the seam tests replace with an in-process stub.
//!
//! The HTTP client requires the `kms` feature (on by default).

use std::fmt;
use std::sync::Arc;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::types::required;
use crate::error::{ConfigError, Result};

mod crypto;
#[cfg(feature = "kms")]
mod http;
mod sign;

pub use self::crypto::{KmsSm2Crypto, KmsSm4Crypto};
#[cfg(feature = "kms")]
pub use self::http::HttpKmsClient;
pub use self::sign::KmsSigner;

/// Remote symmetric algorithm behind `kms-sm4-128-gcm`.
pub const REMOTE_SM4_ALGORITHM: &str = "SM4_CBC_PKCS7PADDING";

/// Remote signature algorithm behind `kms-sign`.
pub const REMOTE_SIGN_ALGORITHM: &str = "SM2DSA";

/// Message type for `kms-sign`: the message is signed as-is.
pub const RAW_MESSAGE_TYPE: &str = "RAW";

/// Parameters of a `SignByAsymmetricKey` / `VerifyByAsymmetricKey` call.
#[derive(Debug, Clone, Copy)]
pub struct SignatureRequest<'a> {
    pub key_id: &'a str,
    pub algorithm: &'a str,
    pub message_type: &'a str,
    /// Base64 of the message bytes.
    pub message: &'a str,
}

/// The subset of the KMS API used by the remote family.
///
/// Payloads cross this boundary base64-encoded, exactly as the service
/// expects them.
pub trait KmsClient: Send + Sync + fmt::Debug {
    /// `Encrypt`: returns the `CiphertextBlob`.
    fn encrypt(&self, key_id: &str, algorithm: &str, plaintext_b64: &str) -> Result<String>;

    /// `Decrypt`: returns the base64 plaintext.
    fn decrypt(&self, ciphertext_blob: &str) -> Result<String>;

    /// `AsymmetricSm2Encrypt`: returns the ciphertext.
    fn sm2_encrypt(&self, key_id: &str, plaintext_b64: &str) -> Result<String>;

    /// `AsymmetricSm2Decrypt`: returns the base64 plaintext.
    fn sm2_decrypt(&self, key_id: &str, ciphertext: &str) -> Result<String>;

    /// `SignByAsymmetricKey`: returns the signature.
    fn sign(&self, request: &SignatureRequest<'_>) -> Result<String>;

    /// `VerifyByAsymmetricKey`: returns whether the signature is valid.
    fn verify(&self, request: &SignatureRequest<'_>, signature: &str) -> Result<bool>;
}

/// Endpoint and API credentials for a KMS client.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KmsCredentials {
    #[zeroize(skip)]
    pub kms_server: String,
    pub secret_id: String,
    pub secret_key: String,
}

impl KmsCredentials {
    /// Validate and collect remote settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when `kms_server` is empty.
    pub fn new(method: &str, kms_server: &str, secret_id: &str, secret_key: &str) -> Result<Self> {
        if kms_server.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{}: invalid kms_server config", method)).into());
        }
        Ok(Self {
            kms_server: kms_server.trim().to_string(),
            secret_id: secret_id.to_string(),
            secret_key: secret_key.to_string(),
        })
    }
}

impl fmt::Debug for KmsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsCredentials")
            .field("kms_server", &self.kms_server)
            .finish_non_exhaustive()
    }
}

/// Build the default client for a method.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` if the crate was built without the `kms`
/// feature.
pub fn connect(method: &str, credentials: KmsCredentials) -> Result<Arc<dyn KmsClient>> {
    #[cfg(feature = "kms")]
    {
        let _ = method;
        Ok(Arc::new(HttpKmsClient::new(credentials)?))
    }
    #[cfg(not(feature = "kms"))]
    {
        drop(credentials);
        Err(ConfigError::Invalid(format!(
            "{}: KMS support not compiled. Rebuild with: cargo build --features kms",
            method
        ))
        .into())
    }
}

/// Require a non-empty key id.
pub(crate) fn key_id<'a>(method: &str, value: &'a str) -> Result<&'a str> {
    required(method, "key_id", value)
}

/// In-process KMS used by unit tests.
///
/// "Encryption" is a reversible transform tagged with the key id; it checks
/// the plumbing, not the cryptography.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct StubKms {
    pub calls: std::sync::Mutex<Vec<&'static str>>,
}

#[cfg(test)]
impl StubKms {
    fn record(&self, action: &'static str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(action);
        }
    }

    fn seal(key_id: &str, b64: &str) -> String {
        format!("{}.{}", hex::encode(key_id), b64.chars().rev().collect::<String>())
    }

    fn open(blob: &str) -> Result<(String, String)> {
        use crate::error::RemoteError;
        let (key, body) = blob.split_once('.').ok_or_else(|| RemoteError::Service {
            code: "InvalidParameter".to_string(),
            message: "malformed blob".to_string(),
        })?;
        let key = hex::decode(key)
            .ok()
            .and_then(|k| String::from_utf8(k).ok())
            .ok_or_else(|| RemoteError::Response("bad key tag".to_string()))?;
        Ok((key, body.chars().rev().collect()))
    }
}

#[cfg(test)]
impl KmsClient for StubKms {
    fn encrypt(&self, key_id: &str, _algorithm: &str, plaintext_b64: &str) -> Result<String> {
        self.record("Encrypt");
        Ok(Self::seal(key_id, plaintext_b64))
    }

    fn decrypt(&self, ciphertext_blob: &str) -> Result<String> {
        self.record("Decrypt");
        Ok(Self::open(ciphertext_blob)?.1)
    }

    fn sm2_encrypt(&self, key_id: &str, plaintext_b64: &str) -> Result<String> {
        self.record("AsymmetricSm2Encrypt");
        Ok(Self::seal(key_id, plaintext_b64))
    }

    fn sm2_decrypt(&self, key_id: &str, ciphertext: &str) -> Result<String> {
        use crate::error::RemoteError;
        self.record("AsymmetricSm2Decrypt");
        let (sealed_for, body) = Self::open(ciphertext)?;
        if sealed_for != key_id {
            return Err(RemoteError::Service {
                code: "FailedOperation".to_string(),
                message: "key mismatch".to_string(),
            }
            .into());
        }
        Ok(body)
    }

    fn sign(&self, request: &SignatureRequest<'_>) -> Result<String> {
        self.record("SignByAsymmetricKey");
        Ok(Self::seal(request.key_id, request.message))
    }

    fn verify(&self, request: &SignatureRequest<'_>, signature: &str) -> Result<bool> {
        self.record("VerifyByAsymmetricKey");
        Ok(Self::seal(request.key_id, request.message) == signature)
    }
}
