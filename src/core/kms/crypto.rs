//! KMS-backed Encrypt/Decrypt (`kms-sm4-128-gcm`, `kms-sm2`).

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sm3::{Digest, Sm3};
use tracing::trace;

use super::{key_id, KmsClient, REMOTE_SM4_ALGORITHM};
use crate::core::cipher::{into_utf8, Crypto};
use crate::core::constants::DOMAIN_TAG;
use crate::core::envelope::{self, Codec};
use crate::error::{CipherError, RemoteError, Result};

const DIGEST_SEPARATOR: char = '|';

/// Symmetric encryption performed by the KMS, `wrap(CiphertextBlob)`.
pub struct KmsSm4Crypto {
    codec: Codec,
    key_id: String,
    client: Arc<dyn KmsClient>,
}

impl KmsSm4Crypto {
    pub fn new(method: &str, key_id_value: &str, client: Arc<dyn KmsClient>) -> Result<Self> {
        Ok(Self {
            codec: Codec::new(method),
            key_id: key_id(method, key_id_value)?.to_string(),
            client,
        })
    }
}

impl Crypto for KmsSm4Crypto {
    fn method(&self) -> &str {
        self.codec.method()
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        if envelope::is_envelope(plaintext) {
            return Ok(plaintext.to_string());
        }
        trace!(plaintext_len = plaintext.len(), "encrypting with kms");
        let blob = self
            .client
            .encrypt(&self.key_id, REMOTE_SM4_ALGORITHM, &BASE64.encode(plaintext))?;
        Ok(self.codec.wrap(&[&blob]))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if !envelope::is_envelope(ciphertext) {
            return Ok(ciphertext.to_string());
        }
        let segments = self.codec.unwrap(ciphertext, 1)?;
        trace!(ciphertext_len = segments[0].len(), "decrypting with kms");
        let plaintext_b64 = self.client.decrypt(segments[0])?;
        into_utf8(decode_remote_b64(&plaintext_b64)?)
    }
}

impl fmt::Debug for KmsSm4Crypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsSm4Crypto")
            .field("method", &self.codec.method())
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// SM2 encryption performed by the KMS with an SM3 integrity digest inside
/// the ciphertext.
pub struct KmsSm2Crypto {
    codec: Codec,
    key_id: String,
    client: Arc<dyn KmsClient>,
}

impl KmsSm2Crypto {
    pub fn new(method: &str, key_id_value: &str, client: Arc<dyn KmsClient>) -> Result<Self> {
        Ok(Self {
            codec: Codec::new(method),
            key_id: key_id(method, key_id_value)?.to_string(),
            client,
        })
    }
}

impl Crypto for KmsSm2Crypto {
    fn method(&self) -> &str {
        self.codec.method()
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        if envelope::is_envelope(plaintext) {
            return Ok(plaintext.to_string());
        }
        trace!(plaintext_len = plaintext.len(), "encrypting with kms sm2");
        let payload = digest_payload(plaintext.as_bytes());
        let ciphertext = self
            .client
            .sm2_encrypt(&self.key_id, &BASE64.encode(payload))?;
        Ok(self.codec.wrap(&[&ciphertext]))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if !envelope::is_envelope(ciphertext) {
            return Ok(ciphertext.to_string());
        }
        let segments = self.codec.unwrap(ciphertext, 1)?;
        trace!(ciphertext_len = segments[0].len(), "decrypting with kms sm2");
        let payload_b64 = self.client.sm2_decrypt(&self.key_id, segments[0])?;
        let payload = decode_remote_b64(&payload_b64)?;
        into_utf8(verify_digest_payload(&payload)?)
    }
}

impl fmt::Debug for KmsSm2Crypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsSm2Crypto")
            .field("method", &self.codec.method())
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

fn decode_remote_b64(value: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(value)
        .map_err(|e| RemoteError::Response(format!("plaintext is not base64: {}", e)).into())
}

/// `hex(SM3(plaintext || DOMAIN_TAG))`.
fn integrity_digest(plaintext: &[u8]) -> String {
    let mut hasher = Sm3::new();
    hasher.update(plaintext);
    hasher.update(DOMAIN_TAG.as_bytes());
    hex::encode(hasher.finalize())
}

/// `hex(plaintext) "|" integrity_digest(plaintext)`.
pub(crate) fn digest_payload(plaintext: &[u8]) -> String {
    format!(
        "{}{}{}",
        hex::encode(plaintext),
        DIGEST_SEPARATOR,
        integrity_digest(plaintext)
    )
}

/// Split a digest payload and check the digest.
///
/// # Errors
///
/// Returns `CipherError::DecryptionFailed` if the payload is malformed and
/// `CipherError::Integrity` if the digest does not match.
pub(crate) fn verify_digest_payload(payload: &[u8]) -> Result<Vec<u8>> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| CipherError::DecryptionFailed("digest payload is not text".to_string()))?;
    let mut parts = text.split(DIGEST_SEPARATOR);
    let (Some(body), Some(digest), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CipherError::DecryptionFailed("invalid digest payload format".to_string()).into());
    };
    let plaintext = hex::decode(body)
        .map_err(|_| CipherError::DecryptionFailed("invalid digest payload format".to_string()))?;
    if integrity_digest(&plaintext) != digest {
        return Err(CipherError::Integrity.into());
    }
    Ok(plaintext)
}
