//! SM4-GCM (`tsm-sm4-128-gcm`).
//!
//! Same construction as [`super::AesGcmCrypto`] with the SM4 block cipher and
//! base64 segments.

use std::fmt;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::KeyInit;
use aes_gcm::AesGcm;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sm4::Sm4;
use tracing::trace;
use zeroize::Zeroizing;

use super::aes_gcm::{open, seal, AAD_SIZE, NONCE_SIZE};
use super::{into_utf8, key_prefix, Crypto};
use crate::core::envelope::{self, Codec};
use crate::core::types::CryptoOpts;
use crate::error::{ConfigError, EnvelopeError, Result};

type Sm4Gcm16 = AesGcm<Sm4, U16>;

/// SM4-GCM producing `wrap(b64(tag), b64(ct))`.
pub struct Sm4GcmCrypto {
    codec: Codec,
    cipher: Sm4Gcm16,
    nonce: Zeroizing<Vec<u8>>,
    aad: Zeroizing<Vec<u8>>,
}

impl Sm4GcmCrypto {
    /// Create a new instance.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` unless the key is exactly 16 bytes.
    pub fn new(method: &str, key: &[u8]) -> Result<Self> {
        if key.len() != 16 {
            return Err(ConfigError::Invalid(format!(
                "{}: sm4 key should be 16 bytes, got {}",
                method,
                key.len()
            ))
            .into());
        }
        let cipher = Sm4Gcm16::new_from_slice(key)
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", method, e)))?;
        Ok(Self {
            codec: Codec::new(method),
            cipher,
            nonce: Zeroizing::new(key_prefix(key, NONCE_SIZE)?.to_vec()),
            aad: Zeroizing::new(key_prefix(key, AAD_SIZE)?.to_vec()),
        })
    }

    pub fn from_opts(opts: &CryptoOpts) -> Result<Self> {
        Self::new(&opts.method, opts.sm4_key.as_bytes())
    }
}

impl Crypto for Sm4GcmCrypto {
    fn method(&self) -> &str {
        self.codec.method()
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        if envelope::is_envelope(plaintext) {
            return Ok(plaintext.to_string());
        }
        trace!(plaintext_len = plaintext.len(), "encrypting with sm4-gcm");
        let (tag, ciphertext) = seal(&self.cipher, &self.nonce, &self.aad, plaintext.as_bytes())?;
        Ok(self
            .codec
            .wrap(&[&BASE64.encode(tag), &BASE64.encode(ciphertext)]))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if !envelope::is_envelope(ciphertext) {
            return Ok(ciphertext.to_string());
        }
        let segments = self.codec.unwrap(ciphertext, 2)?;
        let tag = BASE64
            .decode(segments[0])
            .map_err(|e| EnvelopeError::Decode(format!("tag is not base64: {}", e)))?;
        let body = BASE64
            .decode(segments[1])
            .map_err(|e| EnvelopeError::Decode(format!("ciphertext is not base64: {}", e)))?;
        trace!(ciphertext_len = body.len(), "decrypting with sm4-gcm");
        into_utf8(open(&self.cipher, &self.nonce, &self.aad, &tag, &body)?)
    }
}

impl fmt::Debug for Sm4GcmCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sm4GcmCrypto")
            .field("method", &self.codec.method())
            .finish_non_exhaustive()
    }
}
