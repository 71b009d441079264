//! SM2 public-key encryption (`tsm-sm2`), C1C3C2 layout.
//!
//! The public key is base64 of a SEC1 point, the private key base64 of the
//! 32-byte scalar. The same decoding is shared with the `tsm-sign` signer.

use std::fmt;

use ::sm2::pke::{DecryptingKey, EncryptingKey, Mode};
use ::sm2::{PublicKey, SecretKey};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use getrandom::SysRng;
use tracing::trace;
use zeroize::Zeroizing;

use super::{into_utf8, Crypto};
use crate::core::envelope::{self, Codec};
use crate::core::types::{required, CryptoOpts};
use crate::error::{CipherError, ConfigError, EnvelopeError, Result};

/// SM2 encryption producing `wrap(b64(ct))`.
pub struct Sm2Crypto {
    codec: Codec,
    encrypting_key: EncryptingKey,
    decrypting_key: DecryptingKey,
}

impl Sm2Crypto {
    pub fn new(method: &str, public_key: PublicKey, secret_key: &SecretKey) -> Self {
        Self {
            codec: Codec::new(method),
            encrypting_key: EncryptingKey::new_with_mode(public_key, Mode::C1C3C2),
            decrypting_key: DecryptingKey::new_with_mode(secret_key.to_nonzero_scalar(), Mode::C1C3C2),
        }
    }

    /// Registry constructor.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a key is missing, not base64, or not a
    /// valid SM2 key.
    pub fn from_opts(opts: &CryptoOpts) -> Result<Self> {
        let public_key = decode_public_key(&opts.method, &opts.public_key)?;
        let secret_key = decode_secret_key(&opts.method, &opts.private_key)?;
        Ok(Self::new(&opts.method, public_key, &secret_key))
    }
}

/// Decode a base64 SEC1 public key.
pub(crate) fn decode_public_key(method: &str, value: &str) -> Result<PublicKey> {
    let encoded = required(method, "public_key", value)?;
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| ConfigError::Invalid(format!("{}: public_key is not base64: {}", method, e)))?;
    PublicKey::from_sec1_bytes(&bytes)
        .map_err(|_| ConfigError::Invalid(format!("{}: public key error", method)).into())
}

/// Decode a base64 32-byte private scalar.
pub(crate) fn decode_secret_key(method: &str, value: &str) -> Result<SecretKey> {
    let encoded = required(method, "private_key", value)?;
    let bytes = Zeroizing::new(
        BASE64
            .decode(encoded)
            .map_err(|e| ConfigError::Invalid(format!("{}: private_key is not base64: {}", method, e)))?,
    );
    if bytes.len() != 32 {
        return Err(ConfigError::Invalid(format!(
            "{}: private key should be 32 bytes, got {}",
            method,
            bytes.len()
        ))
        .into());
    }
    SecretKey::from_slice(&bytes)
        .map_err(|_| ConfigError::Invalid(format!("{}: private key error", method)).into())
}

impl Crypto for Sm2Crypto {
    fn method(&self) -> &str {
        self.codec.method()
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        if envelope::is_envelope(plaintext) {
            return Ok(plaintext.to_string());
        }
        trace!(plaintext_len = plaintext.len(), "encrypting with sm2");
        let ciphertext = self
            .encrypting_key
            .encrypt(&mut SysRng, plaintext.as_bytes())
            .map_err(|e| CipherError::EncryptionFailed(format!("sm2: {}", e)))?;
        Ok(self.codec.wrap(&[&BASE64.encode(ciphertext)]))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if !envelope::is_envelope(ciphertext) {
            return Ok(ciphertext.to_string());
        }
        let segments = self.codec.unwrap(ciphertext, 1)?;
        let raw = BASE64
            .decode(segments[0])
            .map_err(|e| EnvelopeError::Decode(format!("ciphertext is not base64: {}", e)))?;
        trace!(ciphertext_len = raw.len(), "decrypting with sm2");
        let plaintext = self
            .decrypting_key
            .decrypt(&raw)
            .map_err(|e| CipherError::DecryptionFailed(format!("sm2: {}", e)))?;
        into_utf8(plaintext)
    }
}

impl fmt::Debug for Sm2Crypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sm2Crypto")
            .field("method", &self.codec.method())
            .finish_non_exhaustive()
    }
}
