//! RSA PKCS#1 v1.5 encryption (`rsa-1024`, `rsa-2048`).
//!
//! Keys arrive as base64 of their PEM text: PKIX `PUBLIC KEY` for the public
//! half and PKCS#1 `RSA PRIVATE KEY` (or PKCS#8 `PRIVATE KEY`) for the
//! private half.

use std::fmt;

use ::rsa::pkcs1::DecodeRsaPrivateKey;
use ::rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use ::rsa::traits::PublicKeyParts;
use ::rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::{into_utf8, Crypto};
use crate::core::envelope::{self, Codec};
use crate::core::types::{required, CryptoOpts};
use crate::error::{CipherError, ConfigError, EnvelopeError, Result};

/// RSA encryption with PKCS#1 v1.5 padding, `wrap(b64(ct))`.
pub struct RsaCrypto {
    codec: Codec,
    public_key: RsaPublicKey,
    private_key: RsaPrivateKey,
}

impl RsaCrypto {
    /// Create a new instance from PEM text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when either key fails to parse or the
    /// private key fails validation.
    pub fn new(method: &str, public_pem: &str, private_pem: &str) -> Result<Self> {
        let public_key = RsaPublicKey::from_public_key_pem(public_pem)
            .map_err(|e| ConfigError::Invalid(format!("{}: public key error: {}", method, e)))?;
        let private_key = RsaPrivateKey::from_pkcs1_pem(private_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(private_pem))
            .map_err(|e| ConfigError::Invalid(format!("{}: private key error: {}", method, e)))?;
        private_key
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("{}: invalid private key: {}", method, e)))?;

        debug!(method, modulus_bits = public_key.n().bits(), "loaded rsa key pair");
        Ok(Self {
            codec: Codec::new(method),
            public_key,
            private_key,
        })
    }

    /// Registry constructor. Both keys are base64 of PEM text.
    pub fn from_opts(opts: &CryptoOpts) -> Result<Self> {
        let public_pem = decode_pem(&opts.method, "public_key", &opts.public_key)?;
        let private_pem = decode_pem(&opts.method, "private_key", &opts.private_key)?;
        Self::new(&opts.method, &public_pem, &private_pem)
    }
}

fn decode_pem(method: &str, field: &'static str, value: &str) -> Result<Zeroizing<String>> {
    let encoded = required(method, field, value)?;
    let bytes = Zeroizing::new(
        BASE64
            .decode(encoded)
            .map_err(|e| ConfigError::Invalid(format!("{}: {} is not base64: {}", method, field, e)))?,
    );
    let text = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid(format!("{}: {} is not PEM text", method, field)))?;
    Ok(Zeroizing::new(text.to_string()))
}

impl Crypto for RsaCrypto {
    fn method(&self) -> &str {
        self.codec.method()
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        if envelope::is_envelope(plaintext) {
            return Ok(plaintext.to_string());
        }
        trace!(plaintext_len = plaintext.len(), "encrypting with rsa");
        let mut rng = rand::thread_rng();
        let ciphertext = self
            .public_key
            .encrypt(&mut rng, Pkcs1v15Encrypt, plaintext.as_bytes())
            .map_err(|e| CipherError::EncryptionFailed(format!("rsa: {}", e)))?;
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
        trace!(ciphertext_len = raw.len(), "decrypting with rsa");
        let plaintext = self
            .private_key
            .decrypt(Pkcs1v15Encrypt, &raw)
            .map_err(|e| CipherError::DecryptionFailed(format!("rsa: {}", e)))?;
        into_utf8(plaintext)
    }
}

impl fmt::Debug for RsaCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaCrypto")
            .field("method", &self.codec.method())
            .field("modulus_bits", &self.public_key.n().bits())
            .finish_non_exhaustive()
    }
}
