//! Key material bundles handed to algorithm constructors.
//!
//! A bundle is owned by the capability built from it. Secret fields are
//! zeroized on drop and redacted from `Debug` output.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ConfigError, Result};

/// Configuration for Crypto (Encrypt/Decrypt) methods.
///
/// Only the fields the selected method needs must be set.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct CryptoOpts {
    /// Registry key, e.g. `aes-256-gcm`.
    #[zeroize(skip)]
    pub method: String,
    /// AES key bytes (`aes-256-cbc`, `aes-256-gcm`).
    pub aes_key: String,
    /// SM4 key bytes (`tsm-sm4-128-gcm`).
    pub sm4_key: String,
    /// Base64-encoded public key (`rsa-*`, `tsm-sm2`).
    pub public_key: String,
    /// Base64-encoded private key (`rsa-*`, `tsm-sm2`).
    pub private_key: String,
    /// Remote key identifier (`kms-*`).
    #[zeroize(skip)]
    pub key_id: String,
    /// Remote API credential id (`kms-*`).
    pub secret_id: String,
    /// Remote API credential secret (`kms-*`).
    pub secret_key: String,
    /// Remote endpoint (`kms-*`).
    #[zeroize(skip)]
    pub kms_server: String,
}

impl CryptoOpts {
    pub fn new(method: impl Into<String>) -> Self {
        let mut opts = Self::default();
        opts.method = method.into();
        opts
    }
}

impl fmt::Debug for CryptoOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoOpts")
            .field("method", &self.method)
            .field("aes_key", &redact(&self.aes_key))
            .field("sm4_key", &redact(&self.sm4_key))
            .field("public_key", &redact(&self.public_key))
            .field("private_key", &redact(&self.private_key))
            .field("key_id", &self.key_id)
            .field("secret_id", &redact(&self.secret_id))
            .field("secret_key", &redact(&self.secret_key))
            .field("kms_server", &self.kms_server)
            .finish()
    }
}

/// Configuration for Signer (Sign/Verify) methods.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SignOpts {
    #[zeroize(skip)]
    pub method: String,
    /// Base64-encoded public key (`tsm-sign`).
    pub public_key: String,
    /// Base64-encoded private key (`tsm-sign`).
    pub private_key: String,
    #[zeroize(skip)]
    pub key_id: String,
    pub secret_id: String,
    pub secret_key: String,
    #[zeroize(skip)]
    pub kms_server: String,
}

impl SignOpts {
    pub fn new(method: impl Into<String>) -> Self {
        let mut opts = Self::default();
        opts.method = method.into();
        opts
    }
}

impl fmt::Debug for SignOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignOpts")
            .field("method", &self.method)
            .field("public_key", &redact(&self.public_key))
            .field("private_key", &redact(&self.private_key))
            .field("key_id", &self.key_id)
            .field("secret_id", &redact(&self.secret_id))
            .field("secret_key", &redact(&self.secret_key))
            .field("kms_server", &self.kms_server)
            .finish()
    }
}

/// Configuration for Hash methods.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct HashOpts {
    #[zeroize(skip)]
    pub method: String,
    /// Key for the `hmac-*` methods.
    pub hmac_key: String,
}

impl HashOpts {
    pub fn new(method: impl Into<String>) -> Self {
        let mut opts = Self::default();
        opts.method = method.into();
        opts
    }
}

impl fmt::Debug for HashOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashOpts")
            .field("method", &self.method)
            .field("hmac_key", &redact(&self.hmac_key))
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Return `value` or a `MissingField` error naming the method and field.
pub(crate) fn required<'a>(method: &str, field: &'static str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(ConfigError::MissingField {
            method: method.to_string(),
            field,
        }
        .into());
    }
    Ok(value)
}
