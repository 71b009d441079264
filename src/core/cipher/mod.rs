//! Encrypt/Decrypt capabilities.
//!
//! Every implementation shares two rules:
//!
//! - `encrypt` returns a value that is already an envelope unchanged
//! - `decrypt` returns a value that is not an envelope unchanged, so plain
//!   and protected config values can be mixed in one file
//!
//! ## Backends
//!
//! - **aes-256-cbc**: salted AES-CBC, also reads the legacy `AES+V1+` format
//! - **aes-256-gcm**: AES-GCM, separate tag segment
//! - **tsm-sm4-128-gcm**: SM4-GCM, separate tag segment
//! - **rsa-1024 / rsa-2048**: RSA PKCS#1 v1.5
//! - **tsm-sm2**: SM2 public-key encryption
//! - **kms-sm2 / kms-sm4-128-gcm**: remote KMS, see [`crate::core::kms`]
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Crypto` trait in a new file
//! 2. Register a constructor in [`crate::core::registry::Registry::with_defaults`]

use std::fmt;

use crate::error::{CipherError, Result};

mod aes_cbc;
mod aes_gcm;
mod rsa;
pub(crate) mod sm2;
mod sm4_gcm;

pub use self::aes_cbc::AesCbcCrypto;
pub use self::aes_gcm::AesGcmCrypto;
pub use self::rsa::RsaCrypto;
pub use self::sm2::Sm2Crypto;
pub use self::sm4_gcm::Sm4GcmCrypto;

/// Encrypt/Decrypt capability.
///
/// Instances are immutable after construction and may be shared across
/// threads.
pub trait Crypto: Send + Sync + fmt::Debug {
    /// Registry method this instance was built for.
    fn method(&self) -> &str;

    /// Protect a plaintext value.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::EncryptionFailed` or `RemoteError` on failure.
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Recover the plaintext of an envelope, or pass plaintext through.
    ///
    /// # Errors
    ///
    /// Returns `EnvelopeError` for malformed envelopes and `CipherError`
    /// when the payload cannot be decrypted. Never fails for non-envelope
    /// input.
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// Convert decrypted bytes to a `String`.
pub(crate) fn into_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| CipherError::Utf8.into())
}

/// Slice the first `len` bytes of a key used as IV/nonce/AAD.
pub(crate) fn key_prefix(key: &[u8], len: usize) -> Result<&[u8]> {
    key.get(..len).ok_or_else(|| {
        crate::error::ConfigError::Invalid(format!("key must be at least {} bytes", len)).into()
    })
}
