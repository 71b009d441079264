//! Error types.
//!
//! Every failure is surfaced to the immediate caller as a typed error.
//! Messages never carry key material or plaintext.

use thiserror::Error;

/// Top-level error for all cfgseal operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Algorithm lookup failures.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("not support algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Configuration and key material failures. Fatal at construction time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("{method}: missing required field `{field}`")]
    MissingField {
        method: String,
        field: &'static str,
    },

    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("failed to read config: {0}")]
    ReadFile(std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Wire-format failures detected while unwrapping an envelope.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("invalid envelope format: {0}")]
    Format(String),

    #[error("envelope method mismatch: expected {expected}, found {found}")]
    MethodMismatch { expected: String, found: String },

    #[error("invalid envelope segment: {0}")]
    Decode(String),
}

/// Local cryptographic failures.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("unpadding error: key and ciphertext may not match")]
    Padding,

    #[error("truncated input: declared {declared} bytes, {available} available")]
    TruncatedInput { declared: usize, available: usize },

    #[error("integrity check failed")]
    Integrity,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("decrypted value is not valid UTF-8")]
    Utf8,
}

/// Failures reported by, or while talking to, the remote KMS.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("kms error {code}: {message}")]
    Service { code: String, message: String },

    #[error("kms transport error: {0}")]
    Transport(String),

    #[error("unexpected kms response: {0}")]
    Response(String),
}

pub type Result<T> = std::result::Result<T, Error>;
