//! SDK configuration file.
//!
//! Handles reading the JSON `sdk.json` file and turning its sections into
//! key material bundles. Only the `sdk` object is interpreted; other
//! top-level keys are ignored.
//!
//! ```json
//! {
//!   "sdk": {
//!     "passwd-secret":    { "aeskey": "..." },
//!     "storage-secret":   { "method": "aes-256-gcm", "aes_key": "..." },
//!     "transport-secret": { "method": "tsm-sm2", "public_key": "...", "private_key": "..." },
//!     "sign-secret":      { "method": "kms-sign", "key_id": "...", "kms_server": "..." },
//!     "hash-secret":      { "method": "hmac-sm3", "hmac_key": "..." }
//!   }
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::constants::{
    AES_256_CBC, CONFIG_ENV, DEFAULT_CONFIG_FILE, STORAGE_SECRET_ENV, TRANSPORT_SECRET_ENV,
};
use crate::core::types::{CryptoOpts, HashOpts, SignOpts};
use crate::error::{ConfigError, Result};

/// Key material for one Crypto or Signer section.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretConfig {
    #[zeroize(skip)]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub aes_key: String,
    /// Pre-registry AES key field, read only by `passwd-secret`.
    #[serde(default, rename = "aeskey", skip_serializing_if = "String::is_empty")]
    pub legacy_aes_key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sm4_key: String,
    #[zeroize(skip)]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_id: String,
    #[zeroize(skip)]
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kms_server: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret_key: String,
}

impl SecretConfig {
    /// Parse a single section from inline JSON, as found in the override
    /// environment variables.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e).into())
    }

    pub fn to_crypto_opts(&self) -> CryptoOpts {
        let mut opts = CryptoOpts::new(self.method.clone());
        opts.aes_key = self.aes_key.clone();
        opts.sm4_key = self.sm4_key.clone();
        opts.public_key = self.public_key.clone();
        opts.private_key = self.private_key.clone();
        opts.key_id = self.key_id.clone();
        opts.secret_id = self.secret_id.clone();
        opts.secret_key = self.secret_key.clone();
        opts.kms_server = self.kms_server.clone();
        opts
    }

    pub fn to_sign_opts(&self) -> SignOpts {
        let mut opts = SignOpts::new(self.method.clone());
        opts.public_key = self.public_key.clone();
        opts.private_key = self.private_key.clone();
        opts.key_id = self.key_id.clone();
        opts.secret_id = self.secret_id.clone();
        opts.secret_key = self.secret_key.clone();
        opts.kms_server = self.kms_server.clone();
        opts
    }
}

impl fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretConfig")
            .field("method", &self.method)
            .field("key_id", &self.key_id)
            .field("kms_server", &self.kms_server)
            .finish_non_exhaustive()
    }
}

/// Hash section.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct HashConfig {
    #[zeroize(skip)]
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hmac_key: String,
}

impl HashConfig {
    pub fn to_hash_opts(&self) -> HashOpts {
        let mut opts = HashOpts::new(self.method.clone());
        opts.hmac_key = self.hmac_key.clone();
        opts
    }
}

impl fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashConfig")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// The `sdk` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SdkSection {
    pub passwd_secret: SecretConfig,
    pub storage_secret: SecretConfig,
    pub transport_secret: SecretConfig,
    pub sign_secret: SecretConfig,
    pub hash_secret: HashConfig,
}

/// Parsed SDK configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SdkConfig {
    #[serde(default)]
    pub sdk: SdkSection,
}

/// Named Crypto sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Passwd,
    Storage,
    Transport,
}

impl Section {
    /// Key of this section inside the `sdk` object.
    pub fn key(self) -> &'static str {
        match self {
            Self::Passwd => "passwd-secret",
            Self::Storage => "storage-secret",
            Self::Transport => "transport-secret",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl SdkConfig {
    /// Path named by `CFGSEAL_CONFIG`, or `./sdk.json`.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::ReadFile` if it can't be read, or `ConfigError::Parse`
    /// if the JSON is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        debug!(
            passwd = %config.sdk.passwd_secret.method,
            storage = %config.sdk.storage_secret.method,
            transport = %config.sdk.transport_secret.method,
            "config parsed"
        );
        Ok(config)
    }

    /// Resolve configuration the way the binary does.
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// if present and an empty configuration otherwise. Environment
    /// overrides are applied last.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load(&path)?
                } else {
                    debug!(path = %path.display(), "no config file, starting empty");
                    Self::default()
                }
            }
        };
        config.with_env_overrides()
    }

    /// Apply `CFGSEAL_STORAGE_SECRET` and `CFGSEAL_TRANSPORT_SECRET`.
    pub fn with_env_overrides(self) -> Result<Self> {
        let storage = std::env::var(STORAGE_SECRET_ENV).ok();
        let transport = std::env::var(TRANSPORT_SECRET_ENV).ok();
        self.with_overrides(storage.as_deref(), transport.as_deref())
    }

    /// Replace the storage and transport sections with inline JSON.
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if an override is not a valid section.
    pub fn with_overrides(mut self, storage: Option<&str>, transport: Option<&str>) -> Result<Self> {
        if let Some(json) = storage.filter(|s| !s.trim().is_empty()) {
            debug!(var = STORAGE_SECRET_ENV, "overriding storage-secret");
            self.sdk.storage_secret = SecretConfig::from_json(json)?;
        }
        if let Some(json) = transport.filter(|s| !s.trim().is_empty()) {
            debug!(var = TRANSPORT_SECRET_ENV, "overriding transport-secret");
            self.sdk.transport_secret = SecretConfig::from_json(json)?;
        }
        Ok(self)
    }

    /// The password section, with the legacy default applied: an empty
    /// method means `aes-256-cbc` keyed by `aeskey`.
    pub fn passwd_secret(&self) -> SecretConfig {
        let mut section = self.sdk.passwd_secret.clone();
        if section.method.is_empty() {
            section.method = AES_256_CBC.to_string();
            section.aes_key = section.legacy_aes_key.clone();
        }
        section
    }

    /// A Crypto section by name. `Passwd` has its legacy default applied.
    pub fn section(&self, section: Section) -> SecretConfig {
        match section {
            Section::Passwd => self.passwd_secret(),
            Section::Storage => self.sdk.storage_secret.clone(),
            Section::Transport => self.sdk.transport_secret.clone(),
        }
    }
}
