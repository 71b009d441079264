//! Capability facade.
//!
//! Builds the configured Crypto, Signer and Hasher on first use and hands out
//! shared handles afterwards. Construction errors are returned to the caller
//! and not cached, so a later call retries.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::core::cipher::Crypto;
use crate::core::config::{SdkConfig, Section};
use crate::core::hash::Hasher;
use crate::core::registry::Registry;
use crate::core::sign::Signer;
use crate::error::Result;

/// Lazily resolved capabilities for one SDK configuration.
pub struct Secrets {
    config: SdkConfig,
    registry: Registry,
    passwd: OnceLock<Arc<dyn Crypto>>,
    storage: OnceLock<Arc<dyn Crypto>>,
    transport: OnceLock<Arc<dyn Crypto>>,
    signer: OnceLock<Arc<dyn Signer>>,
    hasher: OnceLock<Arc<dyn Hasher>>,
}

impl Secrets {
    pub fn new(config: SdkConfig, registry: Registry) -> Self {
        Self {
            config,
            registry,
            passwd: OnceLock::new(),
            storage: OnceLock::new(),
            transport: OnceLock::new(),
            signer: OnceLock::new(),
            hasher: OnceLock::new(),
        }
    }

    /// Discover the configuration (see [`SdkConfig::discover`]) and use the
    /// built-in registry.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        Ok(Self::new(SdkConfig::discover(path)?, Registry::with_defaults()))
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Crypto for database and service passwords.
    pub fn passwd_secret(&self) -> Result<Arc<dyn Crypto>> {
        self.crypto(Section::Passwd)
    }

    /// Crypto for values at rest.
    pub fn storage_secret(&self) -> Result<Arc<dyn Crypto>> {
        self.crypto(Section::Storage)
    }

    /// Crypto for values in transit.
    pub fn transport_secret(&self) -> Result<Arc<dyn Crypto>> {
        self.crypto(Section::Transport)
    }

    /// Crypto for a named section.
    pub fn crypto(&self, section: Section) -> Result<Arc<dyn Crypto>> {
        let cell = match section {
            Section::Passwd => &self.passwd,
            Section::Storage => &self.storage,
            Section::Transport => &self.transport,
        };
        cached(cell, || {
            debug!(%section, "resolving crypto");
            self.registry.crypto(&self.config.section(section).to_crypto_opts())
        })
    }

    /// Signer from `sign-secret`.
    pub fn signer(&self) -> Result<Arc<dyn Signer>> {
        cached(&self.signer, || {
            debug!("resolving signer");
            self.registry
                .signer(&self.config.sdk.sign_secret.to_sign_opts())
        })
    }

    /// Hasher from `hash-secret`.
    pub fn hasher(&self) -> Result<Arc<dyn Hasher>> {
        cached(&self.hasher, || {
            debug!("resolving hasher");
            self.registry
                .hasher(&self.config.sdk.hash_secret.to_hash_opts())
        })
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Return the cached value or build one. Concurrent first calls may both
/// build; the first stored value wins.
fn cached<T: ?Sized>(
    cell: &OnceLock<Arc<T>>,
    build: impl FnOnce() -> Result<Box<T>>,
) -> Result<Arc<T>> {
    if let Some(value) = cell.get() {
        return Ok(Arc::clone(value));
    }
    let built: Arc<T> = Arc::from(build()?);
    Ok(Arc::clone(cell.get_or_init(|| built)))
}
