//! Algorithm registry.
//!
//! Three independent tables map a method name to a constructor: one for
//! Crypto, one for Signer and one for Hasher. A registry is an ordinary value
//! built at startup and passed to whoever needs it.
//!
//! ```no_run
//! use cfgseal::{CryptoOpts, Registry};
//!
//! let registry = Registry::with_defaults();
//! let mut opts = CryptoOpts::new("aes-256-gcm");
//! opts.aes_key = "0123456789abcdef0123456789abcdef".to_string();
//! let crypto = registry.crypto(&opts)?;
//! let sealed = crypto.encrypt("db-password")?;
//! # Ok::<(), cfgseal::Error>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::cipher::{AesCbcCrypto, AesGcmCrypto, Crypto, RsaCrypto, Sm2Crypto, Sm4GcmCrypto};
use crate::core::constants::*;
use crate::core::hash::{Hasher, HmacSha256Hasher, HmacSm3Hasher, Sha256Hasher, Sm3Hasher};
use crate::core::kms::{self, KmsClient, KmsCredentials, KmsSigner, KmsSm2Crypto, KmsSm4Crypto};
use crate::core::sign::{Signer, Sm2Signer};
use crate::core::types::{CryptoOpts, HashOpts, SignOpts};
use crate::error::{RegistryError, Result};

/// Constructor for a Crypto method.
pub type CryptoCtor = Box<dyn Fn(&CryptoOpts) -> Result<Box<dyn Crypto>> + Send + Sync>;

/// Constructor for a Signer method.
pub type SignerCtor = Box<dyn Fn(&SignOpts) -> Result<Box<dyn Signer>> + Send + Sync>;

/// Constructor for a Hasher method.
pub type HasherCtor = Box<dyn Fn(&HashOpts) -> Result<Box<dyn Hasher>> + Send + Sync>;

/// Method name to constructor tables.
#[derive(Default)]
pub struct Registry {
    crypto: HashMap<String, CryptoCtor>,
    signers: HashMap<String, SignerCtor>,
    hashers: HashMap<String, HasherCtor>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in method.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register_crypto(AES_256_CBC, |o| Ok(Box::new(AesCbcCrypto::from_opts(o)?)));
        registry.register_crypto(AES_256_GCM, |o| Ok(Box::new(AesGcmCrypto::from_opts(o)?)));
        registry.register_crypto(TSM_SM4_128_GCM, |o| Ok(Box::new(Sm4GcmCrypto::from_opts(o)?)));
        registry.register_crypto(RSA_1024, |o| Ok(Box::new(RsaCrypto::from_opts(o)?)));
        registry.register_crypto(RSA_2048, |o| Ok(Box::new(RsaCrypto::from_opts(o)?)));
        registry.register_crypto(TSM_SM2, |o| Ok(Box::new(Sm2Crypto::from_opts(o)?)));
        registry.register_crypto(KMS_SM2, |o| {
            let client = remote_client(&o.method, &o.kms_server, &o.secret_id, &o.secret_key)?;
            Ok(Box::new(KmsSm2Crypto::new(&o.method, &o.key_id, client)?))
        });
        registry.register_crypto(KMS_SM4_128_GCM, |o| {
            let client = remote_client(&o.method, &o.kms_server, &o.secret_id, &o.secret_key)?;
            Ok(Box::new(KmsSm4Crypto::new(&o.method, &o.key_id, client)?))
        });

        registry.register_signer(TSM_SIGN, |o| Ok(Box::new(Sm2Signer::from_opts(o)?)));
        registry.register_signer(KMS_SIGN, |o| {
            let client = remote_client(&o.method, &o.kms_server, &o.secret_id, &o.secret_key)?;
            Ok(Box::new(KmsSigner::new(&o.method, &o.key_id, client)?))
        });

        registry.register_hasher(SHA256, |o| Ok(Box::new(Sha256Hasher::from_opts(o)?)));
        registry.register_hasher(TSM_SM3, |o| Ok(Box::new(Sm3Hasher::from_opts(o)?)));
        registry.register_hasher(HMAC_SHA256, |o| Ok(Box::new(HmacSha256Hasher::from_opts(o)?)));
        registry.register_hasher(HMAC_SM3, |o| Ok(Box::new(HmacSm3Hasher::from_opts(o)?)));

        registry
    }

    /// Register a Crypto constructor. Replaces any existing entry.
    pub fn register_crypto<F>(&mut self, method: &str, ctor: F)
    where
        F: Fn(&CryptoOpts) -> Result<Box<dyn Crypto>> + Send + Sync + 'static,
    {
        if self.crypto.insert(method.to_string(), Box::new(ctor)).is_some() {
            warn!(method, "replaced crypto registration");
        }
    }

    /// Register a Signer constructor. Replaces any existing entry.
    pub fn register_signer<F>(&mut self, method: &str, ctor: F)
    where
        F: Fn(&SignOpts) -> Result<Box<dyn Signer>> + Send + Sync + 'static,
    {
        if self.signers.insert(method.to_string(), Box::new(ctor)).is_some() {
            warn!(method, "replaced signer registration");
        }
    }

    /// Register a Hasher constructor. Replaces any existing entry.
    pub fn register_hasher<F>(&mut self, method: &str, ctor: F)
    where
        F: Fn(&HashOpts) -> Result<Box<dyn Hasher>> + Send + Sync + 'static,
    {
        if self.hashers.insert(method.to_string(), Box::new(ctor)).is_some() {
            warn!(method, "replaced hasher registration");
        }
    }

    /// Build the Crypto named by `opts.method`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnsupportedAlgorithm` for an unknown method,
    /// or whatever the constructor reports for bad key material.
    pub fn crypto(&self, opts: &CryptoOpts) -> Result<Box<dyn Crypto>> {
        let ctor = lookup(&self.crypto, &opts.method)?;
        debug!(method = %opts.method, "building crypto");
        ctor(opts)
    }

    /// Build the Signer named by `opts.method`.
    pub fn signer(&self, opts: &SignOpts) -> Result<Box<dyn Signer>> {
        let ctor = lookup(&self.signers, &opts.method)?;
        debug!(method = %opts.method, "building signer");
        ctor(opts)
    }

    /// Build the Hasher named by `opts.method`.
    pub fn hasher(&self, opts: &HashOpts) -> Result<Box<dyn Hasher>> {
        let ctor = lookup(&self.hashers, &opts.method)?;
        debug!(method = %opts.method, "building hasher");
        ctor(opts)
    }

    /// Registered Crypto methods, sorted.
    pub fn crypto_methods(&self) -> Vec<&str> {
        sorted_keys(&self.crypto)
    }

    /// Registered Signer methods, sorted.
    pub fn signer_methods(&self) -> Vec<&str> {
        sorted_keys(&self.signers)
    }

    /// Registered Hasher methods, sorted.
    pub fn hasher_methods(&self) -> Vec<&str> {
        sorted_keys(&self.hashers)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("crypto", &self.crypto_methods())
            .field("signers", &self.signer_methods())
            .field("hashers", &self.hasher_methods())
            .finish()
    }
}

fn lookup<'a, T>(table: &'a HashMap<String, T>, method: &str) -> Result<&'a T> {
    table
        .get(method)
        .ok_or_else(|| RegistryError::UnsupportedAlgorithm(method.to_string()).into())
}

fn sorted_keys<T>(table: &HashMap<String, T>) -> Vec<&str> {
    let mut keys: Vec<&str> = table.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys
}

fn remote_client(
    method: &str,
    kms_server: &str,
    secret_id: &str,
    secret_key: &str,
) -> Result<Arc<dyn KmsClient>> {
    let credentials = KmsCredentials::new(method, kms_server, secret_id, secret_key)?;
    kms::connect(method, credentials)
}
