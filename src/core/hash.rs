//! Hash and HMAC capabilities.
//!
//! A [`Hasher`] is a factory: every call to [`Hasher::new_session`] returns
//! an independent [`Hash`] that is fed with `update` and consumed by
//! `digest`, so a finalized session cannot be reused.

use std::fmt;
use std::marker::PhantomData;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use sm3::Sm3;
use zeroize::Zeroizing;

use crate::core::types::{required, HashOpts};
use crate::error::{ConfigError, Result};

/// One hashing session.
pub trait Hash: Send {
    fn update(&mut self, data: &[u8]) -> Result<()>;

    /// Finish the session and return the raw digest bytes.
    fn digest(self: Box<Self>) -> Result<Vec<u8>>;
}

/// Hash capability, shared across threads.
pub trait Hasher: Send + Sync + fmt::Debug {
    fn method(&self) -> &str;

    /// Start a fresh session.
    fn new_session(&self) -> Box<dyn Hash>;

    /// Digest a single buffer.
    fn hash(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut session = self.new_session();
        session.update(data)?;
        session.digest()
    }
}

struct DigestSession<D>(D);

impl<D: Digest + Send> Hash for DigestSession<D> {
    fn update(&mut self, data: &[u8]) -> Result<()> {
        Digest::update(&mut self.0, data);
        Ok(())
    }

    fn digest(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(self.0.finalize().to_vec())
    }
}

struct MacSession<M>(M);

impl<M: Mac + Send> Hash for MacSession<M> {
    fn update(&mut self, data: &[u8]) -> Result<()> {
        Mac::update(&mut self.0, data);
        Ok(())
    }

    fn digest(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(self.0.finalize().into_bytes().to_vec())
    }
}

/// Plain digest hasher (`sha256`, `tsm-sm3`).
pub struct DigestHasher<D> {
    method: String,
    marker: PhantomData<fn() -> D>,
}

pub type Sha256Hasher = DigestHasher<Sha256>;
pub type Sm3Hasher = DigestHasher<Sm3>;

impl<D> DigestHasher<D> {
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
            marker: PhantomData,
        }
    }

    pub fn from_opts(opts: &HashOpts) -> Result<Self> {
        Ok(Self::new(&opts.method))
    }
}

impl<D: Digest + Send + 'static> Hasher for DigestHasher<D> {
    fn method(&self) -> &str {
        &self.method
    }

    fn new_session(&self) -> Box<dyn Hash> {
        Box::new(DigestSession(D::new()))
    }
}

impl<D> fmt::Debug for DigestHasher<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestHasher")
            .field("method", &self.method)
            .finish()
    }
}

/// Keyed hasher (`hmac-sha256`, `hmac-sm3`).
///
/// The keyed state is computed once and cloned for every session.
pub struct HmacHasher<M> {
    method: String,
    mac: M,
}

pub type HmacSha256Hasher = HmacHasher<Hmac<Sha256>>;
pub type HmacSm3Hasher = HmacHasher<Hmac<Sm3>>;

impl<M: Mac + KeyInit> HmacHasher<M> {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the MAC rejects the key.
    pub fn new(method: &str, key: &[u8]) -> Result<Self> {
        let mac = <M as KeyInit>::new_from_slice(key)
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", method, e)))?;
        Ok(Self {
            method: method.to_string(),
            mac,
        })
    }

    /// Registry constructor. `hmac_key` must be set.
    pub fn from_opts(opts: &HashOpts) -> Result<Self> {
        let key = Zeroizing::new(required(&opts.method, "hmac_key", &opts.hmac_key)?.as_bytes().to_vec());
        Self::new(&opts.method, &key)
    }
}

impl<M> Hasher for HmacHasher<M>
where
    M: Mac + Clone + Send + Sync + 'static,
{
    fn method(&self) -> &str {
        &self.method
    }

    fn new_session(&self) -> Box<dyn Hash> {
        Box::new(MacSession(self.mac.clone()))
    }
}

impl<M> fmt::Debug for HmacHasher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacHasher")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}
