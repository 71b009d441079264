//! AES-256-GCM with a 16-byte nonce and a separate tag segment.
//!
//! Nonce and AAD are taken from the key (`key[..16]`, `key[..8]`), so every
//! value sealed under one key shares a nonce. Existing ciphertexts depend on
//! this layout.

use std::fmt;

use aes::Aes256;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, Payload};
use aes_gcm::AesGcm;
use tracing::trace;
use zeroize::Zeroizing;

use super::{into_utf8, key_prefix, Crypto};
use crate::core::envelope::{self, Codec};
use crate::core::types::CryptoOpts;
use crate::error::{CipherError, ConfigError, EnvelopeError, Result};

pub(super) const NONCE_SIZE: usize = 16;
pub(super) const AAD_SIZE: usize = 8;
pub(super) const TAG_SIZE: usize = 16;

type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// AES-256-GCM producing `wrap(hex(tag), hex(ct))`.
pub struct AesGcmCrypto {
    codec: Codec,
    cipher: Aes256Gcm16,
    nonce: Zeroizing<Vec<u8>>,
    aad: Zeroizing<Vec<u8>>,
}

impl AesGcmCrypto {
    /// Create a new instance.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` unless the key is exactly 32 bytes.
    pub fn new(method: &str, key: &[u8]) -> Result<Self> {
        if key.len() != 32 {
            return Err(ConfigError::Invalid(format!(
                "{}: aes key should be 32 bytes, got {}",
                method,
                key.len()
            ))
            .into());
        }
        let cipher = Aes256Gcm16::new_from_slice(key)
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", method, e)))?;
        Ok(Self {
            codec: Codec::new(method),
            cipher,
            nonce: Zeroizing::new(key_prefix(key, NONCE_SIZE)?.to_vec()),
            aad: Zeroizing::new(key_prefix(key, AAD_SIZE)?.to_vec()),
        })
    }

    pub fn from_opts(opts: &CryptoOpts) -> Result<Self> {
        Self::new(&opts.method, opts.aes_key.as_bytes())
    }
}

impl Crypto for AesGcmCrypto {
    fn method(&self) -> &str {
        self.codec.method()
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        if envelope::is_envelope(plaintext) {
            return Ok(plaintext.to_string());
        }
        trace!(plaintext_len = plaintext.len(), "encrypting with aes-gcm");
        let (tag, ciphertext) = seal(&self.cipher, &self.nonce, &self.aad, plaintext.as_bytes())?;
        Ok(self
            .codec
            .wrap(&[&hex::encode(tag), &hex::encode(ciphertext)]))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if !envelope::is_envelope(ciphertext) {
            return Ok(ciphertext.to_string());
        }
        let segments = self.codec.unwrap(ciphertext, 2)?;
        let tag = hex::decode(segments[0])
            .map_err(|e| EnvelopeError::Decode(format!("tag is not hex: {}", e)))?;
        let body = hex::decode(segments[1])
            .map_err(|e| EnvelopeError::Decode(format!("ciphertext is not hex: {}", e)))?;
        trace!(ciphertext_len = body.len(), "decrypting with aes-gcm");
        let plaintext = open(&self.cipher, &self.nonce, &self.aad, &tag, &body)?;
        into_utf8(plaintext)
    }
}

impl fmt::Debug for AesGcmCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesGcmCrypto")
            .field("method", &self.codec.method())
            .finish_non_exhaustive()
    }
}

/// Seal and split the AEAD output into `(tag, ciphertext)`.
pub(super) fn seal<A>(aead: &A, nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)>
where
    A: Aead + AeadCore<NonceSize = U16>,
{
    let mut sealed = aead
        .encrypt(
            GenericArray::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CipherError::EncryptionFailed("gcm seal failed".to_string()))?;
    let tag = sealed.split_off(sealed.len() - TAG_SIZE);
    Ok((tag, sealed))
}

/// Rejoin `ciphertext || tag` and open it.
///
/// # Errors
///
/// Returns `CipherError::Integrity` when the tag does not authenticate,
/// which includes a wrong key.
pub(super) fn open<A>(aead: &A, nonce: &[u8], aad: &[u8], tag: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>
where
    A: Aead + AeadCore<NonceSize = U16>,
{
    if tag.len() != TAG_SIZE {
        return Err(EnvelopeError::Decode(format!(
            "tag should be {} bytes, got {}",
            TAG_SIZE,
            tag.len()
        ))
        .into());
    }
    let mut joined = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
    joined.extend_from_slice(ciphertext);
    joined.extend_from_slice(tag);
    aead.decrypt(
        GenericArray::from_slice(nonce),
        Payload {
            msg: &joined,
            aad,
        },
    )
    .map_err(|_| CipherError::Integrity.into())
}
