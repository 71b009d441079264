//! Salted AES-CBC, the scheme behind the legacy password secret.
//!
//! Encrypt: salt record, PKCS#7 pad, AES-CBC, hex, envelope.
//! The IV is the first 16 key bytes. That keeps every stored ciphertext
//! readable but means the IV is fixed per key; the random salt is what
//! keeps equal plaintexts apart.
//!
//! Decrypt also accepts the legacy `AES+V<n>+<hex>` format.

use std::fmt;

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use tracing::trace;
use zeroize::Zeroizing;

use super::{into_utf8, Crypto};
use crate::core::envelope::{self, Codec, LegacyEnvelope};
use crate::core::padding;
use crate::core::types::CryptoOpts;
use crate::error::{CipherError, ConfigError, EnvelopeError, Result};

const BLOCK_SIZE: usize = 16;

/// Salted AES-CBC with a key-derived IV.
pub struct AesCbcCrypto {
    codec: Codec,
    key: Zeroizing<Vec<u8>>,
}

impl AesCbcCrypto {
    /// Create a new instance.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` unless the key is 16, 24 or 32 bytes.
    pub fn new(method: &str, key: &[u8]) -> Result<Self> {
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(ConfigError::Invalid(format!(
                "{}: aes key should be of 16/24/32 bytes, got {}",
                method,
                key.len()
            ))
            .into());
        }
        Ok(Self {
            codec: Codec::new(method),
            key: Zeroizing::new(key.to_vec()),
        })
    }

    /// Registry constructor.
    pub fn from_opts(opts: &CryptoOpts) -> Result<Self> {
        Self::new(&opts.method, opts.aes_key.as_bytes())
    }

    /// Encrypt with a caller-chosen salt instead of a random one.
    ///
    /// Output is deterministic for a given key, salt and plaintext. Meant
    /// for fixtures and test vectors.
    pub fn encrypt_with_salt(&self, plaintext: &str, salt: &[u8]) -> Result<String> {
        if envelope::is_envelope(plaintext) {
            return Ok(plaintext.to_string());
        }
        let salted = Zeroizing::new(padding::attach_salt_with(salt, plaintext.as_bytes())?);
        self.seal(&salted)
    }

    fn seal(&self, salted: &[u8]) -> Result<String> {
        let padded = Zeroizing::new(padding::pad(salted, BLOCK_SIZE));
        let ciphertext = self.cbc_encrypt(&padded)?;
        trace!(ciphertext_len = ciphertext.len(), "encrypted with aes-cbc");
        Ok(self.codec.wrap(&[&hex::encode(ciphertext)]))
    }

    fn open(&self, payload: &str) -> Result<String> {
        let ciphertext = hex::decode(payload)
            .map_err(|e| EnvelopeError::Decode(format!("ciphertext is not hex: {}", e)))?;
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CipherError::DecryptionFailed(format!(
                "ciphertext length {} is not a positive multiple of {}",
                ciphertext.len(),
                BLOCK_SIZE
            ))
            .into());
        }

        let padded = Zeroizing::new(self.cbc_decrypt(&ciphertext)?);
        let salted = padding::unpad(&padded, BLOCK_SIZE)?;
        let plaintext = padding::detach_salt(salted)?;
        into_utf8(plaintext.to_vec())
    }

    fn cbc_encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key = self.key.as_slice();
        let iv = &key[..BLOCK_SIZE];
        let out = match key.len() {
            16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
                .map(|c| c.encrypt_padded_vec_mut::<NoPadding>(data)),
            24 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)
                .map(|c| c.encrypt_padded_vec_mut::<NoPadding>(data)),
            _ => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
                .map(|c| c.encrypt_padded_vec_mut::<NoPadding>(data)),
        };
        out.map_err(|e| CipherError::EncryptionFailed(format!("aes-cbc: {}", e)).into())
    }

    fn cbc_decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key = self.key.as_slice();
        let iv = &key[..BLOCK_SIZE];
        let out = match key.len() {
            16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
                .map(|c| c.decrypt_padded_vec_mut::<NoPadding>(data)),
            24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
                .map(|c| c.decrypt_padded_vec_mut::<NoPadding>(data)),
            _ => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
                .map(|c| c.decrypt_padded_vec_mut::<NoPadding>(data)),
        };
        match out {
            Ok(Ok(plain)) => Ok(plain),
            Ok(Err(_)) => Err(CipherError::Padding.into()),
            Err(e) => Err(CipherError::DecryptionFailed(format!("aes-cbc: {}", e)).into()),
        }
    }
}

impl Crypto for AesCbcCrypto {
    fn method(&self) -> &str {
        self.codec.method()
    }

    fn encrypt(&self, plaintext: &str) -> Result<String> {
        if envelope::is_envelope(plaintext) {
            return Ok(plaintext.to_string());
        }
        trace!(plaintext_len = plaintext.len(), "encrypting with aes-cbc");
        let salted = Zeroizing::new(padding::attach_salt(plaintext.as_bytes()));
        self.seal(&salted)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if envelope::is_envelope(ciphertext) {
            let segments = self.codec.unwrap(ciphertext, 1)?;
            return self.open(segments[0]);
        }
        if let Some(legacy) = legacy_envelope(ciphertext) {
            trace!(version = legacy.version, "decrypting legacy aes envelope");
            return self.open(legacy.payload);
        }
        Ok(ciphertext.to_string())
    }
}

/// A legacy envelope whose payload is whole hex-encoded blocks. Any other
/// value starting with `AES+` is plaintext.
fn legacy_envelope(value: &str) -> Option<LegacyEnvelope<'_>> {
    if !envelope::is_legacy(value) {
        return None;
    }
    let legacy = LegacyEnvelope::parse(value).ok()?;
    let payload = legacy.payload;
    let whole_blocks = !payload.is_empty()
        && payload.len() % (2 * BLOCK_SIZE) == 0
        && payload.bytes().all(|b| b.is_ascii_hexdigit());
    whole_blocks.then_some(legacy)
}

impl fmt::Debug for AesCbcCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCbcCrypto")
            .field("method", &self.codec.method())
            .field("key_len", &self.key.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{AES_256_CBC as METHOD, ENVELOPE_PREFIX};
    use crate::error::Error;

    const KEY: &[u8; 32] = b"5c2bd12683ceefb8830abba988339e67";
    const OTHER_KEY: &[u8; 32] = b"0123456789abcdef0123456789abcdef";

    fn crypto(key: &[u8]) -> AesCbcCrypto {
        AesCbcCrypto::new(METHOD, key).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let c = crypto(KEY);
        let encrypted = c.encrypt("db-password").unwrap();
        assert!(encrypted.starts_with(ENVELOPE_PREFIX));
        assert_eq!(c.decrypt(&encrypted).unwrap(), "db-password");
    }

    #[test]
    fn test_all_key_sizes() {
        for key in [&KEY[..16], &KEY[..24], &KEY[..]] {
            let c = crypto(key);
            let encrypted = c.encrypt("value").unwrap();
            assert_eq!(c.decrypt(&encrypted).unwrap(), "value");
        }
    }

    #[test]
    fn test_invalid_key_length() {
        let err = AesCbcCrypto::new(METHOD, b"short").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_random_salt_makes_ciphertexts_differ() {
        let c = crypto(KEY);
        let outputs: std::collections::HashSet<String> =
            (0..16).map(|_| c.encrypt("same").unwrap()).collect();
        assert!(outputs.len() > 1);
    }

    #[test]
    fn test_fixed_salt_vector() {
        let c = crypto(KEY);
        let encrypted = c.encrypt_with_salt("hunter2", b"abc").unwrap();
        assert_eq!(encrypted, c.encrypt_with_salt("hunter2", b"abc").unwrap());

        let parts: Vec<&str> = encrypted.split(':').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], ENVELOPE_PREFIX);
        assert_eq!(parts[1], hex::encode(METHOD));
        // 1 + 3 + 7 = 11 bytes pad to a single block
        assert_eq!(parts[3].len(), 32);

        assert_eq!(c.decrypt(&encrypted).unwrap(), "hunter2");
        assert!(crypto(OTHER_KEY).decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_plaintext_passthrough() {
        let c = crypto(KEY);
        assert_eq!(c.decrypt("plain-password").unwrap(), "plain-password");
        assert_eq!(c.decrypt("").unwrap(), "");
    }

    #[test]
    fn test_encrypt_is_idempotent() {
        let c = crypto(KEY);
        let once = c.encrypt("x").unwrap();
        assert_eq!(c.encrypt(&once).unwrap(), once);
    }

    #[test]
    fn test_legacy_envelope() {
        let c = crypto(KEY);
        let modern = c.encrypt_with_salt("legacy-secret", b"q1").unwrap();
        let payload = modern.rsplit(':').next().unwrap();
        let legacy = LegacyEnvelope {
            version: 1,
            payload,
        }
        .render();
        assert!(legacy.starts_with("AES+V1+"));
        assert_eq!(c.decrypt(&legacy).unwrap(), "legacy-secret");
    }

    #[test]
    fn test_malformed_legacy_passes_through() {
        let c = crypto(KEY);
        for plain in ["AES+mypassword", "AES+V1+not-hex", "AES+Vx+00", "AES+V1+0a0b0c", "AES+V1+"] {
            assert_eq!(c.decrypt(plain).unwrap(), plain);
        }
    }

    #[test]
    fn test_rejects_unaligned_ciphertext() {
        let c = crypto(KEY);
        let bad = c.codec.wrap(&["00ff"]);
        let err = c.decrypt(&bad).unwrap_err();
        assert!(matches!(err, Error::Cipher(CipherError::DecryptionFailed(_))));
    }

    #[test]
    fn test_wrong_key_never_panics() {
        let c = crypto(KEY);
        let other = crypto(OTHER_KEY);
        for len in 0..64 {
            let plaintext = "p".repeat(len);
            let encrypted = c.encrypt(&plaintext).unwrap();
            if let Ok(decrypted) = other.decrypt(&encrypted) {
                assert_ne!(decrypted, plaintext);
            }
        }
    }
}
