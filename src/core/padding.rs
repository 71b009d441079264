//! Block padding and salt records.
//!
//! Salting makes repeated encryption of the same short secret produce
//! different ciphertexts under CBC. It sits underneath encryption and is
//! not an authentication mechanism.
//!
//! Salted layout: `[n: u8][n salt bytes][plaintext]`.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::{CipherError, ConfigError, Result};

/// Maximum random salt length drawn by `attach_salt`.
pub const MAX_RANDOM_SALT: usize = 8;

/// Append PKCS#7 padding so the length is a multiple of `block_size`.
///
/// The pad value equals the number of bytes added, in `[1, block_size]`.
pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    debug_assert!((1..=255).contains(&block_size));
    let padding = block_size - data.len() % block_size;
    let mut out = Vec::with_capacity(data.len() + padding);
    out.extend_from_slice(data);
    out.resize(data.len() + padding, padding as u8);
    out
}

/// Strip PKCS#7 padding.
///
/// Only the declared length is checked, matching what every existing
/// ciphertext was written with.
///
/// # Errors
///
/// Returns `CipherError::Padding` when the input is empty, not block
/// aligned, or the last byte is outside `[1, block_size]`. A mismatched key
/// usually ends up here.
pub fn unpad(data: &[u8], block_size: usize) -> Result<&[u8]> {
    let Some(&last) = data.last() else {
        return Err(CipherError::Padding.into());
    };
    if data.len() % block_size != 0 {
        return Err(CipherError::Padding.into());
    }
    let padding = usize::from(last);
    if padding < 1 || padding > block_size || padding > data.len() {
        return Err(CipherError::Padding.into());
    }
    Ok(&data[..data.len() - padding])
}

/// Prefix plaintext with a fresh random salt of 1 to 8 alphanumeric bytes.
pub fn attach_salt(plaintext: &[u8]) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let n = rng.gen_range(1..=MAX_RANDOM_SALT);
    let salt: Vec<u8> = (&mut rng).sample_iter(&Alphanumeric).take(n).collect();
    salted(&salt, plaintext)
}

/// Prefix plaintext with a caller-supplied salt.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` unless the salt is 1 to 255 bytes.
pub fn attach_salt_with(salt: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    if salt.is_empty() || salt.len() > usize::from(u8::MAX) {
        return Err(ConfigError::Invalid(format!(
            "salt length must be in [1, 255], got {}",
            salt.len()
        ))
        .into());
    }
    Ok(salted(salt, plaintext))
}

fn salted(salt: &[u8], plaintext: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + salt.len() + plaintext.len());
    out.push(salt.len() as u8);
    out.extend_from_slice(salt);
    out.extend_from_slice(plaintext);
    out
}

/// Remove the salt record and return the plaintext.
///
/// # Errors
///
/// Returns `CipherError::TruncatedInput` when the input is empty or shorter
/// than its declared salt length.
pub fn detach_salt(salted: &[u8]) -> Result<&[u8]> {
    let Some((&n, rest)) = salted.split_first() else {
        return Err(CipherError::TruncatedInput {
            declared: 1,
            available: 0,
        }
        .into());
    };
    let n = usize::from(n);
    if rest.len() < n {
        return Err(CipherError::TruncatedInput {
            declared: n,
            available: rest.len(),
        }
        .into());
    }
    Ok(&rest[n..])
}
