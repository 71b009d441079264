//! Sign/Verify capabilities.
//!
//! Signatures are envelopes, like ciphertexts. `verify` returns `Ok(false)`
//! for a signature that is not an envelope so an unsigned value is simply
//! "not verified" instead of an error.

use std::fmt;

use ::sm2::dsa::signature::{Signer as _, Verifier as _};
use ::sm2::dsa::{Signature, SigningKey, VerifyingKey};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::trace;

use crate::core::cipher::sm2::{decode_public_key, decode_secret_key};
use crate::core::constants::DOMAIN_TAG;
use crate::core::envelope::{self, Codec};
use crate::core::types::SignOpts;
use crate::error::{CipherError, ConfigError, EnvelopeError, Result};

/// Sign/Verify capability.
pub trait Signer: Send + Sync + fmt::Debug {
    fn method(&self) -> &str;

    /// Sign a message and return the signature envelope.
    fn sign(&self, msg: &str) -> Result<String>;

    /// Check a signature envelope against a message.
    ///
    /// # Errors
    ///
    /// Returns `EnvelopeError` for a malformed envelope. A well-formed
    /// signature that does not match is `Ok(false)`.
    fn verify(&self, msg: &str, signature: &str) -> Result<bool>;
}

/// Local SM2 signatures (`tsm-sign`) with the domain tag as distinguishing ID.
pub struct Sm2Signer {
    codec: Codec,
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Sm2Signer {
    pub fn from_opts(opts: &SignOpts) -> Result<Self> {
        let public_key = decode_public_key(&opts.method, &opts.public_key)?;
        let secret_key = decode_secret_key(&opts.method, &opts.private_key)?;
        let signing_key = SigningKey::new(DOMAIN_TAG, &secret_key)
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", opts.method, e)))?;
        let verifying_key = VerifyingKey::new(DOMAIN_TAG, public_key)
            .map_err(|e| ConfigError::Invalid(format!("{}: {}", opts.method, e)))?;
        Ok(Self {
            codec: Codec::new(&opts.method),
            signing_key,
            verifying_key,
        })
    }
}

impl Signer for Sm2Signer {
    fn method(&self) -> &str {
        self.codec.method()
    }

    fn sign(&self, msg: &str) -> Result<String> {
        trace!(msg_len = msg.len(), "signing with sm2");
        let signature: Signature = self
            .signing_key
            .try_sign(msg.as_bytes())
            .map_err(|e| CipherError::SigningFailed(format!("sm2: {}", e)))?;
        Ok(self.codec.wrap(&[&BASE64.encode(signature.to_bytes())]))
    }

    fn verify(&self, msg: &str, signature: &str) -> Result<bool> {
        if !envelope::is_envelope(signature) {
            return Ok(false);
        }
        let segments = self.codec.unwrap(signature, 1)?;
        let raw = BASE64
            .decode(segments[0])
            .map_err(|e| EnvelopeError::Decode(format!("signature is not base64: {}", e)))?;
        let Ok(signature) = Signature::from_slice(&raw) else {
            trace!(signature_len = raw.len(), "signature has the wrong shape");
            return Ok(false);
        };
        Ok(self.verifying_key.verify(msg.as_bytes(), &signature).is_ok())
    }
}

impl fmt::Debug for Sm2Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sm2Signer")
            .field("method", &self.codec.method())
            .finish_non_exhaustive()
    }
}
