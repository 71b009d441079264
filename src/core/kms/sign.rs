//! KMS-backed Sign/Verify (`kms-sign`).

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::trace;

use super::{key_id, KmsClient, SignatureRequest, RAW_MESSAGE_TYPE, REMOTE_SIGN_ALGORITHM};
use crate::core::envelope::{self, Codec};
use crate::core::sign::Signer;
use crate::error::Result;

/// SM2 signatures computed by the KMS, `wrap(signature)`.
pub struct KmsSigner {
    codec: Codec,
    key_id: String,
    client: Arc<dyn KmsClient>,
}

impl KmsSigner {
    pub fn new(method: &str, key_id_value: &str, client: Arc<dyn KmsClient>) -> Result<Self> {
        Ok(Self {
            codec: Codec::new(method),
            key_id: key_id(method, key_id_value)?.to_string(),
            client,
        })
    }

    fn request<'a>(&'a self, message_b64: &'a str) -> SignatureRequest<'a> {
        SignatureRequest {
            key_id: &self.key_id,
            algorithm: REMOTE_SIGN_ALGORITHM,
            message_type: RAW_MESSAGE_TYPE,
            message: message_b64,
        }
    }
}

impl Signer for KmsSigner {
    fn method(&self) -> &str {
        self.codec.method()
    }

    fn sign(&self, msg: &str) -> Result<String> {
        trace!(msg_len = msg.len(), "signing with kms");
        let message = BASE64.encode(msg);
        let signature = self.client.sign(&self.request(&message))?;
        Ok(self.codec.wrap(&[&signature]))
    }

    fn verify(&self, msg: &str, signature: &str) -> Result<bool> {
        if !envelope::is_envelope(signature) {
            return Ok(false);
        }
        let segments = self.codec.unwrap(signature, 1)?;
        let message = BASE64.encode(msg);
        self.client.verify(&self.request(&message), segments[0])
    }
}

impl fmt::Debug for KmsSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KmsSigner")
            .field("method", &self.codec.method())
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}
