//! Self-describing envelope codec.
//!
//! Every protected value has the shape
//!
//! ```text
//! ENC_6366677365616c:<hex method>:<hex version>:<segment>[:<segment>]
//! ```
//!
//! Method and version are hex-encoded so they can never contain the `:`
//! delimiter. Payload segments are hex or base64 depending on the algorithm,
//! neither of which produces a `:` either.
//!
//! Anything that does not start with the prefix is treated as legacy
//! plaintext by every decoder.

use tracing::trace;

use crate::core::constants::{ENVELOPE_PREFIX, ENVELOPE_VERSION, LEGACY_PREFIX};
use crate::error::{EnvelopeError, Result};

const DELIMITER: char = ':';

/// Leading parts before the payload: prefix, method, version.
const HEADER_PARTS: usize = 3;

/// Check whether a value is envelope-encoded rather than plaintext.
pub fn is_envelope(value: &str) -> bool {
    value.starts_with(ENVELOPE_PREFIX)
}

/// Check whether a value uses the legacy `AES+V<n>+<hex>` format.
pub fn is_legacy(value: &str) -> bool {
    value.starts_with(LEGACY_PREFIX)
}

/// Build an envelope from raw method/version strings and encoded segments.
pub fn wrap(method: &str, version: &str, segments: &[&str]) -> String {
    let mut out = String::with_capacity(
        ENVELOPE_PREFIX.len()
            + 2 * (method.len() + version.len())
            + segments.iter().map(|s| s.len() + 1).sum::<usize>()
            + 2,
    );
    out.push_str(ENVELOPE_PREFIX);
    out.push(DELIMITER);
    out.push_str(&hex::encode(method));
    out.push(DELIMITER);
    out.push_str(&hex::encode(version));
    for segment in segments {
        out.push(DELIMITER);
        out.push_str(segment);
    }
    out
}

/// Decoded envelope, borrowing payload segments from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// Algorithm identifier (decoded).
    pub method: String,
    /// Format version (decoded). Carried but not interpreted.
    pub version: String,
    /// Payload segments, still hex/base64 encoded.
    pub segments: Vec<&'a str>,
}

/// Split an envelope and check it against the caller's algorithm.
///
/// # Errors
///
/// - `EnvelopeError::Format` if the part count is not `3 + payload_segments`,
///   the prefix is wrong, or method/version are not valid hex
/// - `EnvelopeError::MethodMismatch` if the envelope was produced by a
///   different algorithm
pub fn unwrap<'a>(
    value: &'a str,
    expected_method: &str,
    payload_segments: usize,
) -> Result<Envelope<'a>> {
    let parts: Vec<&str> = value.split(DELIMITER).collect();
    if parts.len() != HEADER_PARTS + payload_segments {
        return Err(EnvelopeError::Format(format!(
            "expected {} segments, found {}",
            HEADER_PARTS + payload_segments,
            parts.len()
        ))
        .into());
    }
    if parts[0] != ENVELOPE_PREFIX {
        return Err(EnvelopeError::Format("unknown envelope prefix".to_string()).into());
    }

    let method = decode_header(parts[1], "method")?;
    if method != expected_method {
        return Err(EnvelopeError::MethodMismatch {
            expected: expected_method.to_string(),
            found: method,
        }
        .into());
    }
    let version = decode_header(parts[2], "version")?;
    if version != ENVELOPE_VERSION {
        trace!(version = %version, "unwrapping envelope with non-current version");
    }

    Ok(Envelope {
        method,
        version,
        segments: parts[HEADER_PARTS..].to_vec(),
    })
}

fn decode_header(part: &str, what: &str) -> Result<String> {
    let bytes = hex::decode(part)
        .map_err(|_| EnvelopeError::Format(format!("{} segment is not hex", what)))?;
    String::from_utf8(bytes)
        .map_err(|_| EnvelopeError::Format(format!("{} segment is not UTF-8", what)).into())
}

/// Envelope codec bound to one algorithm.
///
/// Capability instances hold one of these so that every encrypt and decrypt
/// uses the same method tag.
#[derive(Debug, Clone)]
pub struct Codec {
    method: String,
}

impl Codec {
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Wrap payload segments with this codec's method and the current version.
    pub fn wrap(&self, segments: &[&str]) -> String {
        wrap(&self.method, ENVELOPE_VERSION, segments)
    }

    /// Unwrap and return exactly `payload_segments` payload segments.
    pub fn unwrap<'a>(&self, value: &'a str, payload_segments: usize) -> Result<Vec<&'a str>> {
        Ok(unwrap(value, &self.method, payload_segments)?.segments)
    }
}

/// Legacy `AES+V<n>+<hex>` envelope written by pre-registry tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEnvelope<'a> {
    pub version: u32,
    pub payload: &'a str,
}

impl<'a> LegacyEnvelope<'a> {
    /// Parse a legacy envelope.
    ///
    /// # Errors
    ///
    /// Returns `EnvelopeError::Format` unless the value is exactly
    /// `AES+V<digits>+<non-empty payload>`.
    pub fn parse(value: &'a str) -> Result<Self> {
        let rest = value
            .strip_prefix(LEGACY_PREFIX)
            .and_then(|r| r.strip_prefix('V'))
            .ok_or_else(|| EnvelopeError::Format("not a legacy envelope".to_string()))?;
        let (version, payload) = rest
            .split_once('+')
            .ok_or_else(|| EnvelopeError::Format("legacy envelope has no payload".to_string()))?;
        let version = version
            .parse::<u32>()
            .map_err(|_| EnvelopeError::Format("legacy version is not numeric".to_string()))?;
        let payload = payload.trim_end();
        if payload.is_empty() || payload.contains(char::is_whitespace) {
            return Err(EnvelopeError::Format("legacy payload is malformed".to_string()).into());
        }
        Ok(Self { version, payload })
    }

    /// Render in the legacy format.
    #[cfg(test)]
    pub fn render(&self) -> String {
        format!("{}V{}+{}", LEGACY_PREFIX, self.version, self.payload)
    }
}
