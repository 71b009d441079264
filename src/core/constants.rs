//! Constants used throughout cfgseal.
//!
//! Centralizes method names, wire-format markers and environment variables.

/// Domain tag. Hex-encoded into the envelope prefix, appended to plaintext
/// before integrity digests, and used as the SM2 distinguishing identifier.
pub const DOMAIN_TAG: &str = "cfgseal";

/// Marker placed before the hex domain tag in every envelope prefix.
pub const ENVELOPE_MARKER: &str = "ENC_";

/// Envelope prefix: `ENVELOPE_MARKER` followed by `hex(DOMAIN_TAG)`.
pub const ENVELOPE_PREFIX: &str = "ENC_6366677365616c";

/// Current envelope format version.
pub const ENVELOPE_VERSION: &str = "1";

/// Prefix of the pre-registry `AES+V<n>+<hex>` format.
pub const LEGACY_PREFIX: &str = "AES+";

// Crypto methods
pub const AES_256_CBC: &str = "aes-256-cbc";
pub const AES_256_GCM: &str = "aes-256-gcm";
pub const TSM_SM4_128_GCM: &str = "tsm-sm4-128-gcm";
pub const RSA_1024: &str = "rsa-1024";
pub const RSA_2048: &str = "rsa-2048";
pub const TSM_SM2: &str = "tsm-sm2";
pub const KMS_SM2: &str = "kms-sm2";
pub const KMS_SM4_128_GCM: &str = "kms-sm4-128-gcm";

// Signer methods
pub const TSM_SIGN: &str = "tsm-sign";
pub const KMS_SIGN: &str = "kms-sign";

// Hash methods
pub const SHA256: &str = "sha256";
pub const TSM_SM3: &str = "tsm-sm3";
pub const HMAC_SHA256: &str = "hmac-sha256";
pub const HMAC_SM3: &str = "hmac-sm3";

/// Path of the SDK configuration file, overriding `DEFAULT_CONFIG_FILE`.
pub const CONFIG_ENV: &str = "CFGSEAL_CONFIG";

/// Default SDK configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "sdk.json";

/// Inline JSON override for the storage-secret section.
pub const STORAGE_SECRET_ENV: &str = "CFGSEAL_STORAGE_SECRET";

/// Inline JSON override for the transport-secret section.
pub const TRANSPORT_SECRET_ENV: &str = "CFGSEAL_TRANSPORT_SECRET";

/// Log filter for the binary.
pub const LOG_ENV: &str = "CFGSEAL_LOG";
