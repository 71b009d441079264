//! cfgseal - self-describing secret envelopes for shared JSON configuration.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── crypt         # encrypt / decrypt
//! │   ├── sign          # sign / verify
//! │   └── hash          # hash
//! └── core/             # Core library components
//!     ├── envelope      # ENC_... wire format
//!     ├── padding       # PKCS#7 and salt records
//!     ├── cipher/       # Local Crypto implementations
//!     │   ├── mod       # Crypto trait
//!     │   ├── aes_cbc   # aes-256-cbc (+ legacy AES+V1 format)
//!     │   ├── aes_gcm   # aes-256-gcm
//!     │   ├── sm4_gcm   # tsm-sm4-128-gcm
//!     │   ├── rsa       # rsa-1024, rsa-2048
//!     │   └── sm2       # tsm-sm2
//!     ├── kms/          # Remote KMS family and client
//!     ├── sign          # Signer trait, tsm-sign
//!     ├── hash          # Hasher trait, sha256/sm3/hmac
//!     ├── registry      # Method name -> constructor tables
//!     ├── config        # sdk.json sections
//!     └── secrets       # Lazy capability facade
//! ```
//!
//! # Example
//!
//! ```no_run
//! use cfgseal::{SdkConfig, Registry, Secrets};
//!
//! let config = SdkConfig::load("sdk.json")?;
//! let secrets = Secrets::new(config, Registry::with_defaults());
//! let password = secrets.passwd_secret()?.decrypt("ENC_6366677365616c:...")?;
//! # let _ = password;
//! # Ok::<(), cfgseal::Error>(())
//! ```
//!
//! Values that are not envelopes pass through Decrypt unchanged, so plaintext
//! configuration keeps working while it is migrated.

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::cipher::Crypto;
pub use crate::core::config::{HashConfig, SdkConfig, SecretConfig, Section};
pub use crate::core::hash::{Hash, Hasher};
pub use crate::core::kms::{KmsClient, KmsCredentials};
pub use crate::core::registry::Registry;
pub use crate::core::secrets::Secrets;
pub use crate::core::sign::Signer;
pub use crate::core::types::{CryptoOpts, HashOpts, SignOpts};
pub use crate::error::{Error, Result};
