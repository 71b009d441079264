//! Core library components.
//!
//! Envelope format, cipher families, the algorithm registry and the
//! configuration they are built from.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod hash;
pub mod kms;
pub mod padding;
pub mod registry;
pub mod secrets;
pub mod sign;
pub mod types;
