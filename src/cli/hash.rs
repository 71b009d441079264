//! Hash command.

use crate::cli::{output, ConfigSource};
use crate::error::Result;

/// Print `hex(digest(msg))` using hash-secret.
pub fn execute(msg: &str, source: &ConfigSource) -> Result<()> {
    let hasher = source.open()?.hasher()?;
    output::data(&hex::encode(hasher.hash(msg.as_bytes())?));
    Ok(())
}
