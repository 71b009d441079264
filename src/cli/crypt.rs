//! Encrypt and decrypt commands.

use tracing::debug;

use crate::cli::{output, CryptoSource};
use crate::core::config::Section;
use crate::error::Result;

/// Encrypt `value` with the selected section and print the envelope.
pub fn encrypt(value: &str, source: &CryptoSource) -> Result<()> {
    let section = Section::from(source.section);
    let crypto = source.config.open()?.crypto(section)?;
    debug!(%section, method = crypto.method(), "encrypt");
    output::data(&crypto.encrypt(value)?);
    Ok(())
}

/// Decrypt `value` with the selected section and print the plaintext.
pub fn decrypt(value: &str, source: &CryptoSource) -> Result<()> {
    let section = Section::from(source.section);
    let crypto = source.config.open()?.crypto(section)?;
    debug!(%section, method = crypto.method(), "decrypt");
    output::data(&crypto.decrypt(value)?);
    Ok(())
}
