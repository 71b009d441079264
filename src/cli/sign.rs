//! Sign and verify commands.

use crate::cli::{output, ConfigSource};
use crate::error::{CipherError, Result};

/// Print the signature envelope for `msg`.
pub fn sign(msg: &str, source: &ConfigSource) -> Result<()> {
    let signer = source.open()?.signer()?;
    output::data(&signer.sign(msg)?);
    Ok(())
}

/// Check `sig` against `msg`. A mismatch is reported as an error so the
/// process exits non-zero.
pub fn verify(msg: &str, sig: &str, source: &ConfigSource) -> Result<()> {
    let signer = source.open()?.signer()?;
    if !signer.verify(msg, sig)? {
        return Err(CipherError::Integrity.into());
    }
    output::success("signature valid");
    Ok(())
}
