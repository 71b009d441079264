//! Methods command.
//!
//! Lists every method the built-in registry can construct.

use crate::cli::output;
use crate::core::registry::Registry;
use crate::error::{ConfigError, Result};

pub fn execute(json: bool) -> Result<()> {
    let registry = Registry::with_defaults();

    if json {
        let result = serde_json::json!({
            "crypto": registry.crypto_methods(),
            "signer": registry.signer_methods(),
            "hasher": registry.hasher_methods(),
        });
        let rendered = serde_json::to_string_pretty(&result).map_err(ConfigError::Parse)?;
        output::data(&rendered);
        return Ok(());
    }

    for (title, methods) in [
        ("crypto", registry.crypto_methods()),
        ("signer", registry.signer_methods()),
        ("hasher", registry.hasher_methods()),
    ] {
        output::header(title);
        for method in methods {
            output::list_item(method);
        }
    }
    Ok(())
}
