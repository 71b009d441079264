//! cfgseal - protect secret values in shared JSON configuration.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cfgseal::cli::output;
use cfgseal::cli::{execute, Cli};
use cfgseal::core::constants::LOG_ENV;
use cfgseal::error::{ConfigError, Error, RegistryError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("cfgseal=debug")
        } else {
            EnvFilter::new("cfgseal=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).without_time())
        .init();

    let code = cli.command.failure_code();
    if let Err(e) = execute(cli.command) {
        let suggestion = match &e {
            Error::Config(ConfigError::NotFound(_)) => Some("set CFGSEAL_CONFIG or pass --config"),
            Error::Registry(RegistryError::UnsupportedAlgorithm(m)) if m.is_empty() => {
                Some("the section has no method; run: cfgseal methods")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(code);
    }
}
