//! Command-line interface.

pub mod crypt;
pub mod hash;
pub mod methods;
pub mod output;
pub mod sign;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::config::Section;
use crate::core::secrets::Secrets;
use crate::error::Result;

/// cfgseal - protect secret values in shared JSON configuration.
#[derive(Parser)]
#[command(
    name = "cfgseal",
    about = "Protect secret values in shared JSON configuration",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Encrypt a value into an envelope
    Encrypt {
        /// Plaintext value
        value: String,
        #[command(flatten)]
        source: CryptoSource,
    },

    /// Decrypt an envelope (plain values are printed unchanged)
    Decrypt {
        /// Envelope or plain value
        value: String,
        #[command(flatten)]
        source: CryptoSource,
    },

    /// Sign a message with sign-secret
    Sign {
        /// Message to sign
        msg: String,
        #[command(flatten)]
        source: ConfigSource,
    },

    /// Verify a signature with sign-secret
    Verify {
        /// Signed message
        msg: String,
        /// Signature envelope
        sig: String,
        #[command(flatten)]
        source: ConfigSource,
    },

    /// Hash a message with hash-secret, printed as hex
    Hash {
        /// Message to hash
        msg: String,
        #[command(flatten)]
        source: ConfigSource,
    },

    /// List registered methods
    Methods {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    /// Process exit code when this command fails.
    pub fn failure_code(&self) -> i32 {
        match self {
            Self::Encrypt { .. } => 100,
            Self::Decrypt { .. } => 200,
            _ => 1,
        }
    }
}

/// `--config` flag shared by every command that reads sdk.json.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct ConfigSource {
    /// Path to sdk.json (default: $CFGSEAL_CONFIG or ./sdk.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ConfigSource {
    fn open(&self) -> Result<Secrets> {
        Secrets::discover(self.config.as_deref())
    }
}

/// `--config` and `--section` for encrypt and decrypt.
#[derive(clap::Args, Clone, Debug)]
pub struct CryptoSource {
    #[command(flatten)]
    pub config: ConfigSource,

    /// Config section holding the key material
    #[arg(short, long, value_enum, default_value_t = SectionArg::Storage)]
    pub section: SectionArg,
}

/// Crypto sections selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionArg {
    Passwd,
    Storage,
    Transport,
}

impl From<SectionArg> for Section {
    fn from(arg: SectionArg) -> Self {
        match arg {
            SectionArg::Passwd => Section::Passwd,
            SectionArg::Storage => Section::Storage,
            SectionArg::Transport => Section::Transport,
        }
    }
}

/// Execute a command.
///
/// # Errors
///
/// Returns error if the configuration can't be loaded or the operation
/// fails.
pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Encrypt { value, source } => crypt::encrypt(&value, &source),
        Command::Decrypt { value, source } => crypt::decrypt(&value, &source),
        Command::Sign { msg, source } => sign::sign(&msg, &source),
        Command::Verify { msg, sig, source } => sign::verify(&msg, &sig, &source),
        Command::Hash { msg, source } => hash::execute(&msg, &source),
        Command::Methods { json } => methods::execute(json),
    }
}
