//! devenv CLI library

pub mod commands;
pub mod error;

pub use error::{Error, Result};

use clap::{Parser, Subcommand};
use devenv_common::telemetry::LogFormat;

/// devenv - provision workspace workload descriptors
#[derive(Parser, Debug)]
#[command(name = "devenv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format (text or json)
    #[arg(long, global = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the provisioners over a descriptor and print the result
    Provision(commands::provision::ProvisionArgs),
    /// Print git http stanzas for the trusted certificates
    GitConfig(commands::git_config::GitConfigArgs),
}

impl Cli {
    /// Run the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Provision(args) => commands::provision::run(args),
            Commands::GitConfig(args) => commands::git_config::run(args),
        }
    }
}
