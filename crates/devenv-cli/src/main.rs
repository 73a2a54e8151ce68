//! devenv CLI
//!
//! Provisions workspace descriptors before they are applied to a cluster.

use clap::Parser;

use devenv_cli::{Cli, Result};
use devenv_common::telemetry::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;
    cli.run()
}
