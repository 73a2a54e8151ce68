//! Git config command

use clap::Args;
use devenv_workload::VcsSslCertificateProvisioner;
use tracing::warn;

use super::CertsArgs;
use crate::Result;

/// Print git `http.<url>.sslCAInfo` settings for the trust store
#[derive(Args, Debug)]
pub struct GitConfigArgs {
    #[command(flatten)]
    pub certs: CertsArgs,
}

/// Run the git-config command
pub fn run(args: GitConfigArgs) -> Result<()> {
    let provisioner = VcsSslCertificateProvisioner::new(&args.certs.to_config());
    if !provisioner.is_configured() {
        warn!("no trust store configured, nothing to print");
        return Ok(());
    }
    print!("{}", provisioner.host_configs());
    Ok(())
}
