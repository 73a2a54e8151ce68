//! Provision command
//!
//! Loads a workspace descriptor, runs the provisioning chain over it and
//! prints the provisioned manifests to stdout.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use devenv_workload::{
    ConfigurationProvisioner, KubernetesEnvironment, Manifest, ProvisionerChain, RuntimeIdentity,
    VcsSslCertificateProvisioner,
};
use tracing::info;

use super::CertsArgs;
use crate::{Error, Result};

/// Provision a workspace descriptor and print the result
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Descriptor manifests (multi-document YAML or JSON), `-` for stdin
    #[arg(long, short = 'f')]
    pub descriptor: PathBuf,

    /// Workspace id used to name generated resources
    #[arg(long)]
    pub workspace_id: String,

    /// Namespace the workspace runs in
    #[arg(long)]
    pub namespace: Option<String>,

    #[command(flatten)]
    pub certs: CertsArgs,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,
}

/// Manifest output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Multi-document YAML
    Yaml,
    /// A Kubernetes `List` in JSON
    Json,
}

/// Run the provision command
pub fn run(args: ProvisionArgs) -> Result<()> {
    let input = read_descriptor(&args.descriptor)?;
    let env = KubernetesEnvironment::from_manifests(&input).map_err(|source| Error::Descriptor {
        path: args.descriptor.clone(),
        source,
    })?;

    let chain = build_chain(&args.certs);
    let mut identity = RuntimeIdentity::new(&args.workspace_id);
    if let Some(namespace) = &args.namespace {
        identity = identity.with_namespace(namespace);
    }

    let env = provision(env, &chain, &identity)?;
    print!("{}", render(&env.to_manifests(), args.output)?);
    Ok(())
}

/// Every provisioner the CLI knows about, in run order
pub fn build_chain(certs: &CertsArgs) -> ProvisionerChain {
    ProvisionerChain::new().with(VcsSslCertificateProvisioner::new(&certs.to_config()))
}

/// Run the chain over a descriptor, handing it back only on success
pub fn provision(
    mut env: KubernetesEnvironment,
    chain: &ProvisionerChain,
    identity: &RuntimeIdentity,
) -> Result<KubernetesEnvironment> {
    chain.provision(&mut env, identity)?;
    info!(
        workspace_id = %identity.workspace_id,
        pods = env.pods().len(),
        config_maps = env.config_maps().len(),
        "descriptor provisioned"
    );
    Ok(env)
}

/// Serialize manifests in the requested format
pub fn render(manifests: &[Manifest], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => {
            let mut out = String::new();
            for manifest in manifests {
                out.push_str("---\n");
                out.push_str(&serde_yaml::to_string(manifest)?);
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let list = serde_json::json!({
                "apiVersion": "v1",
                "kind": "List",
                "items": manifests,
            });
            let mut out = serde_json::to_string_pretty(&list)?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn read_descriptor(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input)?;
        return Ok(input);
    }
    std::fs::read_to_string(path).map_err(|e| Error::Descriptor {
        path: path.to_path_buf(),
        source: devenv_common::Error::io(path.display().to_string(), e),
    })
}
