//! Per-host git transport configuration
//!
//! Each certificate file name is a trusted host (optionally with a port), and
//! becomes one `[http]` stanza pointing git at the mounted certificate:
//!
//! ```text
//! [http "https://git.example.com*"]
//! 	sslCAInfo = /etc/che/git/cert/git.example.com
//! ```

const HTTPS: &str = "https://";

/// Git config stanza trusting the certificate `host` mounted under `mount_path`
pub fn host_config_stanza(host: &str, mount_path: &str) -> String {
    format!(
        "[http \"{}{}*\"]\n\tsslCAInfo = {}{}\n",
        HTTPS, host, mount_path, host
    )
}

/// One stanza per host, in the given order
pub fn render_host_configs<'a>(
    hosts: impl IntoIterator<Item = &'a str>,
    mount_path: &str,
) -> String {
    hosts
        .into_iter()
        .map(|host| host_config_stanza(host, mount_path))
        .collect()
}
