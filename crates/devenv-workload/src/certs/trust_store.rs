//! Trust store reader
//!
//! Lists the regular files under a configured directory. Certificate
//! provisioning is optional hardening, so every filesystem failure here is
//! logged and treated as "no certificates" instead of being surfaced.

use std::path::PathBuf;

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A local directory of certificate files, one file per trusted host
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrustStore {
    root: Option<PathBuf>,
}

impl TrustStore {
    /// Trust store rooted at `root`; `None` or an empty path disables it
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root: root.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// Whether a trust-store directory is configured
    pub fn is_configured(&self) -> bool {
        self.root.is_some()
    }

    /// Regular files directly or transitively under the root.
    ///
    /// Entries are visited sorted by file name within each directory. Hidden
    /// entries are skipped: Kubernetes-mounted ConfigMaps and Secrets keep the
    /// real files under `..data` and expose symlinks at the top level. Symlinks
    /// are followed, so symlinked files count as regular files and dangling
    /// links are skipped with a warning. Returns an empty list when
    /// unconfigured or when the root can't be read.
    pub fn read_files(&self) -> Vec<PathBuf> {
        let Some(root) = self.root.as_deref() else {
            return Vec::new();
        };

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.path().is_file() {
                        files.push(entry.into_path());
                    }
                }
                Err(e) if e.depth() == 0 => {
                    warn!(
                        path = %root.display(),
                        error = %e,
                        "trust store directory is not readable, no certificates will be provisioned"
                    );
                    return Vec::new();
                }
                Err(e) => {
                    warn!(path = ?e.path(), error = %e, "skipping unreadable trust store entry");
                }
            }
        }

        debug!(path = %root.display(), count = files.len(), "read trust store");
        files
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
