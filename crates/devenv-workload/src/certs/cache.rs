//! Certificate cache
//!
//! Certificate contents are read from the trust store and shared afterwards.
//! The first caller to find the cache empty performs the load while holding
//! the lock; concurrent callers wait and then reuse it. A load that finds no
//! certificates is not kept, so a trust store mounted after the first
//! provisioning run is still picked up. Once populated the cache is never
//! invalidated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::trust_store::TrustStore;

/// Certificate file name -> certificate text
pub type Certificates = BTreeMap<String, String>;

/// Lazily populated, read-only-after-load certificate contents
#[derive(Debug)]
pub struct CertificateCache {
    trust_store: TrustStore,
    certs: Mutex<Option<Arc<Certificates>>>,
}

impl CertificateCache {
    /// Create an unpopulated cache over a trust store
    pub fn new(trust_store: TrustStore) -> Self {
        Self {
            trust_store,
            certs: Mutex::new(None),
        }
    }

    /// The trust store backing this cache
    pub fn trust_store(&self) -> &TrustStore {
        &self.trust_store
    }

    /// Whether a trust-store path is configured
    pub fn is_configured(&self) -> bool {
        self.trust_store.is_configured()
    }

    #[cfg(test)]
    fn is_populated(&self) -> bool {
        self.certs.lock().is_some()
    }

    /// Certificates, loading them from the trust store until a load finds any.
    ///
    /// Repeat calls are no-ops once the cache is non-empty.
    pub fn load(&self) -> Arc<Certificates> {
        let mut guard = self.certs.lock();
        if let Some(certs) = guard.as_ref() {
            return Arc::clone(certs);
        }

        let certs = Arc::new(read_certificates(&self.trust_store.read_files()));
        if certs.is_empty() {
            debug!("trust store holds no certificates, cache left empty");
            return certs;
        }
        debug!(count = certs.len(), "populated certificate cache");
        *guard = Some(Arc::clone(&certs));
        certs
    }
}

/// Read every certificate file, keeping the ones that could be read.
///
/// Unreadable or non-UTF-8 files are logged and skipped individually. When two
/// files share a name (in different subdirectories) the later one wins.
pub fn read_certificates(paths: &[PathBuf]) -> Certificates {
    paths
        .iter()
        .filter_map(|path| match read_certificate(path) {
            Ok(entry) => Some(entry),
            Err(reason) => {
                warn!(path = %path.display(), %reason, "skipping certificate");
                None
            }
        })
        .collect()
}

fn read_certificate(path: &Path) -> Result<(String, String), String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| "file name is not valid UTF-8".to_string())?;
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    Ok((name.to_string(), content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn cache_for(dir: &Path) -> CertificateCache {
        CertificateCache::new(TrustStore::new(Some(dir.to_path_buf())))
    }

    #[test]
    fn test_load_reads_contents_by_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("localhost"), "-----BEGIN CERTIFICATE-----\nA\n")
            .expect("write");

        let certs = cache_for(dir.path()).load();
        assert_eq!(certs.len(), 1);
        assert_eq!(
            certs.get("localhost").map(String::as_str),
            Some("-----BEGIN CERTIFICATE-----\nA\n")
        );
    }

    #[test]
    fn test_load_is_memoized() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("localhost"), "first").expect("write");

        let cache = cache_for(dir.path());
        assert!(!cache.is_populated());
        let first = cache.load();
        assert!(cache.is_populated());

        fs::write(dir.path().join("localhost"), "second").expect("write");
        fs::write(dir.path().join("other.host"), "new").expect("write");

        let second = cache.load();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get("localhost").map(String::as_str), Some("first"));
        assert!(!second.contains_key("other.host"));
    }

    #[test]
    fn test_empty_directory_leaves_cache_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_for(dir.path());
        assert!(cache.is_configured());
        assert!(cache.load().is_empty());
        assert!(!cache.is_populated());
    }

    #[test]
    fn test_load_retries_until_certificates_appear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = cache_for(&dir.path().join("certs"));
        assert!(cache.load().is_empty());

        fs::create_dir(dir.path().join("certs")).expect("mkdir");
        assert!(cache.load().is_empty());

        fs::write(dir.path().join("certs").join("localhost"), "cert").expect("write");
        let certs = cache.load();
        assert_eq!(certs.get("localhost").map(String::as_str), Some("cert"));
        assert!(cache.is_populated());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_name_is_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("localhost"), "cert").expect("write");
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xffhost")), "cert").expect("write");

        let certs = cache_for(dir.path()).load();
        assert_eq!(certs.len(), 1);
        assert!(certs.contains_key("localhost"));
    }

    #[test]
    fn test_unreadable_file_does_not_block_others() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("good.host"), "cert").expect("write");
        fs::write(dir.path().join("binary.host"), [0xff, 0xfe, 0x00, 0x81]).expect("write");

        let paths = vec![
            dir.path().join("binary.host"),
            dir.path().join("vanished.host"),
            dir.path().join("good.host"),
        ];
        let certs = read_certificates(&paths);
        assert_eq!(certs.len(), 1);
        assert_eq!(certs.get("good.host").map(String::as_str), Some("cert"));
    }

    #[test]
    fn test_concurrent_load_populates_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("localhost"), "cert").expect("write");
        let cache = Arc::new(cache_for(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.load())
            })
            .collect();
        let loaded: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();

        for certs in &loaded[1..] {
            assert!(Arc::ptr_eq(&loaded[0], certs));
        }
    }
}
