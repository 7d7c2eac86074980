use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

pub const FILTERS_KEY: &str = "geo-dashboard-filters";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const LOCALE_KEY: &str = "geo-locale";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Directory-backed key/value store, one file per key.
///
/// Writes go through a temp file and a rename, so concurrent dashboards
/// sharing a data dir see last-write-wins rather than torn values.
#[derive(Clone, Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Some(value),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(key, error = %e, "failed to read stored value");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path(key);
        // one temp file per writer; escaped key names never start with '.'
        let tmp = self.root.join(format!(
            ".{}.{}.{}.tmp",
            file_name(key),
            process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    pub fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(file_name(key))
    }
}

/// Percent-escape everything but `[A-Za-z0-9_-]`, so distinct keys map to
/// distinct files and none can leave the root.
fn file_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Access token shared by the HTTP client and the auth session.
/// Reads are served from memory once loaded.
#[derive(Clone, Debug)]
pub struct TokenStore {
    store: Option<LocalStore>,
    cached: Arc<Mutex<Option<String>>>,
}

impl TokenStore {
    pub fn new(store: LocalStore) -> Self {
        Self {
            store: Some(store),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Token store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            store: None,
            cached: Arc::new(Mutex::new(None)),
        }
    }

    pub fn get(&self) -> Option<String> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if cached.is_none() {
            *cached = self
                .store
                .as_ref()
                .and_then(|s| s.get(ACCESS_TOKEN_KEY))
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
        }
        cached.clone()
    }

    pub fn set(&self, token: &str) -> io::Result<()> {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        match &self.store {
            Some(store) => store.set(ACCESS_TOKEN_KEY, token),
            None => Ok(()),
        }
    }

    pub fn clear(&self) {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = None;
        if let Some(store) = &self.store {
            if let Err(e) = store.remove(ACCESS_TOKEN_KEY) {
                warn!(error = %e, "failed to remove stored access token");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert_eq!(store.get("nope"), None);
        store.remove("nope").unwrap();
    }

    #[test]
    fn set_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set(FILTERS_KEY, "{\"a\":1}").unwrap();
        store.set(FILTERS_KEY, "{\"a\":2}").unwrap();
        assert_eq!(store.get(FILTERS_KEY).as_deref(), Some("{\"a\":2}"));
    }

    #[test]
    fn keys_cannot_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("store");
        let store = LocalStore::open(&root).unwrap();
        store.set("../evil", "x").unwrap();
        assert!(root.join("%2E%2E%2Fevil").exists());
        assert!(!dir.path().join("evil").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(store.get("../evil").as_deref(), Some("x"));
    }

    #[test]
    fn similar_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.set("a.b", "dot").unwrap();
        store.set("a_b", "underscore").unwrap();
        store.set("a%2Eb", "escaped").unwrap();
        assert_eq!(store.get("a.b").as_deref(), Some("dot"));
        assert_eq!(store.get("a_b").as_deref(), Some("underscore"));
        assert_eq!(store.get("a%2Eb").as_deref(), Some("escaped"));
    }

    #[test]
    fn concurrent_writers_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let writers: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for n in 0..25 {
                        store.set(FILTERS_KEY, &format!("{}-{}", i, n)).unwrap();
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }
        assert!(store.get(FILTERS_KEY).is_some());
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn token_survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(LocalStore::open(dir.path()).unwrap());
        tokens.set("abc123").unwrap();

        let reopened = TokenStore::new(LocalStore::open(dir.path()).unwrap());
        assert_eq!(reopened.get().as_deref(), Some("abc123"));

        reopened.clear();
        assert_eq!(reopened.get(), None);
        assert_eq!(TokenStore::new(LocalStore::open(dir.path()).unwrap()).get(), None);
    }
}
