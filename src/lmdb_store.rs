use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info};

use crate::kv_store::{KeyValueStore, StoreError};

const MAP_SIZE: usize = 10 * 1024 * 1024;

/// Directories with a live environment in this process.
static OPEN_PATHS: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();

fn open_paths() -> &'static Mutex<HashSet<PathBuf>> {
    OPEN_PATHS.get_or_init(Default::default)
}

/// Claim on a directory, released when the store is dropped.
struct PathLease(PathBuf);

impl PathLease {
    fn acquire(path: &Path) -> Result<Self, StoreError> {
        let canonical = std::fs::canonicalize(path).map_err(|e| {
            StoreError::Unavailable(format!("cannot resolve {}: {e}", path.display()))
        })?;

        let mut open = open_paths()
            .lock()
            .map_err(|_| StoreError::Unavailable("open path registry poisoned".to_string()))?;
        if !open.insert(canonical.clone()) {
            return Err(StoreError::AlreadyOpen(path.display().to_string()));
        }
        Ok(Self(canonical))
    }
}

impl Drop for PathLease {
    fn drop(&mut self) {
        open_paths()
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.0);
        debug!("Released {}", self.0.display());
    }
}

/// LMDB-backed [`KeyValueStore`].
///
/// The environment lives in a `<name>.lmdb` directory that is created on
/// first use. Every call runs in its own transaction, so a single key's
/// read-modify-write by one writer never observes a torn value.
///
/// LMDB forbids opening one environment twice in a process, so a second
/// `init` for a directory that is still open fails with
/// [`StoreError::AlreadyOpen`] until the first store is dropped.
pub struct LmdbStore {
    env: Environment,
    db: Database,
    path: PathBuf,
    // Declared last so the environment is closed before the path is released.
    _lease: PathLease,
}

impl LmdbStore {
    pub fn init(name: String) -> Result<Self, StoreError> {
        let path = PathBuf::from(format!("{name}.lmdb"));

        std::fs::create_dir_all(&path).map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {e}", path.display()))
        })?;

        let lease = PathLease::acquire(&path)?;

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(MAP_SIZE)
            .open(&path)?;
        let db = env.create_db(None, DatabaseFlags::empty())?;

        info!("LMDB store opened at {}", path.display());
        Ok(Self {
            env,
            db,
            path,
            _lease: lease,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for LmdbStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let txn = self.env.begin_ro_txn()?;
        let value = match txn.get(self.db, &key) {
            Ok(bytes) => Some(
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| StoreError::Backend(format!("non UTF-8 value under {key}: {e}")))?,
            ),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        txn.abort();

        debug!("LMDB get {key}: {}", if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut txn = self.env.begin_rw_txn()?;
        match txn.del(self.db, &key, None) {
            Ok(()) | Err(lmdb::Error::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        txn.commit()?;
        Ok(())
    }
}
