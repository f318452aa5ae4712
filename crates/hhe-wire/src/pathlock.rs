//! Process-wide per-path locks
//!
//! Spool files may be touched by a writer and a reader living in different
//! threads of the same process. The registry hands out one reference-counted
//! mutex per normalized path; holders of the same path's handle are
//! serialized. Entries are created on first request and kept for the life of
//! the process (path cardinality is bounded by the run configuration).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Owned handle on a path's lock. Lock it to gain exclusive access.
pub type PathLock = Arc<Mutex<()>>;

static REGISTRY: OnceLock<Mutex<HashMap<PathBuf, PathLock>>> = OnceLock::new();

/// Returns the lock handle for `path`, creating it on first request.
pub fn lock_for(path: &Path) -> PathLock {
    let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = registry.lock().unwrap_or_else(PoisonError::into_inner);
    map.entry(normalize(path))
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Keys are absolute so that `./spool.bin` and `spool.bin` share one lock.
fn normalize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
