//! Framed file spools
//!
//! A spool is a file of zero or more concatenated frames. Appends and reads
//! go through the per-path lock, so within a process at most one writer or
//! reader touches a spool at a time and every append lands as a whole frame.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::PoisonError;

use crate::error::WireResult;
use crate::frame;
use crate::pathlock::{self, PathLock};

/// Appends one frame to the spool at `path`, creating parent directories on
/// first use.
pub fn append_frame(path: &Path, payload: &[u8]) -> WireResult<()> {
    let lock = pathlock::lock_for(path);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    frame::write_frame(&mut file, payload)?;
    Ok(())
}

/// Truncates the spool at `path` to zero length, creating it if absent.
pub fn truncate(path: &Path) -> WireResult<()> {
    let lock = pathlock::lock_for(path);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(path)?;
    Ok(())
}

/// Sequential reader over a spool's frames.
///
/// Opening a path that does not exist yields an empty reader whose `next()`
/// reports the end immediately; this covers the "consumer started before the
/// producer wrote anything" case without a failure.
pub struct SpoolReader {
    path: PathBuf,
    lock: PathLock,
    file: Option<BufReader<File>>,
}

impl SpoolReader {
    pub fn open(path: impl Into<PathBuf>) -> WireResult<Self> {
        let path = path.into();
        let lock = pathlock::lock_for(&path);
        let file = match File::open(&path) {
            Ok(f) => Some(BufReader::new(f)),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, lock, file })
    }

    /// Returns the next frame payload, or `None` at the end of the spool.
    pub fn next(&mut self) -> WireResult<Option<Vec<u8>>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.file.as_mut() {
            Some(file) => frame::read_frame(file),
            None => Ok(None),
        }
    }

    /// Restarts iteration from offset 0.
    pub fn reset(&mut self) -> WireResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(file) = self.file.as_mut() {
            file.seek(SeekFrom::Start(0))?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Picks the file in `dir` whose name starts with the lexicographically
/// greatest `YYYYMMDD_HHMMSS` stamp. Returns `None` when the directory is
/// missing, empty, or holds no stamped file.
pub fn latest_stamped_file(dir: &Path) -> WireResult<Option<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut latest: Option<(String, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(stamp) = stamp_prefix(name) else { continue };
        if latest.as_ref().map_or(true, |(best, _)| stamp > *best) {
            latest = Some((stamp, entry.path()));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

/// Extracts the leading 15-character `YYYYMMDD_HHMMSS` stamp, if present.
fn stamp_prefix(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    if bytes.len() < 15 {
        return None;
    }
    let digits_ok = bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[8] == b'_'
        && bytes[9..15].iter().all(u8::is_ascii_digit);
    digits_ok.then(|| name[..15].to_string())
}
