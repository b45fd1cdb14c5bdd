//! Lock-scoped JSON records.
//!
//! Data files are replaced by write-to-temp + rename, so locks live on
//! sidecar files (see [`crate::store::paths`]) instead of the data file's
//! own inode.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, TeamsError};
use crate::store::lock::{self, LockMode, LockPolicy};

/// Read the JSON value at `path`. A missing or whitespace-only file yields
/// `None`; anything else that fails to parse is [`TeamsError::Corrupt`].
pub fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| TeamsError::Corrupt(path.display().to_string(), e.to_string()))
}

pub fn read_or_default<T: DeserializeOwned>(path: &Path, default: T) -> Result<T> {
    Ok(read_record(path)?.unwrap_or(default))
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
pub fn write_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_bytes_atomic(path, json.as_bytes())
}

/// Write bytes via a temp file in the target directory, then rename over the
/// target. Readers see either the old or the new content, never a prefix.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<()> {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = parent.join(format!(".tmp-{}-{seq}-{file_name}", std::process::id()));

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_data()?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        TeamsError::from(err)
    })?;
    tracing::debug!(path = %path.display(), bytes = data.len(), "record written");
    Ok(())
}

/// Read-modify-write of the record at `path` under an exclusive lock on
/// `lock_path`.
///
/// `mutate` runs on the current value (or `default` when the file is missing
/// or empty). The file is rewritten only if `mutate` returns `Ok`, so a
/// failed mutation leaves the stored bytes untouched.
pub fn read_modify_write<T, R, F>(
    lock_path: &Path,
    path: &Path,
    policy: LockPolicy,
    default: T,
    mutate: F,
) -> Result<R>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut T) -> Result<R>,
{
    lock::with_lock(lock_path, LockMode::Exclusive, policy, || {
        let mut value = read_or_default(path, default)?;
        let out = mutate(&mut value)?;
        write_atomic(path, &value)?;
        Ok(out)
    })
}
