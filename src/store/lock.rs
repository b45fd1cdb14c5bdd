use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{Result, TeamsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Exclusive,
    Shared,
}

/// How long to wait for a contended lock.
///
/// The default waits indefinitely. With a timeout, acquisition retries with
/// exponential backoff (1ms doubling, capped at 512ms) until the deadline and
/// then fails with [`TeamsError::Locked`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockPolicy {
    pub timeout: Option<Duration>,
}

impl LockPolicy {
    pub fn blocking() -> Self {
        Self { timeout: None }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// A held advisory lock. Released when dropped; the OS releases it if the
/// process dies while holding it.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), %err, "failed to release lock");
        }
    }
}

/// Acquire a lock on `path`, creating the lock file (and its parent
/// directories) if needed.
pub fn acquire(path: &Path, mode: LockMode, policy: LockPolicy) -> Result<LockGuard> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    match policy.timeout {
        None => match mode {
            LockMode::Exclusive => FileExt::lock_exclusive(&file)?,
            LockMode::Shared => FileExt::lock_shared(&file)?,
        },
        Some(timeout) => acquire_with_backoff(&file, path, mode, timeout)?,
    }

    tracing::debug!(path = %path.display(), ?mode, "lock acquired");
    Ok(LockGuard {
        file,
        path: path.to_path_buf(),
        mode,
    })
}

fn acquire_with_backoff(file: &File, path: &Path, mode: LockMode, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    let mut delay = Duration::from_millis(1);
    let max_delay = Duration::from_millis(512);

    loop {
        let attempt = match mode {
            LockMode::Exclusive => FileExt::try_lock_exclusive(file),
            LockMode::Shared => FileExt::try_lock_shared(file),
        };
        match attempt {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() != fs2::lock_contended_error().kind() => {
                return Err(err.into());
            }
            Err(_) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(TeamsError::Locked(path.display().to_string()));
                }
                std::thread::sleep(delay.min(deadline - now));
                delay = (delay * 2).min(max_delay);
            }
        }
    }
}

/// Run `f` while holding a lock on `path`. The lock is released on every exit
/// path, including errors and panics inside `f`.
pub fn with_lock<T, F>(path: &Path, mode: LockMode, policy: LockPolicy, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let _guard = acquire(path, mode, policy)?;
    f()
}
