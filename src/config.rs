use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, TeamsError};
use crate::store::lock::LockPolicy;

/// Env var overriding the coordination root.
pub const ROOT_ENV: &str = "AGENT_TEAMS_ROOT";
/// Env var bounding how long lock acquisition may wait, in milliseconds.
pub const LOCK_TIMEOUT_ENV: &str = "AGENT_TEAMS_LOCK_TIMEOUT_MS";
/// Env var holding the log filter (`EnvFilter` directive syntax).
pub const LOG_ENV: &str = "AGENT_TEAMS_LOG";

/// Where team state lives and how to wait for locks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub root: PathBuf,
    pub lock: LockPolicy,
}

impl Config {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: LockPolicy::blocking(),
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock = LockPolicy { timeout };
        self
    }

    /// Resolve in precedence order: explicit root, `$AGENT_TEAMS_ROOT`, then
    /// `~/.openclaw/teams`. The lock timeout falls back to
    /// `$AGENT_TEAMS_LOCK_TIMEOUT_MS`; unset means wait indefinitely.
    pub fn resolve(root: Option<PathBuf>, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let root = match root {
            Some(root) => root,
            None => match std::env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
                Some(root) => PathBuf::from(root),
                None => default_root()?,
            },
        };
        let lock_timeout_ms = match lock_timeout_ms {
            Some(ms) => Some(ms),
            None => env_lock_timeout_ms()?,
        };
        Ok(Self::new(root).with_lock_timeout(lock_timeout_ms.map(Duration::from_millis)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn env_lock_timeout_ms() -> Result<Option<u64>> {
    match std::env::var(LOCK_TIMEOUT_ENV) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map(Some).map_err(|_| {
            TeamsError::Validation(format!("{LOCK_TIMEOUT_ENV} must be a number of milliseconds"))
        }),
        _ => Ok(None),
    }
}

pub fn default_root() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".openclaw").join("teams"))
        .ok_or_else(|| {
            TeamsError::Validation(format!(
                "cannot determine home directory; set {ROOT_ENV} or pass --root"
            ))
        })
}
