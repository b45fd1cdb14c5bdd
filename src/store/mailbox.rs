use std::fs;
use std::path::Path;

use crate::error::{Result, TeamsError};
use crate::model::Message;
use crate::store::lock::{self, LockMode, LockPolicy};
use crate::store::paths::TeamPaths;
use crate::store::record;

/// Per-agent inboxes of one team.
///
/// Each inbox is an append-only JSON array plus a cursor file counting how
/// many messages `poll` has already delivered. Senders and the owning poller
/// all serialize on the agent's inbox lock.
#[derive(Debug, Clone)]
pub struct Mailbox {
    paths: TeamPaths,
    policy: LockPolicy,
}

impl Mailbox {
    pub fn open(root: &Path, team: &str, policy: LockPolicy) -> Self {
        Self {
            paths: TeamPaths::new(root, team),
            policy,
        }
    }

    /// Append `message` to `agent`'s inbox, creating it if absent.
    pub fn append(&self, agent: &str, message: &Message) -> Result<()> {
        let len = record::read_modify_write(
            &self.paths.inbox_lock(agent),
            &self.paths.inbox(agent),
            self.policy,
            Vec::<Message>::new(),
            |messages| {
                messages.push(message.clone());
                Ok(messages.len())
            },
        )?;
        tracing::debug!(agent, id = %message.id, len, "message appended");
        Ok(())
    }

    /// Return every message not yet delivered by a previous poll and advance
    /// the cursor to the end of the log. The log itself is never modified.
    pub fn poll(&self, agent: &str) -> Result<Vec<Message>> {
        lock::with_lock(
            &self.paths.inbox_lock(agent),
            LockMode::Exclusive,
            self.policy,
            || {
                let mut messages: Vec<Message> =
                    record::read_or_default(&self.paths.inbox(agent), Vec::new())?;
                let cursor = self.read_cursor(agent)?;
                let len = messages.len();
                let unseen = messages.split_off(cursor.min(len));
                if cursor != len {
                    record::write_bytes_atomic(&self.paths.cursor(agent), len.to_string().as_bytes())?;
                }
                tracing::debug!(agent, cursor, len, delivered = unseen.len(), "inbox polled");
                Ok(unseen)
            },
        )
    }

    /// The whole log, without touching the cursor.
    pub fn read_all(&self, agent: &str) -> Result<Vec<Message>> {
        lock::with_lock(
            &self.paths.inbox_lock(agent),
            LockMode::Shared,
            self.policy,
            || record::read_or_default(&self.paths.inbox(agent), Vec::new()),
        )
    }

    /// Number of messages delivered by poll so far.
    pub fn cursor(&self, agent: &str) -> Result<usize> {
        lock::with_lock(
            &self.paths.inbox_lock(agent),
            LockMode::Shared,
            self.policy,
            || self.read_cursor(agent),
        )
    }

    /// Create an empty inbox for `agent` unless one already exists.
    pub fn create_empty(&self, agent: &str) -> Result<()> {
        lock::with_lock(
            &self.paths.inbox_lock(agent),
            LockMode::Exclusive,
            self.policy,
            || {
                let path = self.paths.inbox(agent);
                if !path.exists() {
                    record::write_atomic(&path, &Vec::<Message>::new())?;
                }
                Ok(())
            },
        )
    }

    /// Delete `agent`'s inbox and cursor. The lock sidecar stays so that a
    /// sender already waiting on it still serializes with later callers.
    pub fn remove(&self, agent: &str) -> Result<()> {
        lock::with_lock(
            &self.paths.inbox_lock(agent),
            LockMode::Exclusive,
            self.policy,
            || {
                remove_if_exists(&self.paths.inbox(agent))?;
                remove_if_exists(&self.paths.cursor(agent))
            },
        )
    }

    fn read_cursor(&self, agent: &str) -> Result<usize> {
        let path = self.paths.cursor(agent);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed
            .parse()
            .map_err(|e: std::num::ParseIntError| {
                TeamsError::Corrupt(path.display().to_string(), e.to_string())
            })
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
