use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{Result, TeamsError};
use crate::identity::validate_name;
use crate::model::TeamConfig;
use crate::store::lock::{self, LockMode, LockPolicy};
use crate::store::mailbox::Mailbox;
use crate::store::paths::TeamPaths;
use crate::store::record;

/// Team records under the coordination root.
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
    policy: LockPolicy,
}

impl Registry {
    pub fn open(root: &Path, policy: LockPolicy) -> Self {
        Self {
            root: root.to_path_buf(),
            policy,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn paths(&self, team: &str) -> TeamPaths {
        TeamPaths::new(&self.root, team)
    }

    fn mailbox(&self, team: &str) -> Mailbox {
        Mailbox::open(&self.root, team, self.policy)
    }

    pub fn exists(&self, team: &str) -> bool {
        validate_name(team).is_ok() && self.paths(team).config().is_file()
    }

    /// Create a team with its directories and an empty inbox per member.
    pub fn create(&self, team: &str, members: &[String]) -> Result<TeamConfig> {
        validate_name(team)?;
        for member in members {
            validate_name(member)?;
        }
        let paths = self.paths(team);
        fs::create_dir_all(paths.dir())?;

        let config = lock::with_lock(&paths.config_lock(), LockMode::Exclusive, self.policy, || {
            if paths.config().exists() {
                return Err(TeamsError::TeamExists(team.into()));
            }
            // Without a config nothing under the directory belongs to a live
            // team; a late append after delete can leave inboxes behind.
            remove_dir_if_exists(&paths.inboxes_dir())?;
            remove_dir_if_exists(&paths.tasks_dir())?;
            fs::create_dir_all(paths.inboxes_dir())?;
            fs::create_dir_all(paths.tasks_dir())?;

            let mut unique: Vec<String> = Vec::with_capacity(members.len());
            for member in members {
                if !unique.contains(member) {
                    unique.push(member.clone());
                }
            }
            let config = TeamConfig {
                name: team.into(),
                members: unique,
                created: Utc::now(),
            };
            record::write_atomic(&paths.config(), &config)?;
            Ok(config)
        })?;

        let mailbox = self.mailbox(team);
        for member in &config.members {
            mailbox.create_empty(member)?;
        }
        tracing::info!(team, members = config.members.len(), "team created");
        Ok(config)
    }

    /// Remove a team and everything it owns. Returns false if it did not exist.
    pub fn delete(&self, team: &str) -> Result<bool> {
        validate_name(team)?;
        let dir = self.paths(team).dir().to_path_buf();
        if !dir.is_dir() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)?;
        tracing::info!(team, "team deleted");
        Ok(true)
    }

    /// Every team with a config, sorted by name.
    pub fn list(&self) -> Result<Vec<TeamConfig>> {
        if !self.root.is_dir() {
            return Ok(vec![]);
        }
        let mut teams = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let config_path = entry.path().join("config.json");
            if let Some(config) = record::read_record::<TeamConfig>(&config_path)? {
                teams.push(config);
            }
        }
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    pub fn info(&self, team: &str) -> Result<TeamConfig> {
        validate_name(team)?;
        record::read_record(&self.paths(team).config())?
            .ok_or_else(|| TeamsError::TeamNotFound(team.into()))
    }

    pub fn members(&self, team: &str) -> Result<Vec<String>> {
        Ok(self.info(team)?.members)
    }

    /// Add `name` to the team (idempotent) and make sure it has an inbox.
    pub fn add_member(&self, team: &str, name: &str) -> Result<TeamConfig> {
        validate_name(name)?;
        let config = self.update(team, |config| {
            if !config.has_member(name) {
                config.members.push(name.into());
            }
            Ok(())
        })?;
        self.mailbox(team).create_empty(name)?;
        tracing::info!(team, member = name, "member added");
        Ok(config)
    }

    /// Remove `name` from the team and delete its inbox and cursor.
    pub fn remove_member(&self, team: &str, name: &str) -> Result<TeamConfig> {
        validate_name(name)?;
        let config = self.update(team, |config| {
            if !config.has_member(name) {
                return Err(TeamsError::MemberNotFound(name.into(), team.into()));
            }
            config.members.retain(|m| m != name);
            Ok(())
        })?;
        self.mailbox(team).remove(name)?;
        tracing::info!(team, member = name, "member removed");
        Ok(config)
    }

    fn update<F>(&self, team: &str, mutate: F) -> Result<TeamConfig>
    where
        F: FnOnce(&mut TeamConfig) -> Result<()>,
    {
        validate_name(team)?;
        let paths = self.paths(team);
        if !paths.config().is_file() {
            return Err(TeamsError::TeamNotFound(team.into()));
        }
        lock::with_lock(&paths.config_lock(), LockMode::Exclusive, self.policy, || {
            let mut config: TeamConfig = record::read_record(&paths.config())?
                .ok_or_else(|| TeamsError::TeamNotFound(team.into()))?;
            mutate(&mut config)?;
            record::write_atomic(&paths.config(), &config)?;
            Ok(config)
        })
    }
}

fn remove_dir_if_exists(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
