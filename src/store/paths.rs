use std::path::{Path, PathBuf};

/// On-disk layout of one team under the coordination root.
///
/// ```text
/// <root>/<team>/config.json
/// <root>/<team>/.config.lock
/// <root>/<team>/inboxes/<agent>.json
/// <root>/<team>/inboxes/.<agent>.cursor
/// <root>/<team>/inboxes/.<agent>.lock
/// <root>/<team>/tasks/<id>.json
/// <root>/<team>/tasks/.lock
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamPaths {
    dir: PathBuf,
}

impl TeamPaths {
    pub fn new(root: &Path, team: &str) -> Self {
        Self {
            dir: root.join(team),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> PathBuf {
        self.dir.join("config.json")
    }

    pub fn config_lock(&self) -> PathBuf {
        self.dir.join(".config.lock")
    }

    pub fn inboxes_dir(&self) -> PathBuf {
        self.dir.join("inboxes")
    }

    pub fn inbox(&self, agent: &str) -> PathBuf {
        self.inboxes_dir().join(format!("{agent}.json"))
    }

    pub fn cursor(&self, agent: &str) -> PathBuf {
        self.inboxes_dir().join(format!(".{agent}.cursor"))
    }

    pub fn inbox_lock(&self, agent: &str) -> PathBuf {
        self.inboxes_dir().join(format!(".{agent}.lock"))
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.dir.join("tasks")
    }

    pub fn task(&self, id: u64) -> PathBuf {
        self.tasks_dir().join(format!("{id}.json"))
    }

    pub fn tasks_lock(&self) -> PathBuf {
        self.tasks_dir().join(".lock")
    }
}
