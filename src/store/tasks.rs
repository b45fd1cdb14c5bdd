use std::fs;
use std::path::Path;

use chrono::Utc;

use crate::error::{Result, TeamsError};
use crate::model::{Task, TaskStatus};
use crate::store::lock::{self, LockMode, LockPolicy};
use crate::store::paths::TeamPaths;
use crate::store::record;

/// One team's task collection: a JSON file per task under `tasks/`.
///
/// Every operation runs under the team-wide `tasks/.lock`, so the
/// read-check-write of `claim` is atomic across processes and exactly one of
/// any number of concurrent claimants wins.
#[derive(Debug, Clone)]
pub struct TaskStore {
    paths: TeamPaths,
    policy: LockPolicy,
}

impl TaskStore {
    pub fn open(root: &Path, team: &str, policy: LockPolicy) -> Self {
        Self {
            paths: TeamPaths::new(root, team),
            policy,
        }
    }

    /// Create a pending task with the next sequential id.
    pub fn create(
        &self,
        subject: &str,
        description: &str,
        assigned_to: Option<&str>,
        assigned_by: Option<&str>,
    ) -> Result<Task> {
        self.exclusive(|| {
            let id = match self.list_ids()?.last() {
                Some(max) => max.checked_add(1).ok_or_else(|| {
                    TeamsError::Validation(format!("task id space exhausted after {max}"))
                })?,
                None => 1,
            };
            let task = Task::new(
                id.to_string(),
                subject.into(),
                description.into(),
                assigned_to.map(str::to_string),
                assigned_by.map(str::to_string),
            );
            record::write_atomic(&self.paths.task(id), &task)?;
            tracing::info!(task = %task.id, subject, "task created");
            Ok(task)
        })
    }

    /// Move a pending task to in_progress, owned by `agent`.
    pub fn claim(&self, task_id: &str, agent: &str) -> Result<Task> {
        self.transition(task_id, TaskStatus::Pending, "claim", |task| {
            task.status = TaskStatus::InProgress;
            task.assigned_to = Some(agent.into());
            task.claimed_at = Some(Utc::now());
        })
        .inspect(|task| tracing::info!(task = %task.id, agent, "task claimed"))
    }

    /// Move an in_progress task to completed. Any agent may complete it.
    pub fn complete(&self, task_id: &str, agent: &str, result: Option<&str>) -> Result<Task> {
        self.transition(task_id, TaskStatus::InProgress, "complete", |task| {
            task.status = TaskStatus::Completed;
            task.completed_at = Some(Utc::now());
            task.result = Some(result.unwrap_or_default().to_string());
        })
        .inspect(|task| tracing::info!(task = %task.id, agent, "task completed"))
    }

    pub fn get(&self, task_id: &str) -> Result<Task> {
        let id = parse_task_id(task_id)?;
        self.shared(|| self.read(id))
    }

    /// All tasks in ascending id order, optionally filtered by status.
    pub fn list(&self, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        if !self.paths.tasks_dir().is_dir() {
            return Ok(vec![]);
        }
        self.shared(|| {
            let mut tasks = Vec::new();
            for id in self.list_ids()? {
                let task = self.read(id)?;
                if status.is_none_or(|s| task.status == s) {
                    tasks.push(task);
                }
            }
            Ok(tasks)
        })
    }

    fn transition<F>(
        &self,
        task_id: &str,
        required: TaskStatus,
        action: &'static str,
        apply: F,
    ) -> Result<Task>
    where
        F: FnOnce(&mut Task),
    {
        let id = parse_task_id(task_id)?;
        self.exclusive(|| {
            let mut task = self.read(id)?;
            if task.status != required {
                return Err(TeamsError::Conflict {
                    id: task.id,
                    status: task.status.to_string(),
                    action,
                });
            }
            apply(&mut task);
            record::write_atomic(&self.paths.task(id), &task)?;
            Ok(task)
        })
    }

    fn read(&self, id: u64) -> Result<Task> {
        record::read_record(&self.paths.task(id))?
            .ok_or_else(|| TeamsError::TaskNotFound(id.to_string()))
    }

    fn list_ids(&self) -> Result<Vec<u64>> {
        let dir = self.paths.tasks_dir();
        if !dir.is_dir() {
            return Ok(vec![]);
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".json")
                && let Ok(id) = parse_task_id(stem)
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    fn exclusive<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        lock::with_lock(&self.paths.tasks_lock(), LockMode::Exclusive, self.policy, f)
    }

    fn shared<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        lock::with_lock(&self.paths.tasks_lock(), LockMode::Shared, self.policy, f)
    }
}

/// Task ids are canonical positive decimals; anything else cannot name a
/// stored task.
fn parse_task_id(input: &str) -> Result<u64> {
    input
        .parse::<u64>()
        .ok()
        .filter(|&n| n > 0 && n.to_string() == input)
        .ok_or_else(|| TeamsError::TaskNotFound(input.into()))
}
