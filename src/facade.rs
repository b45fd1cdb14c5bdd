use crate::config::Config;
use crate::error::{Result, TeamsError};
use crate::identity::{Identity, validate_name};
use crate::model::{Message, Task, TaskAssignment, TaskStatus, TeamConfig, TASK_ASSIGNMENT_TYPE};
use crate::store::mailbox::Mailbox;
use crate::store::registry::Registry;
use crate::store::tasks::TaskStore;

/// Entry point for callers: composes the registry, mailboxes and task stores
/// of every team under one coordination root.
#[derive(Debug, Clone)]
pub struct Coordinator {
    config: Config,
    registry: Registry,
}

impl Coordinator {
    pub fn new(config: Config) -> Self {
        let registry = Registry::open(&config.root, config.lock);
        Self { config, registry }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn mailbox(&self, team: &str) -> Mailbox {
        Mailbox::open(&self.config.root, team, self.config.lock)
    }

    pub fn tasks(&self, team: &str) -> TaskStore {
        TaskStore::open(&self.config.root, team, self.config.lock)
    }

    fn require_team(&self, team: &str) -> Result<()> {
        validate_name(team)?;
        if !self.registry.exists(team) {
            return Err(TeamsError::TeamNotFound(team.into()));
        }
        Ok(())
    }

    // -- registry -----------------------------------------------------------

    pub fn create_team(&self, team: &str, members: &[String]) -> Result<TeamConfig> {
        self.registry.create(team, members)
    }

    pub fn delete_team(&self, team: &str) -> Result<bool> {
        self.registry.delete(team)
    }

    pub fn list_teams(&self) -> Result<Vec<TeamConfig>> {
        self.registry.list()
    }

    pub fn team_info(&self, team: &str) -> Result<TeamConfig> {
        self.registry.info(team)
    }

    pub fn add_member(&self, team: &str, name: &str) -> Result<TeamConfig> {
        self.registry.add_member(team, name)
    }

    pub fn remove_member(&self, team: &str, name: &str) -> Result<TeamConfig> {
        self.registry.remove_member(team, name)
    }

    // -- messaging ----------------------------------------------------------

    /// Deliver one message between two members of the same team.
    pub fn send(&self, from: &str, to: &str, text: &str, msg_type: &str) -> Result<Message> {
        let sender = Identity::parse(from)?;
        let recipient = Identity::parse(to)?;
        if sender.team != recipient.team {
            return Err(TeamsError::CrossTeam(sender.to_string(), recipient.to_string()));
        }
        self.require_team(&recipient.team)?;

        let msg = Message::new(&sender.name, &recipient.name, msg_type, text);
        self.mailbox(&recipient.team).append(&recipient.name, &msg)?;
        Ok(msg)
    }

    /// Send `text` to every member of the sender's team except the sender.
    ///
    /// Each delivery is independent: if one append fails the error is
    /// returned and messages already delivered stay delivered.
    pub fn broadcast(&self, from: &str, text: &str, msg_type: &str) -> Result<Vec<Message>> {
        let sender = Identity::parse(from)?;
        let members = self.registry.members(&sender.team)?;
        let mailbox = self.mailbox(&sender.team);

        let mut delivered = Vec::new();
        for member in members.iter().filter(|m| **m != sender.name) {
            let msg = Message::new(&sender.name, member, msg_type, text);
            mailbox.append(member, &msg)?;
            delivered.push(msg);
        }
        tracing::debug!(from = %sender, recipients = delivered.len(), "broadcast delivered");
        Ok(delivered)
    }

    pub fn poll(&self, identity: &str) -> Result<(Identity, Vec<Message>)> {
        let agent = Identity::parse(identity)?;
        self.require_team(&agent.team)?;
        let messages = self.mailbox(&agent.team).poll(&agent.name)?;
        Ok((agent, messages))
    }

    pub fn read_inbox(&self, identity: &str) -> Result<Vec<Message>> {
        let agent = Identity::parse(identity)?;
        self.require_team(&agent.team)?;
        self.mailbox(&agent.team).read_all(&agent.name)
    }

    // -- tasks --------------------------------------------------------------

    /// Create a task. When both `assigned_to` and `assigned_by` are given the
    /// assignee is notified with a `task_assignment` message after the task is
    /// stored; a failed notification is logged and does not undo the task.
    pub fn create_task(
        &self,
        team: &str,
        subject: &str,
        description: &str,
        assigned_to: Option<&str>,
        assigned_by: Option<&str>,
    ) -> Result<Task> {
        self.require_team(team)?;
        let task = self
            .tasks(team)
            .create(subject, description, assigned_to, assigned_by)?;

        if let (Some(to), Some(by)) = (task.assigned_to.as_deref(), task.assigned_by.as_deref())
            && let Err(err) = self.notify_assignment(team, &task, to, by)
        {
            tracing::warn!(team, task = %task.id, assignee = to, %err, "assignment notification failed");
        }
        Ok(task)
    }

    fn notify_assignment(&self, team: &str, task: &Task, to: &str, by: &str) -> Result<Message> {
        let payload = serde_json::to_string(&TaskAssignment::for_task(task))?;
        self.send(
            &format!("{by}@{team}"),
            &format!("{to}@{team}"),
            &payload,
            TASK_ASSIGNMENT_TYPE,
        )
    }

    pub fn claim_task(&self, team: &str, task_id: &str, agent: &str) -> Result<Task> {
        self.require_team(team)?;
        self.tasks(team).claim(task_id, agent)
    }

    pub fn complete_task(
        &self,
        team: &str,
        task_id: &str,
        agent: &str,
        result: Option<&str>,
    ) -> Result<Task> {
        self.require_team(team)?;
        self.tasks(team).complete(task_id, agent, result)
    }

    pub fn get_task(&self, team: &str, task_id: &str) -> Result<Task> {
        self.require_team(team)?;
        self.tasks(team).get(task_id)
    }

    pub fn list_tasks(&self, team: &str, status: Option<TaskStatus>) -> Result<Vec<Task>> {
        self.require_team(team)?;
        self.tasks(team).list(status)
    }
}
