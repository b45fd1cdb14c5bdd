use crate::error::Result;
use crate::facade::Coordinator;
use crate::model::TaskStatus;
use crate::output::{self, Format};

pub fn create(
    coord: &Coordinator,
    team: &str,
    subject: &str,
    description: &str,
    assign_to: Option<&str>,
    assign_by: Option<&str>,
    format: Format,
) -> Result<()> {
    let task = coord.create_task(team, subject, description, assign_to, assign_by)?;
    output::print_task(&task, format)
}

pub fn claim(coord: &Coordinator, team: &str, id: &str, agent: &str, format: Format) -> Result<()> {
    let task = coord.claim_task(team, id, agent)?;
    output::print_task(&task, format)
}

pub fn complete(
    coord: &Coordinator,
    team: &str,
    id: &str,
    agent: &str,
    result: Option<&str>,
    format: Format,
) -> Result<()> {
    let task = coord.complete_task(team, id, agent, result)?;
    output::print_task(&task, format)
}

pub fn list(
    coord: &Coordinator,
    team: &str,
    status: Option<TaskStatus>,
    format: Format,
) -> Result<()> {
    let tasks = coord.list_tasks(team, status)?;
    output::print_tasks(&tasks, format)
}

pub fn show(coord: &Coordinator, team: &str, id: &str, format: Format) -> Result<()> {
    let task = coord.get_task(team, id)?;
    output::print_task(&task, format)
}
