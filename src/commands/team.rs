use colored::Colorize;

use crate::error::Result;
use crate::facade::Coordinator;
use crate::output::{self, Format};

pub fn create(coord: &Coordinator, team: &str, members: &[String], format: Format) -> Result<()> {
    let config = coord.create_team(team, members)?;
    output::print_team(&config, format)
}

pub fn delete(coord: &Coordinator, team: &str, format: Format) -> Result<()> {
    let deleted = coord.delete_team(team)?;
    match format {
        Format::Json => output::print_json(&serde_json::json!({ "deleted": deleted }))?,
        Format::Pretty if deleted => println!("Deleted team '{}'", team.cyan()),
        Format::Pretty => println!("{}", format!("No team named '{team}'").dimmed()),
    }
    Ok(())
}

pub fn list(coord: &Coordinator, format: Format) -> Result<()> {
    let teams = coord.list_teams()?;
    output::print_teams(&teams, format)
}

pub fn info(coord: &Coordinator, team: &str, format: Format) -> Result<()> {
    let config = coord.team_info(team)?;
    output::print_team(&config, format)
}

pub fn add_member(coord: &Coordinator, team: &str, name: &str, format: Format) -> Result<()> {
    let config = coord.add_member(team, name)?;
    output::print_team(&config, format)
}

pub fn remove_member(coord: &Coordinator, team: &str, name: &str, format: Format) -> Result<()> {
    let config = coord.remove_member(team, name)?;
    output::print_team(&config, format)
}
