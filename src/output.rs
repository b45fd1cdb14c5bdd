use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Message, Task, TaskStatus, TeamConfig};

/// How command results are printed on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
}

/// Rendering of `poll` results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PollFormat {
    /// `<teammate-message>` blocks, suitable for injecting into a prompt
    #[default]
    Xml,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Render polled messages. An empty poll renders as `""` (xml) or `[]`
/// (json).
pub fn render_poll(team: &str, messages: &[Message], format: PollFormat) -> Result<String> {
    match format {
        PollFormat::Json => Ok(serde_json::to_string_pretty(messages)?),
        PollFormat::Xml => Ok(messages
            .iter()
            .map(|m| render_xml_message(team, m))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn render_xml_message(team: &str, msg: &Message) -> String {
    format!(
        "<teammate-message from=\"{}\" team=\"{}\" type=\"{}\" timestamp=\"{}\">\n{}\n</teammate-message>",
        escape_attr(&msg.from),
        escape_attr(team),
        escape_attr(&msg.msg_type),
        msg.timestamp.to_rfc3339(),
        msg.text,
    )
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn print_task(task: &Task, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(task)?,
        Format::Pretty => {
            println!(
                "{} {} ({})",
                format!("[{}]", task.id).cyan().bold(),
                task.subject,
                status_label(task.status)
            );
            if !task.description.is_empty() {
                println!("  {}", task.description);
            }
            if let Some(ref assignee) = task.assigned_to {
                println!("  {} {}", "assigned to:".dimmed(), assignee);
            }
            if let Some(ref by) = task.assigned_by {
                println!("  {} {}", "assigned by:".dimmed(), by);
            }
            if let Some(ref result) = task.result {
                println!("  {} {}", "result:".dimmed(), result);
            }
        }
    }
    Ok(())
}

pub fn print_tasks(tasks: &[Task], format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(tasks)?,
        Format::Pretty => {
            if tasks.is_empty() {
                println!("{}", "No tasks.".dimmed());
            }
            for task in tasks {
                print_task(task, Format::Pretty)?;
            }
        }
    }
    Ok(())
}

fn status_label(status: TaskStatus) -> colored::ColoredString {
    match status {
        TaskStatus::Pending => status.to_string().yellow(),
        TaskStatus::InProgress => status.to_string().blue(),
        TaskStatus::Completed => status.to_string().green(),
    }
}

pub fn print_message(msg: &Message, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(msg)?,
        Format::Pretty => println!("Sent to '{}': {}", msg.to.cyan(), msg.text),
    }
    Ok(())
}

pub fn print_messages(msgs: &[Message], format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(msgs)?,
        Format::Pretty => {
            if msgs.is_empty() {
                println!("{}", "No messages.".dimmed());
            }
            for m in msgs {
                println!(
                    "{} {} {} {}",
                    format!("[{}]", m.id).dimmed(),
                    format!("{}:", m.from).cyan(),
                    format!("({})", m.msg_type).dimmed(),
                    m.text,
                );
            }
        }
    }
    Ok(())
}

pub fn print_team(team: &TeamConfig, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(team)?,
        Format::Pretty => {
            println!("{}", team.name.cyan().bold());
            println!("  {} {}", "created:".dimmed(), team.created.to_rfc3339());
            if team.members.is_empty() {
                println!("  {}", "no members".dimmed());
            } else {
                println!("  {} {}", "members:".dimmed(), team.members.join(", "));
            }
        }
    }
    Ok(())
}

pub fn print_teams(teams: &[TeamConfig], format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(teams)?,
        Format::Pretty => {
            if teams.is_empty() {
                println!("{}", "No teams.".dimmed());
            }
            for team in teams {
                print_team(team, Format::Pretty)?;
            }
        }
    }
    Ok(())
}
