use colored::Colorize;

use crate::error::Result;
use crate::facade::Coordinator;
use crate::output::{self, Format, PollFormat};

pub fn send(
    coord: &Coordinator,
    from: &str,
    to: &str,
    text: &str,
    msg_type: &str,
    format: Format,
) -> Result<()> {
    let msg = coord.send(from, to, text, msg_type)?;
    output::print_message(&msg, format)
}

pub fn broadcast(
    coord: &Coordinator,
    from: &str,
    text: &str,
    msg_type: &str,
    format: Format,
) -> Result<()> {
    let msgs = coord.broadcast(from, text, msg_type)?;
    match format {
        Format::Json => output::print_json(&msgs)?,
        Format::Pretty => println!(
            "Broadcast to {} agents: {}",
            msgs.len().to_string().bold(),
            text
        ),
    }
    Ok(())
}

/// Print unseen messages and advance the cursor. Nothing is printed when an
/// xml poll finds no new messages.
pub fn poll(coord: &Coordinator, identity: &str, poll_format: PollFormat) -> Result<()> {
    let (agent, msgs) = coord.poll(identity)?;
    let rendered = output::render_poll(&agent.team, &msgs, poll_format)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

pub fn inbox(coord: &Coordinator, identity: &str, format: Format) -> Result<()> {
    let msgs = coord.read_inbox(identity)?;
    output::print_messages(&msgs, format)
}
