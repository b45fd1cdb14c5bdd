use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands;
use crate::config::{Config, LOG_ENV};
use crate::error::{Result, TeamsError};
use crate::facade::Coordinator;
use crate::model::{BROADCAST_MESSAGE_TYPE, DEFAULT_MESSAGE_TYPE, TaskStatus};
use crate::output::{Format, PollFormat};

#[derive(Parser)]
#[command(
    name = "agent-teams",
    version,
    about = "File-based mailboxes and task coordination for agent teams"
)]
pub struct Cli {
    /// Coordination root directory (default: ~/.openclaw/teams)
    #[arg(long, global = true, env = "AGENT_TEAMS_ROOT")]
    root: Option<PathBuf>,
    /// Fail instead of waiting longer than this for a file lock
    #[arg(long, global = true, env = "AGENT_TEAMS_LOCK_TIMEOUT_MS")]
    lock_timeout_ms: Option<u64>,
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    output: Format,
    /// Shorthand for --output pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    /// Shorthand for --output json
    #[arg(long, global = true, conflicts_with = "pretty")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a team
    Create {
        /// Team name
        team: String,
        /// Initial members (space- or comma-separated)
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        members: Vec<String>,
    },
    /// Delete a team and everything it owns
    Delete {
        team: String,
    },
    /// List teams
    List,
    /// Show a team's record
    Info {
        team: String,
    },
    /// Add a member to a team
    AddMember {
        team: String,
        name: String,
    },
    /// Remove a member and its inbox
    RemoveMember {
        team: String,
        name: String,
    },
    /// Send a message to a teammate
    Send {
        /// sender@team
        sender: String,
        /// recipient@team
        recipient: String,
        /// Message text
        #[arg(long, short)]
        text: String,
        /// Message type
        #[arg(long = "type", default_value = DEFAULT_MESSAGE_TYPE)]
        msg_type: String,
    },
    /// Send a message to every other member of the team
    Broadcast {
        /// sender@team
        sender: String,
        /// Message text
        #[arg(long, short)]
        text: String,
        /// Message type
        #[arg(long = "type", default_value = BROADCAST_MESSAGE_TYPE)]
        msg_type: String,
    },
    /// Print messages received since the last poll
    Poll {
        /// agent@team
        identity: String,
        /// Rendering of the polled messages
        #[arg(long, value_enum, default_value = "xml")]
        format: PollFormat,
    },
    /// Print the full inbox without advancing the poll cursor
    Inbox {
        /// agent@team
        identity: String,
    },
    /// Create a task
    TaskCreate {
        team: String,
        /// Short subject line
        #[arg(long, short)]
        subject: String,
        /// Longer description
        #[arg(long, short, default_value = "")]
        description: String,
        /// Pre-assign to this member (notifies them when --assign-by is set)
        #[arg(long)]
        assign_to: Option<String>,
        /// Who is assigning the task
        #[arg(long)]
        assign_by: Option<String>,
    },
    /// Claim a pending task
    TaskClaim {
        team: String,
        task_id: String,
        agent: String,
    },
    /// Complete an in-progress task
    TaskComplete {
        team: String,
        task_id: String,
        agent: String,
        /// Result summary
        #[arg(long, short)]
        result: Option<String>,
    },
    /// List tasks
    TaskList {
        team: String,
        /// Filter by status
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
    },
    /// Show one task
    TaskShow {
        team: String,
        task_id: String,
    },
}

impl Cli {
    fn format(&self) -> Format {
        if self.json {
            Format::Json
        } else if self.pretty {
            Format::Pretty
        } else {
            self.output
        }
    }
}

/// Install the stderr log subscriber. Filtered by `$AGENT_TEAMS_LOG`,
/// default `warn`, so stdout carries only command output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli, format: Format) -> Result<()> {
    let config = Config::resolve(cli.root, cli.lock_timeout_ms)?;
    let coord = Coordinator::new(config);

    match cli.command {
        Commands::Create { team, members } => {
            commands::team::create(&coord, &team, &members, format)
        }
        Commands::Delete { team } => commands::team::delete(&coord, &team, format),
        Commands::List => commands::team::list(&coord, format),
        Commands::Info { team } => commands::team::info(&coord, &team, format),
        Commands::AddMember { team, name } => {
            commands::team::add_member(&coord, &team, &name, format)
        }
        Commands::RemoveMember { team, name } => {
            commands::team::remove_member(&coord, &team, &name, format)
        }
        Commands::Send {
            sender,
            recipient,
            text,
            msg_type,
        } => commands::mail::send(&coord, &sender, &recipient, &text, &msg_type, format),
        Commands::Broadcast {
            sender,
            text,
            msg_type,
        } => commands::mail::broadcast(&coord, &sender, &text, &msg_type, format),
        Commands::Poll {
            identity,
            format: poll_format,
        } => commands::mail::poll(&coord, &identity, poll_format),
        Commands::Inbox { identity } => commands::mail::inbox(&coord, &identity, format),
        Commands::TaskCreate {
            team,
            subject,
            description,
            assign_to,
            assign_by,
        } => commands::task::create(
            &coord,
            &team,
            &subject,
            &description,
            assign_to.as_deref(),
            assign_by.as_deref(),
            format,
        ),
        Commands::TaskClaim {
            team,
            task_id,
            agent,
        } => commands::task::claim(&coord, &team, &task_id, &agent, format),
        Commands::TaskComplete {
            team,
            task_id,
            agent,
            result,
        } => commands::task::complete(&coord, &team, &task_id, &agent, result.as_deref(), format),
        Commands::TaskList { team, status } => commands::task::list(&coord, &team, status, format),
        Commands::TaskShow { team, task_id } => {
            commands::task::show(&coord, &team, &task_id, format)
        }
    }
}

pub fn report_error(err: &TeamsError, format: Format) {
    match format {
        Format::Json => eprintln!(
            "{}",
            serde_json::json!({
                "error": err.to_string(),
                "code": err.code(),
            })
        ),
        Format::Pretty => eprintln!("error: {err}"),
    }
}

/// Parse arguments, run the command and return the process exit code.
pub fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_tracing();
    let format = cli.format();
    match run(cli, format) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err, format);
            1
        }
    }
}
