//! Mailboxes and task coordination for teams of agent processes, built on
//! plain files and advisory locks.
//!
//! Every agent is addressed as `name@team`. Messages are appended to the
//! recipient's inbox and delivered once by [`facade::Coordinator::poll`];
//! tasks move `pending -> in_progress -> completed` and exactly one claimant
//! wins a concurrent claim, across processes.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod facade;
pub mod identity;
pub mod model;
pub mod output;
pub mod store;

pub use config::Config;
pub use error::{Result, TeamsError};
pub use facade::Coordinator;
