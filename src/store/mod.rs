pub mod lock;
pub mod mailbox;
pub mod paths;
pub mod record;
pub mod registry;
pub mod tasks;
