pub mod mail;
pub mod task;
pub mod team;
