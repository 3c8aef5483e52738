//! Chronos - daily and monthly task tracking with deadline reminders

pub mod alert;
pub mod cli;
pub mod config;
pub mod reminder;
pub mod sound;
pub mod store;
pub mod task;
