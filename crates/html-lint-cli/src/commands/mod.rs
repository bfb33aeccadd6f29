//! Subcommand implementations.

pub mod check;
pub mod dump;
pub mod list_rules;
pub mod output;
