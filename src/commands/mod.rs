//! CLI command implementations for proc-cache-inspector.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: System validation
//! - `config`: Configuration file generation
//! - `test`: One-shot sampling rounds

pub mod check;
pub mod config;
pub mod test;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use test::command_test;
