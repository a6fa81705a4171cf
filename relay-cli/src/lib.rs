//! # relay-cli
//!
//! Argument parsing and the read-only reports (`stats`, `jobs`) the binary prints.

pub mod cli;

pub use cli::{format_jobs, format_stats, Cli, Commands};
pub use relay_telegram::AppConfig;
