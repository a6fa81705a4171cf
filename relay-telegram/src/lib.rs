//! # relay-telegram
//!
//! Operator-facing Telegram bot: users configure credentials, courses and channels, then
//! start extraction jobs whose progress is shown in a live status message.
//!
//! ## Modules
//!
//! - [`config`] – AppConfig from environment
//! - [`adapters`] / [`bot_adapter`] – teloxide ↔ relay_core
//! - [`bridge`] – HttpGateway, the userbot bridge client
//! - [`chain`] / [`handlers`] – command router
//! - [`access`] / [`conversation`] / [`commands`] – access policy, prompt state, parsing
//! - [`status_board`] – live job status message
//! - [`components`] / [`runner`] – assembly and REPL

pub mod access;
pub mod adapters;
pub mod bot_adapter;
pub mod bridge;
pub mod chain;
pub mod commands;
pub mod components;
pub mod config;
pub mod conversation;
pub mod handlers;
pub mod runner;
pub mod status_board;

pub use access::{Access, AccessPolicy};
pub use adapters::TelegramMessageWrapper;
pub use bot_adapter::TelegramBotAdapter;
pub use bridge::HttpGateway;
pub use chain::HandlerChain;
pub use components::{build_components, build_handler_chain, build_teloxide_bot, AppComponents};
pub use config::AppConfig;
pub use conversation::{Conversations, Pending};
pub use runner::{dispatch, run_bot, run_repl};
pub use status_board::StatusBoard;
