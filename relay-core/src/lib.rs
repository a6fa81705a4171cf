//! # relay-core
//!
//! Core types and traits shared by the relay crates: gateway messages, the [`Gateway`] and
//! [`Bot`] transports, the [`ProfileStore`] / [`JobStore`] data seams, the [`Handler`] trait
//! for the command router, errors, and tracing initialization.

pub mod bot;
pub mod error;
pub mod gateway;
pub mod logger;
pub mod store;
pub mod types;

pub use bot::{parse_message_id, Bot};
pub use error::{HandlerError, RelayError, Result};
pub use gateway::Gateway;
pub use logger::init_tracing;
pub use store::{JobOutcome, JobStore, NewJob, ProfileStore};
pub use types::{
    ChatRef, ForwardTally, Handler, HandlerResponse, InboundMessage, JobStatus, Media, Message,
    ToInbound, UserId, UserProfile,
};
