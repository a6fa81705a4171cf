//! # relay-driver
//!
//! Drives scripted free-text conversations with two external bots through one shared
//! [`relay_core::Gateway`] identity.
//!
//! ## Modules
//!
//! - [`wait`] – Cursor and the wait-for-reply polling primitive
//! - [`classifier`] – Named message predicates and keyword lists
//! - [`resolver`] – Course name → numeric selector
//! - [`script`] – Step descriptors and the conversation runner
//! - [`extraction`] – Extractor bot dialog, produces the `.txt` index
//! - [`upload`] – Uploader bot preamble
//! - [`monitor`] – Monitor-forward loop
//! - [`registry`] / [`chat_locks`] – Per-user single-flight and per-bot serialization
//! - [`coordinator`] – Job admission, execution and bookkeeping

pub mod chat_locks;
pub mod classifier;
pub mod coordinator;
pub mod error;
pub mod extraction;
pub mod monitor;
pub mod progress;
pub mod registry;
pub mod resolver;
pub mod script;
pub mod upload;
pub mod wait;

pub use chat_locks::ChatLocks;
pub use classifier::Classifier;
pub use coordinator::{job_dir, DriverConfig, JobCoordinator, JobFailure, JobReport, Submission};
pub use error::{DriverError, DriverResult, Phase, SubmitError};
pub use extraction::{artifact_path, run_extraction, ExtractionRequest};
pub use monitor::{monitor_and_forward, MonitorEnd, MonitorReport, MonitorSettings};
pub use progress::{NoProgress, ProgressSink};
pub use registry::{ActiveJobGuard, ActiveJobs};
pub use resolver::resolve_batch;
pub use script::{Action, Conversation, Expect, Step, Strictness};
pub use upload::{preamble, run_upload, UploadRequest};
pub use wait::{wait_for_reply, Cursor, PollSettings};
