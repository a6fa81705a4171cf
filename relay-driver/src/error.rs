use relay_core::RelayError;
use std::fmt;
use thiserror::Error;

/// Which conversation a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extraction,
    Upload,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Extraction => f.write_str("extraction"),
            Phase::Upload => f.write_str("upload"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("{phase} step '{step}' timed out waiting for a reply")]
    StepTimeout { phase: Phase, step: &'static str },

    #[error("access token expired or rejected")]
    TokenExpired,

    #[error("course '{course}' not found. Available:\n{listing_excerpt}")]
    CourseNotFound {
        course: String,
        listing_excerpt: String,
    },

    #[error(transparent)]
    Relay(#[from] RelayError),
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Why a job could not be submitted.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("setup incomplete: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),

    #[error(transparent)]
    Relay(#[from] RelayError),
}
