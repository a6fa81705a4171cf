//! Progress reporting from the drivers to whoever started the job.

use async_trait::async_trait;
use relay_core::ForwardTally;

/// Receives human-readable status lines and live forward tallies.
///
/// Implementations must not fail the job: delivery problems are theirs to log.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn status(&self, line: &str);

    async fn tally(&self, _tally: ForwardTally) {}
}

/// Discards everything.
pub struct NoProgress;

#[async_trait]
impl ProgressSink for NoProgress {
    async fn status(&self, _line: &str) {}
}
