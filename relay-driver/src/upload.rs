//! Upload driver: the nine-step preamble with the uploader bot, then the monitor loop.

use crate::classifier;
use crate::error::{DriverResult, Phase};
use crate::monitor::{monitor_and_forward, MonitorReport, MonitorSettings};
use crate::progress::ProgressSink;
use crate::script::{Action, Conversation, Step, Strictness};
use relay_core::{ChatRef, Gateway};
use std::path::Path;
use tracing::{info, instrument};

pub const START_INDEX: &str = "1";
pub const QUALITY: &str = "480";
pub const THUMBNAIL: &str = "no";

pub struct UploadRequest<'a> {
    pub bot: &'a ChatRef,
    /// Secret command that switches the uploader bot into upload mode.
    pub command: &'a str,
    pub artifact: &'a Path,
    pub course: &'a str,
    pub credit: &'a str,
    pub token: &'a str,
    pub channels: &'a [ChatRef],
}

/// Steps answering the uploader bot's questions. The first two waits are strict; the rest only
/// log a timeout and send the scripted answer anyway.
pub fn preamble(request: &UploadRequest<'_>) -> Vec<Step> {
    vec![
        Step::send("start", "/start")
            .status(format!("/start → {}", request.bot))
            .settle_secs(4),
        Step::send("activate", request.command)
            .status(format!("Sending command: {}", request.command))
            .settle_secs(10)
            .expect(classifier::file_prompt(), 30, Strictness::Strict),
        Step::new("send file", Action::SendDocument(request.artifact.to_path_buf()))
            .status("Sending .txt file")
            .settle_secs(10)
            .expect(classifier::start_index_prompt(), 30, Strictness::Strict),
        Step::send("start index", START_INDEX)
            .status(format!("Start index → {}", START_INDEX))
            .settle_secs(10)
            .expect(classifier::course_name_prompt(), 40, Strictness::Lenient),
        Step::send("course name", request.course)
            .status(format!("Course name → {}", request.course))
            .settle_secs(10)
            .expect(classifier::quality_prompt(), 40, Strictness::Lenient),
        Step::send("quality", QUALITY)
            .status(format!("Resolution → {}", QUALITY))
            .settle_secs(10)
            .expect(classifier::credit_prompt(), 40, Strictness::Lenient),
        Step::send("credit", request.credit)
            .status(format!("Credit → {}", request.credit))
            .settle_secs(10)
            .expect(classifier::token_request(), 40, Strictness::Lenient),
        Step::send("token", request.token)
            .status("Sending access token")
            .settle_secs(10)
            .expect(classifier::thumbnail_prompt(), 40, Strictness::Lenient),
        Step::send("thumbnail", THUMBNAIL)
            .status(format!("Thumbnail → {}", THUMBNAIL))
            .settle_secs(5),
    ]
}

/// Runs the preamble and then forwards the bot's output until it finishes or the deadline passes.
#[instrument(skip(gateway, request, monitor, progress), fields(bot = %request.bot, course = %request.course))]
pub async fn run_upload(
    gateway: &dyn Gateway,
    request: &UploadRequest<'_>,
    monitor: MonitorSettings,
    progress: &dyn ProgressSink,
) -> DriverResult<MonitorReport> {
    let mut convo =
        Conversation::open(gateway, request.bot.clone(), Phase::Upload, progress).await?;
    convo.run_script(preamble(request)).await?;

    info!(channels = request.channels.len(), "Preamble finished, monitoring output");
    progress
        .status("Bot processing, forwarding files as they arrive")
        .await;

    Ok(monitor_and_forward(
        gateway,
        convo.into_cursor(),
        request.channels,
        monitor,
        progress,
    )
    .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_preamble_shape() {
        let bot = ChatRef::new("@uploader");
        let artifact = PathBuf::from("/tmp/ext_a.txt");
        let request = UploadRequest {
            bot: &bot,
            command: "/upload",
            artifact: &artifact,
            course: "Arjuna",
            credit: "Team",
            token: "secret",
            channels: &[],
        };
        let steps = preamble(&request);
        assert_eq!(steps.len(), 9);

        let strict: Vec<&str> = steps
            .iter()
            .filter(|s| {
                s.expect
                    .as_ref()
                    .is_some_and(|e| e.strictness == Strictness::Strict)
            })
            .map(|s| s.name)
            .collect();
        assert_eq!(strict, vec!["activate", "send file"]);
        assert!(steps[0].expect.is_none());
        assert!(steps[8].expect.is_none());
        assert!(matches!(&steps[8].action, Action::Send(t) if t == THUMBNAIL));
    }
}
