//! Extraction driver: talks the extractor bot into producing the `.txt` course index.

use crate::classifier;
use crate::error::{DriverError, DriverResult, Phase};
use crate::progress::ProgressSink;
use crate::resolver::resolve_batch;
use crate::script::{Action, Conversation, Step, Strictness};
use lazy_static::lazy_static;
use regex::Regex;
use relay_core::{ChatRef, Gateway};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Label of the course-provider button on the extractor bot's start menu.
pub const PROVIDER_LABEL: &str = "Physics Wallah";
/// Fixed answer to the "what to extract" prompt.
pub const LISTING_CHOICE: &str = "2";

const LISTING_EXCERPT_CHARS: usize = 400;
const SAFE_NAME_CHARS: usize = 25;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"\W").expect("non-word pattern");
}

pub struct ExtractionRequest<'a> {
    pub bot: &'a ChatRef,
    pub token: &'a str,
    pub course: &'a str,
    pub download_dir: &'a Path,
}

/// Where the index file for `course` is stored: `<dir>/ext_<safe>.txt`.
pub fn artifact_path(download_dir: &Path, course: &str) -> PathBuf {
    let head: String = course.chars().take(SAFE_NAME_CHARS).collect();
    let safe = NON_WORD.replace_all(&head, "_");
    download_dir.join(format!("ext_{}.txt", safe))
}

fn excerpt(text: &str) -> String {
    text.chars().take(LISTING_EXCERPT_CHARS).collect()
}

/// Runs the whole extraction dialog and returns the path of the downloaded index file.
#[instrument(skip(gateway, request, progress), fields(bot = %request.bot, course = %request.course))]
pub async fn run_extraction(
    gateway: &dyn Gateway,
    request: &ExtractionRequest<'_>,
    progress: &dyn ProgressSink,
) -> DriverResult<PathBuf> {
    let mut convo =
        Conversation::open(gateway, request.bot.clone(), Phase::Extraction, progress).await?;

    let menu = convo
        .reply_to(
            Step::send("start", "/start")
                .status(format!("/start → {}", request.bot))
                .settle_secs(4)
                .expect(classifier::start_menu(), 25, Strictness::Strict),
        )
        .await?;

    convo
        .run_step(
            Step::new(
                "choose provider",
                Action::InvokeOrSend {
                    message: menu,
                    label: PROVIDER_LABEL.to_string(),
                },
            )
            .status(format!("Selecting '{}'", PROVIDER_LABEL))
            .settle_secs(3)
            .expect(classifier::token_prompt(), 20, Strictness::Lenient),
        )
        .await?;

    let listing = convo
        .reply_to(
            Step::send("send token", request.token)
                .status("Sending access token, waiting for course list")
                .settle_secs(3)
                .expect(classifier::course_listing(), 150, Strictness::Strict),
        )
        .await?;
    let listing = listing.body().to_string();

    if classifier::listing_reports_error(&listing) {
        info!("Extractor bot rejected the access token");
        return Err(DriverError::TokenExpired);
    }

    progress
        .status(&format!("Finding course number for: {}", request.course))
        .await;
    let selector =
        resolve_batch(&listing, request.course).ok_or_else(|| DriverError::CourseNotFound {
            course: request.course.to_string(),
            listing_excerpt: excerpt(&listing),
        })?;

    convo
        .run_step(
            Step::send("select course", selector.clone())
                .status(format!("Sending course number: {}", selector))
                .settle_secs(4)
                .expect(classifier::choice_prompt(), 75, Strictness::Lenient),
        )
        .await?;

    let file = convo
        .reply_to(
            Step::send("choose listing", LISTING_CHOICE)
                .status(format!("Sending choice '{}', waiting for .txt file", LISTING_CHOICE))
                .settle_secs(5)
                .expect(classifier::file_with_extension(".txt"), 250, Strictness::Strict),
        )
        .await?;

    progress.status("Downloading .txt file").await;
    tokio::fs::create_dir_all(request.download_dir)
        .await
        .map_err(relay_core::RelayError::from)?;
    let destination = artifact_path(request.download_dir, request.course);
    let stored = gateway.download(convo.chat(), &file, &destination).await?;

    info!(path = %stored.display(), "Course index downloaded");
    progress.status(&format!("Saved: {}", stored.display())).await;
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_path_sanitizes_course() {
        let path = artifact_path(Path::new("/tmp"), "Arjuna JEE 2.0 (Hindi)");
        assert_eq!(path, PathBuf::from("/tmp/ext_Arjuna_JEE_2_0__Hindi_.txt"));
    }

    #[test]
    fn test_artifact_path_truncates_to_25_chars() {
        let path = artifact_path(Path::new("/data"), "Lakshya NEET 2025 Complete Batch");
        assert_eq!(path, PathBuf::from("/data/ext_Lakshya_NEET_2025_Complet.txt"));
    }

    #[test]
    fn test_excerpt_is_char_bounded() {
        let long = "अ".repeat(500);
        assert_eq!(excerpt(&long).chars().count(), 400);
    }
}
