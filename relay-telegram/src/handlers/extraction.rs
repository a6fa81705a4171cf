//! `/StartExtraction`: pick a course, pick a channel, then hand the job to the coordinator
//! with a [`StatusBoard`] as its progress sink.

use super::{missing_text, numbered, parse_choice};
use crate::commands::known_command;
use crate::conversation::{Conversations, Pending};
use crate::status_board::{render_started, StatusBoard};
use async_trait::async_trait;
use relay_core::{Bot, ChatRef, Handler, HandlerResponse, InboundMessage, Result};
use relay_driver::{JobCoordinator, SubmitError, Submission};
use std::sync::Arc;
use storage::{ChannelRecord, SettingsRepository};
use tracing::{error, info};

const ALREADY_RUNNING: &str = "⚠️ Extraction already running! Wait for it to finish.";
const INVALID_CHOICE: &str = "❌ Invalid choice. Reply with a number from the list, or /cancel.";

pub struct ExtractionHandler {
    settings: Arc<SettingsRepository>,
    coordinator: JobCoordinator,
    conversations: Conversations,
    bot: Arc<dyn Bot>,
}

impl ExtractionHandler {
    pub fn new(
        settings: Arc<SettingsRepository>,
        coordinator: JobCoordinator,
        conversations: Conversations,
        bot: Arc<dyn Bot>,
    ) -> Self {
        Self {
            settings,
            coordinator,
            conversations,
            bot,
        }
    }

    async fn begin(&self, message: &InboundMessage) -> Result<String> {
        let user_id = message.user_id;
        if self.coordinator.is_active(user_id) {
            return Ok(ALREADY_RUNNING.to_string());
        }
        let missing = self.settings.missing_setup(user_id).await?;
        if !missing.is_empty() {
            return Ok(missing_text(&missing));
        }

        let batches = self.settings.batches(user_id).await?;
        self.conversations.set(user_id, Pending::SelectBatch);
        Ok(format!(
            "🚀 Start Extraction\n\nStep 1/2: Select Batch\n\n{}\n\nReply with the number.",
            numbered(&batches)
        ))
    }

    async fn select_batch(&self, message: &InboundMessage) -> Result<String> {
        let user_id = message.user_id;
        let batches = self.settings.batches(user_id).await?;
        let Some(index) = parse_choice(&message.text, batches.len()) else {
            return Ok(INVALID_CHOICE.to_string());
        };
        let course = batches[index].clone();

        let channels = self.settings.channels(user_id).await?;
        let labels: Vec<&str> = channels.iter().map(ChannelRecord::label).collect();
        let reply = format!(
            "✅ Batch: {}\n\nStep 2/2: Select Channel\n\n{}\n\nReply with the number.",
            course,
            numbered(&labels)
        );
        self.conversations
            .set(user_id, Pending::SelectChannel { course });
        Ok(reply)
    }

    /// Returns `None` once the job was handed over; the status message speaks from then on.
    async fn select_channel(
        &self,
        message: &InboundMessage,
        course: &str,
    ) -> Result<Option<String>> {
        let channels = self.settings.channels(message.user_id).await?;
        let Some(index) = parse_choice(&message.text, channels.len()) else {
            return Ok(Some(INVALID_CHOICE.to_string()));
        };
        self.conversations.clear(message.user_id);
        self.start_job(message, course, &channels[index]).await?;
        Ok(None)
    }

    async fn start_job(
        &self,
        message: &InboundMessage,
        course: &str,
        channel: &ChannelRecord,
    ) -> Result<()> {
        let status_id = self
            .bot
            .send_message_and_return_id(
                message.chat_id,
                &render_started(course, &channel.channel_id),
            )
            .await?;
        let board = Arc::new(StatusBoard::new(
            Arc::clone(&self.bot),
            message.chat_id,
            status_id,
            course,
            channel.channel_id.clone(),
        ));

        let submitted = self
            .coordinator
            .submit(
                message.user_id,
                course,
                &ChatRef::new(channel.channel_id.as_str()),
                board.clone(),
            )
            .await;

        match submitted {
            Ok(Submission::Accepted { job_id, handle }) => {
                info!(user_id = message.user_id, job_id = job_id, course = %course, "step: job handed to coordinator");
                tokio::spawn(async move {
                    match handle.await {
                        Ok(report) => board.finish(&report).await,
                        Err(e) => {
                            error!(error = %e, job_id = job_id, "Job task panicked");
                            board
                                .edit(&format!("❌ Unexpected Error\n\n{}\n\nContact admin.", e))
                                .await;
                        }
                    }
                });
            }
            Ok(Submission::Rejected) => board.edit(ALREADY_RUNNING).await,
            Err(SubmitError::Incomplete(missing)) => {
                let lines: Vec<String> = missing.iter().map(|m| format!("  • {}", m)).collect();
                board
                    .edit(&format!(
                        "⚠️ Setup incomplete:\n\n{}\n\nRun /status to see what is missing.",
                        lines.join("\n")
                    ))
                    .await;
            }
            Err(SubmitError::Relay(e)) => {
                error!(error = %e, user_id = message.user_id, "Job submission failed");
                board
                    .edit(&format!("❌ Could not start the job\n\n{}\n\nContact admin.", e))
                    .await;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Handler for ExtractionHandler {
    async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        if let Some(cmd) = known_command(&message.text) {
            if cmd.is("startextraction") {
                return Ok(HandlerResponse::Reply(self.begin(message).await?));
            }
            return Ok(HandlerResponse::Continue);
        }

        match self.conversations.get(message.user_id) {
            Some(Pending::SelectBatch) => {
                Ok(HandlerResponse::Reply(self.select_batch(message).await?))
            }
            Some(Pending::SelectChannel { course }) => {
                match self.select_channel(message, &course).await? {
                    Some(reply) => Ok(HandlerResponse::Reply(reply)),
                    None => Ok(HandlerResponse::Stop),
                }
            }
            _ => Ok(HandlerResponse::Continue),
        }
    }
}
