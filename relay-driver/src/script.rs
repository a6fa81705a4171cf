//! Declarative conversation steps and the runner that executes them against a gateway.
//!
//! A step is: report a status line, act (send text, upload a file, press a button), let the
//! external bot settle, then optionally wait for a reply. Strict waits abort on timeout;
//! lenient ones log and carry on.

use crate::classifier::Classifier;
use crate::error::{DriverError, DriverResult, Phase};
use crate::progress::ProgressSink;
use crate::wait::{wait_for_reply, Cursor, PollSettings};
use relay_core::{ChatRef, Gateway, Message};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Lenient,
}

#[derive(Debug, Clone)]
pub enum Action {
    Send(String),
    SendDocument(PathBuf),
    /// Press the button labelled `label` on `message`; send the label as text if that fails.
    InvokeOrSend { message: Message, label: String },
}

#[derive(Debug, Clone)]
pub struct Expect {
    pub classifier: Classifier,
    pub timeout: Duration,
    pub strictness: Strictness,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub name: &'static str,
    pub status: Option<String>,
    pub action: Action,
    pub settle: Duration,
    pub expect: Option<Expect>,
}

impl Step {
    pub fn new(name: &'static str, action: Action) -> Self {
        Self {
            name,
            status: None,
            action,
            settle: Duration::ZERO,
            expect: None,
        }
    }

    pub fn send(name: &'static str, text: impl Into<String>) -> Self {
        Self::new(name, Action::Send(text.into()))
    }

    pub fn status(mut self, line: impl Into<String>) -> Self {
        self.status = Some(line.into());
        self
    }

    pub fn settle_secs(mut self, secs: u64) -> Self {
        self.settle = Duration::from_secs(secs);
        self
    }

    pub fn expect(mut self, classifier: Classifier, timeout_secs: u64, strictness: Strictness) -> Self {
        self.expect = Some(Expect {
            classifier,
            timeout: Duration::from_secs(timeout_secs),
            strictness,
        });
        self
    }
}

/// One scripted dialog with one external bot. Owns the cursor for that chat.
pub struct Conversation<'a> {
    gateway: &'a dyn Gateway,
    progress: &'a dyn ProgressSink,
    phase: Phase,
    cursor: Cursor,
    poll: PollSettings,
}

impl<'a> Conversation<'a> {
    /// Opens a conversation with the cursor at the chat's newest message.
    pub async fn open(
        gateway: &'a dyn Gateway,
        chat: ChatRef,
        phase: Phase,
        progress: &'a dyn ProgressSink,
    ) -> DriverResult<Self> {
        let cursor = Cursor::at_latest(gateway, chat).await?;
        Ok(Self {
            gateway,
            progress,
            phase,
            cursor,
            poll: PollSettings::default(),
        })
    }

    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn chat(&self) -> &ChatRef {
        self.cursor.chat()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn into_cursor(self) -> Cursor {
        self.cursor
    }

    pub fn progress(&self) -> &'a dyn ProgressSink {
        self.progress
    }

    /// Runs one step. Returns the accepted reply, or `None` when the step expects nothing or a
    /// lenient wait timed out.
    pub async fn run_step(&mut self, step: Step) -> DriverResult<Option<Message>> {
        if let Some(line) = &step.status {
            self.progress.status(line).await;
        }

        self.cursor.mark_latest(self.gateway).await?;
        self.perform(&step.action).await?;
        if !step.settle.is_zero() {
            sleep(step.settle).await;
        }

        let Some(expect) = step.expect else {
            return Ok(None);
        };

        let reply = wait_for_reply(
            self.gateway,
            &mut self.cursor,
            &expect.classifier,
            expect.timeout,
            self.poll,
        )
        .await?;

        match (reply, expect.strictness) {
            (Some(message), _) => Ok(Some(message)),
            (None, Strictness::Strict) => {
                warn!(
                    phase = %self.phase,
                    step = step.name,
                    chat = %self.cursor.chat(),
                    "Step timed out"
                );
                Err(DriverError::StepTimeout {
                    phase: self.phase,
                    step: step.name,
                })
            }
            (None, Strictness::Lenient) => {
                warn!(
                    phase = %self.phase,
                    step = step.name,
                    classifier = expect.classifier.name(),
                    "No reply before timeout, continuing"
                );
                Ok(None)
            }
        }
    }

    /// Runs a step whose reply the caller needs; a missing reply is a step timeout.
    pub async fn reply_to(&mut self, step: Step) -> DriverResult<Message> {
        let name = step.name;
        self.run_step(step)
            .await?
            .ok_or(DriverError::StepTimeout {
                phase: self.phase,
                step: name,
            })
    }

    pub async fn run_script(&mut self, steps: Vec<Step>) -> DriverResult<()> {
        for step in steps {
            self.run_step(step).await?;
        }
        Ok(())
    }

    async fn perform(&self, action: &Action) -> DriverResult<()> {
        let chat = self.cursor.chat();
        match action {
            Action::Send(text) => self.gateway.send(chat, text).await?,
            Action::SendDocument(path) => self.gateway.send_document(chat, path).await?,
            Action::InvokeOrSend { message, label } => {
                let clicked = match self.gateway.invoke_action(chat, message, label).await {
                    Ok(clicked) => clicked,
                    Err(e) => {
                        warn!(error = %e, label = %label, "Button press failed");
                        false
                    }
                };
                if clicked {
                    info!(chat = %chat, label = %label, "Button pressed");
                } else {
                    self.gateway.send(chat, label).await?;
                }
            }
        }
        Ok(())
    }
}
