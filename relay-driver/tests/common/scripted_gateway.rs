//! Scripted in-memory [`relay_core::Gateway`] for driver tests.
//!
//! Each chat is a growing message log with ids handed out in order. Rules registered with
//! `on_text` / `on_document` / `on_click` fire once, appending the bot's replies right after the
//! driver's action, so the next poll sees them.

use async_trait::async_trait;
use relay_core::{ChatRef, Gateway, Media, Message, RelayError, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Trigger {
    Text(String),
    Document,
    Click(String),
}

struct Rule {
    chat: String,
    trigger: Trigger,
    replies: Vec<Message>,
}

struct State {
    next_id: i64,
    chats: HashMap<String, Vec<Message>>,
    rules: Vec<Rule>,
    sent: Vec<(String, String)>,
    documents: Vec<(String, PathBuf)>,
    /// Whether each uploaded file was still on disk when it was sent.
    documents_present: Vec<bool>,
    clicks: Vec<(String, String)>,
    copies: Vec<(i64, String)>,
    failing_channels: HashSet<String>,
    failing_fetches: usize,
    stalled_fetches: bool,
    panic_on_send: bool,
}

pub struct ScriptedGateway {
    state: Mutex<State>,
}

/// Incoming text message; the id is assigned when it lands in a chat.
pub fn text(body: &str) -> Message {
    Message::text(0, body)
}

pub fn menu(body: &str, buttons: &[&str]) -> Message {
    let mut message = Message::text(0, body);
    message.buttons = buttons.iter().map(|b| b.to_string()).collect();
    message
}

pub fn document(file_name: &str) -> Message {
    Message::with_media(
        0,
        Media::Document {
            file_name: Some(file_name.to_string()),
        },
    )
}

pub fn video() -> Message {
    Message::with_media(0, Media::Video)
}

pub fn photo() -> Message {
    Message::with_media(0, Media::Photo)
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                chats: HashMap::new(),
                rules: Vec::new(),
                sent: Vec::new(),
                documents: Vec::new(),
                documents_present: Vec::new(),
                clicks: Vec::new(),
                copies: Vec::new(),
                failing_channels: HashSet::new(),
                failing_fetches: 0,
                stalled_fetches: false,
                panic_on_send: false,
            }),
        }
    }

    fn add_rule(&self, chat: &str, trigger: Trigger, replies: Vec<Message>) {
        self.state.lock().unwrap().rules.push(Rule {
            chat: chat.to_string(),
            trigger,
            replies,
        });
    }

    pub fn on_text(&self, chat: &str, text: &str, replies: Vec<Message>) {
        self.add_rule(chat, Trigger::Text(text.to_string()), replies);
    }

    pub fn on_document(&self, chat: &str, replies: Vec<Message>) {
        self.add_rule(chat, Trigger::Document, replies);
    }

    pub fn on_click(&self, chat: &str, label: &str, replies: Vec<Message>) {
        self.add_rule(chat, Trigger::Click(label.to_string()), replies);
    }

    /// Appends a message to a chat and returns its id.
    pub fn push(&self, chat: &str, message: Message) -> i64 {
        let mut state = self.state.lock().unwrap();
        append(&mut state, chat, message)
    }

    pub fn fail_copies_to(&self, channel: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_channels
            .insert(channel.to_string());
    }

    pub fn fail_next_fetches(&self, count: usize) {
        self.state.lock().unwrap().failing_fetches = count;
    }

    /// Every later `fetch_recent` call never completes.
    pub fn stall_fetches(&self) {
        self.state.lock().unwrap().stalled_fetches = true;
    }

    /// Every later `send` panics.
    pub fn panic_on_send(&self) {
        self.state.lock().unwrap().panic_on_send = true;
    }

    pub fn sent_texts(&self, chat: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .filter(|(c, _)| c == chat)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn documents(&self) -> Vec<(String, PathBuf)> {
        self.state.lock().unwrap().documents.clone()
    }

    pub fn documents_present(&self) -> Vec<bool> {
        self.state.lock().unwrap().documents_present.clone()
    }

    pub fn clicks(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().clicks.clone()
    }

    /// Every copy attempt as (message id, destination), failed ones included.
    pub fn copies(&self) -> Vec<(i64, String)> {
        self.state.lock().unwrap().copies.clone()
    }

    fn fire(&self, chat: &str, trigger: Trigger) {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state
            .rules
            .iter()
            .position(|r| r.chat == chat && r.trigger == trigger)
        else {
            return;
        };
        let rule = state.rules.remove(index);
        for reply in rule.replies {
            append(&mut state, chat, reply);
        }
    }
}

fn append(state: &mut State, chat: &str, mut message: Message) -> i64 {
    state.next_id += 1;
    message.id = state.next_id;
    state
        .chats
        .entry(chat.to_string())
        .or_default()
        .push(message);
    state.next_id
}

fn outgoing(mut message: Message) -> Message {
    message.outgoing = true;
    message
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn send(&self, chat: &ChatRef, text: &str) -> Result<()> {
        let panics = self.state.lock().unwrap().panic_on_send;
        if panics {
            panic!("send to {} blew up", chat);
        }
        {
            let mut state = self.state.lock().unwrap();
            state.sent.push((chat.to_string(), text.to_string()));
            append(&mut state, chat.as_str(), outgoing(Message::text(0, text)));
        }
        self.fire(chat.as_str(), Trigger::Text(text.to_string()));
        Ok(())
    }

    async fn send_document(&self, chat: &ChatRef, path: &Path) -> Result<()> {
        {
            let mut state = self.state.lock().unwrap();
            state.documents.push((chat.to_string(), path.to_path_buf()));
            state.documents_present.push(path.exists());
            let name = path.file_name().map(|n| n.to_string_lossy().to_string());
            let message = Message::with_media(0, Media::Document { file_name: name });
            append(&mut state, chat.as_str(), outgoing(message));
        }
        self.fire(chat.as_str(), Trigger::Document);
        Ok(())
    }

    async fn fetch_recent(&self, chat: &ChatRef, limit: usize) -> Result<Vec<Message>> {
        {
            let mut state = self.state.lock().unwrap();
            if !state.stalled_fetches {
                if state.failing_fetches > 0 {
                    state.failing_fetches -= 1;
                    return Err(RelayError::Gateway("history unavailable".to_string()));
                }
                return Ok(state
                    .chats
                    .get(chat.as_str())
                    .map(|log| log.iter().rev().take(limit).cloned().collect())
                    .unwrap_or_default());
            }
        }
        std::future::pending().await
    }

    async fn download(
        &self,
        _chat: &ChatRef,
        message: &Message,
        destination: &Path,
    ) -> Result<PathBuf> {
        let name = message.document_name().unwrap_or("attachment");
        std::fs::write(destination, format!("index from {}\n", name))?;
        Ok(destination.to_path_buf())
    }

    async fn invoke_action(&self, chat: &ChatRef, message: &Message, label: &str) -> Result<bool> {
        let wanted = label.to_lowercase();
        if !message
            .buttons
            .iter()
            .any(|b| b.to_lowercase().contains(&wanted))
        {
            return Ok(false);
        }
        self.state
            .lock()
            .unwrap()
            .clicks
            .push((chat.to_string(), label.to_string()));
        self.fire(chat.as_str(), Trigger::Click(label.to_string()));
        Ok(true)
    }

    async fn copy(&self, _source: &ChatRef, message_id: i64, destination: &ChatRef) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.copies.push((message_id, destination.to_string()));
        if state.failing_channels.contains(destination.as_str()) {
            return Err(RelayError::Gateway(format!(
                "cannot write to {}",
                destination
            )));
        }
        Ok(())
    }
}
