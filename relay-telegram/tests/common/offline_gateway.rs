//! Gateway whose bridge is down: history reads are empty, every write fails.

use async_trait::async_trait;
use relay_core::{ChatRef, Gateway, Message, RelayError, Result};
use std::path::{Path, PathBuf};

pub struct OfflineGateway;

fn offline<T>() -> Result<T> {
    Err(RelayError::Gateway("bridge offline".to_string()))
}

#[async_trait]
impl Gateway for OfflineGateway {
    async fn send(&self, _chat: &ChatRef, _text: &str) -> Result<()> {
        offline()
    }

    async fn send_document(&self, _chat: &ChatRef, _path: &Path) -> Result<()> {
        offline()
    }

    async fn fetch_recent(&self, _chat: &ChatRef, _limit: usize) -> Result<Vec<Message>> {
        Ok(Vec::new())
    }

    async fn download(&self, _chat: &ChatRef, _message: &Message, _destination: &Path) -> Result<PathBuf> {
        offline()
    }

    async fn invoke_action(&self, _chat: &ChatRef, _message: &Message, _label: &str) -> Result<bool> {
        offline()
    }

    async fn copy(&self, _source: &ChatRef, _message_id: i64, _destination: &ChatRef) -> Result<()> {
        offline()
    }
}
