//! [`Gateway`] over HTTP: talks to a userbot bridge process that owns the real account session.
//!
//! Endpoints (JSON):
//! - `GET  /history?chat=&limit=` → `{ "messages": [Message] }`, newest first
//! - `POST /send {chat, text}`
//! - `POST /send_document {chat, path}`
//! - `POST /download {chat, message_id, path}` → `{ "path": ... }`
//! - `POST /click {chat, message_id, label}` → `{ "clicked": bool }`
//! - `POST /copy {from_chat, message_id, to_chat}`

use async_trait::async_trait;
use relay_core::{ChatRef, Gateway, Message, RelayError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error};

/// Upper bound on one bridge call, so a stalled bridge cannot hold a job forever.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct SendBody<'a> {
    chat: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct SendDocumentBody<'a> {
    chat: &'a str,
    path: &'a Path,
}

#[derive(Serialize)]
struct DownloadBody<'a> {
    chat: &'a str,
    message_id: i64,
    path: &'a Path,
}

#[derive(Serialize)]
struct ClickBody<'a> {
    chat: &'a str,
    message_id: i64,
    label: &'a str,
}

#[derive(Serialize)]
struct CopyBody<'a> {
    from_chat: &'a str,
    message_id: i64,
    to_chat: &'a str,
}

#[derive(Deserialize)]
struct HistoryResponse {
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct DownloadResponse {
    path: PathBuf,
}

#[derive(Deserialize)]
struct ClickResponse {
    clicked: bool,
}

pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        Self::with_timeout(base_url, token, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends the request; non-2xx statuses become [`RelayError::Gateway`] with status and body.
    async fn execute(&self, path: &str, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| RelayError::Gateway(format!("{}: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(path = %path, status = %status, body = %body, "Bridge request failed");
            return Err(RelayError::Gateway(format!("{} returned {}: {}", path, status, body)));
        }
        debug!(path = %path, status = %status, "Bridge request done");
        Ok(response)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let request = self.client.post(self.endpoint(path)).json(body);
        self.execute(path, request).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| RelayError::Gateway(format!("{}: invalid response: {}", path, e)))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send(&self, chat: &ChatRef, text: &str) -> Result<()> {
        self.post(
            "send",
            &SendBody {
                chat: chat.as_str(),
                text,
            },
        )
        .await?;
        Ok(())
    }

    async fn send_document(&self, chat: &ChatRef, path: &Path) -> Result<()> {
        self.post(
            "send_document",
            &SendDocumentBody {
                chat: chat.as_str(),
                path,
            },
        )
        .await?;
        Ok(())
    }

    async fn fetch_recent(&self, chat: &ChatRef, limit: usize) -> Result<Vec<Message>> {
        let limit = limit.to_string();
        let request = self
            .client
            .get(self.endpoint("history"))
            .query(&[("chat", chat.as_str()), ("limit", limit.as_str())]);
        let response = self.execute("history", request).await?;
        let history: HistoryResponse = Self::decode("history", response).await?;
        Ok(history.messages)
    }

    async fn download(
        &self,
        chat: &ChatRef,
        message: &Message,
        destination: &Path,
    ) -> Result<PathBuf> {
        let response = self
            .post(
                "download",
                &DownloadBody {
                    chat: chat.as_str(),
                    message_id: message.id,
                    path: destination,
                },
            )
            .await?;
        let downloaded: DownloadResponse = Self::decode("download", response).await?;
        Ok(downloaded.path)
    }

    async fn invoke_action(&self, chat: &ChatRef, message: &Message, label: &str) -> Result<bool> {
        let response = self
            .post(
                "click",
                &ClickBody {
                    chat: chat.as_str(),
                    message_id: message.id,
                    label,
                },
            )
            .await?;
        let click: ClickResponse = Self::decode("click", response).await?;
        Ok(click.clicked)
    }

    async fn copy(&self, source: &ChatRef, message_id: i64, destination: &ChatRef) -> Result<()> {
        self.post(
            "copy",
            &CopyBody {
                from_chat: source.as_str(),
                message_id,
                to_chat: destination.as_str(),
            },
        )
        .await?;
        Ok(())
    }
}
