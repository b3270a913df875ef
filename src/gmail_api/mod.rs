//! Gmail API module split into logical submodules
//!
//! This module provides read-only Gmail API access organized into:
//! - auth: OAuth2 flow and keyring operations
//! - labels: Label listing
//! - messages: Message listing and fetching
//! - attachments: Attachment download

pub mod attachments;
pub mod auth;
pub mod labels;
pub mod messages;

use crate::config::Config;
use crate::error::{MailError, Result};
use crate::types::{Label, Message, MessageRef};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

pub use auth::{clear_keyring, try_authenticate, AuthResult};
pub use auth::{KEYRING_SERVICE_NAME, KEYRING_USERNAME};
pub use messages::{ListQuery, MessageFormat};

/// Read-only operations the commands need from the mail provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailApi: Send + Sync {
    async fn list_labels(&self) -> Result<Vec<Label>>;
    /// First page of message references matching `query`.
    async fn list_messages(&self, query: &ListQuery) -> Result<Vec<MessageRef>>;
    async fn get_message(&self, id: &str, format: MessageFormat) -> Result<Message>;
    /// Decoded attachment bytes.
    async fn get_attachment(&self, message_id: &str, attachment_id: &str) -> Result<Vec<u8>>;
}

/// `MailApi` over the Gmail REST endpoints with a bearer token.
pub struct GmailClient {
    client: reqwest::Client,
    token: String,
    user_url: String,
}

impl GmailClient {
    pub fn new(client: reqwest::Client, token: String, config: &Config) -> Self {
        Self {
            client,
            token,
            user_url: config.user_url(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.user_url, path)
    }

    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        debug!("GET {} -> {}", url, status);
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(MailError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Accepts an id only if it stays a single path segment of the request URL.
pub(crate) fn path_segment(id: &str) -> Result<&str> {
    let reserved = |c: char| matches!(c, '/' | '\\' | '?' | '#' | '%');
    if id.is_empty() || id == "." || id == ".." || id.contains(reserved) {
        return Err(MailError::InvalidId(id.to_string()));
    }
    Ok(id)
}

#[async_trait]
impl MailApi for GmailClient {
    async fn list_labels(&self) -> Result<Vec<Label>> {
        self.fetch_labels().await
    }

    async fn list_messages(&self, query: &ListQuery) -> Result<Vec<MessageRef>> {
        self.fetch_message_refs(query).await
    }

    async fn get_message(&self, id: &str, format: MessageFormat) -> Result<Message> {
        self.fetch_message(id, format).await
    }

    async fn get_attachment(&self, message_id: &str, attachment_id: &str) -> Result<Vec<u8>> {
        self.fetch_attachment(message_id, attachment_id).await
    }
}
