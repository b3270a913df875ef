use super::{path_segment, GmailClient};
use crate::error::Result;
use crate::types::{Message, MessageRef, MessagesResponse};
use tracing::debug;

/// Filter for the message list endpoint. Only the first page is ever requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub label_ids: Vec<String>,
    /// Search expression in the provider's query syntax, e.g. `subject:Google`.
    pub query: Option<String>,
    pub max_results: Option<u32>,
}

impl ListQuery {
    pub fn label(label_id: impl Into<String>) -> Self {
        Self {
            label_ids: vec![label_id.into()],
            ..Default::default()
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = self
            .label_ids
            .iter()
            .map(|id| ("labelIds", id.clone()))
            .collect();
        if let Some(q) = &self.query {
            params.push(("q", q.clone()));
        }
        if let Some(max) = self.max_results {
            params.push(("maxResults", max.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Full,
    Metadata,
    Minimal,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Full => "full",
            MessageFormat::Metadata => "metadata",
            MessageFormat::Minimal => "minimal",
        }
    }
}

impl GmailClient {
    pub async fn fetch_message_refs(&self, query: &ListQuery) -> Result<Vec<MessageRef>> {
        let messages_data: MessagesResponse =
            self.get_json("messages", &query.to_params()).await?;
        let refs = messages_data.messages.unwrap_or_default();
        debug!(
            "Listed {} message(s) for {:?} (estimate {:?}, more pages: {})",
            refs.len(),
            query,
            messages_data.result_size_estimate,
            messages_data.next_page_token.is_some()
        );
        Ok(refs)
    }

    pub async fn fetch_message(&self, id: &str, format: MessageFormat) -> Result<Message> {
        self.get_json(
            &format!("messages/{}", path_segment(id)?),
            &[("format", format.as_str())],
        )
        .await
    }
}
