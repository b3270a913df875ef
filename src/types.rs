use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LabelsResponse {
    pub labels: Option<Vec<Label>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Label {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub label_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub messages: Option<Vec<MessageRef>>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
    #[serde(rename = "resultSizeEstimate")]
    pub result_size_estimate: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MessageRef {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Message {
    pub id: Option<String>,
    pub snippet: Option<String>,
    pub payload: Option<MessagePart>,
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
    #[serde(rename = "labelIds")]
    pub label_ids: Option<Vec<String>>,
}

/// One node of a message's MIME tree as returned by the API.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MessagePart {
    #[serde(rename = "partId")]
    pub part_id: Option<String>,
    #[serde(rename = "mimeType")]
    pub mime_type: Option<String>,
    pub filename: Option<String>,
    pub headers: Option<Vec<Header>>,
    pub body: Option<MessagePartBody>,
    pub parts: Option<Vec<MessagePart>>,
}

impl MessagePart {
    /// Child parts in document order; empty for leaves.
    pub fn children(&self) -> &[MessagePart] {
        self.parts.as_deref().unwrap_or(&[])
    }

    /// Inline body data, treating an empty string the same as no data.
    pub fn body_data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|d| !d.is_empty())
    }

    pub fn attachment_id(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| b.attachment_id.as_deref())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MessagePartBody {
    pub data: Option<String>,
    #[serde(rename = "attachmentId")]
    pub attachment_id: Option<String>,
    pub size: Option<u64>,
}

/// Response of the attachments endpoint.
#[derive(Debug, Deserialize)]
pub struct AttachmentBody {
    pub data: Option<String>,
    pub size: Option<u64>,
}

/// Plain and HTML bodies found in a message, first occurrence of each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageBodies {
    pub plain: Option<String>,
    pub html: Option<String>,
}

impl MessageBodies {
    /// The text to present as "the" body: plain when available, else HTML.
    pub fn preferred(&self) -> Option<&str> {
        self.plain.as_deref().or(self.html.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentRef {
    pub filename: String,
    pub attachment_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeCount {
    pub shape: String,
    pub count: usize,
}
