//! One function per CLI subcommand. Each fetches what it needs through
//! `MailApi`, one call at a time, and writes its report to `out`.

use crate::email_content::{extract_message_parts, find_attachments, find_header};
use crate::error::{MailError, Result};
use crate::gmail_api::{ListQuery, MailApi, MessageFormat};
use crate::mime_tree::{aggregate_shapes, render_mime_tree};
use crate::types::{Message, MessagePart, MessageRef, ShapeCount};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const INBOX_LABEL: &str = "INBOX";
const NO_SUBJECT: &str = "(no subject)";

fn payload_of(message: &Message) -> Result<&MessagePart> {
    message
        .payload
        .as_ref()
        .ok_or(MailError::MissingField("payload"))
}

async fn list_refs<A: MailApi>(api: &A, query: ListQuery, limit: usize) -> Result<Vec<MessageRef>> {
    let query = query.with_max_results(limit.try_into().unwrap_or(u32::MAX));
    let mut refs = api.list_messages(&query).await?;
    refs.truncate(limit);
    Ok(refs)
}

pub async fn list_labels<A: MailApi, W: Write>(api: &A, out: &mut W) -> Result<()> {
    let labels = api.list_labels().await?;
    info!("Fetched {} label(s)", labels.len());
    writeln!(out, "Labels:")?;
    for label in &labels {
        writeln!(
            out,
            "{}: {}",
            label.name.as_deref().unwrap_or_default(),
            label.id.as_deref().unwrap_or_default()
        )?;
    }
    Ok(())
}

/// Prints id and snippet of the first `limit` inbox messages.
pub async fn show_inbox<A: MailApi, W: Write>(api: &A, out: &mut W, limit: usize) -> Result<()> {
    let refs = list_refs(api, ListQuery::label(INBOX_LABEL), limit).await?;
    if refs.is_empty() {
        writeln!(out, "No messages in inbox.")?;
        return Ok(());
    }

    writeln!(out, "Inbox Messages:")?;
    for message_ref in &refs {
        writeln!(out, "{}", message_ref.id)?;
        let message = api.get_message(&message_ref.id, MessageFormat::Full).await?;
        writeln!(out, "{}", message.snippet.as_deref().unwrap_or_default())?;
    }
    Ok(())
}

/// Prints subject and the start of the body of the first `limit` inbox messages.
///
/// A body that fails to decode is reported and skipped; the rest of the run continues.
pub async fn read_inbox<A: MailApi, W: Write>(
    api: &A,
    out: &mut W,
    limit: usize,
    preview_chars: usize,
) -> Result<()> {
    let refs = list_refs(api, ListQuery::label(INBOX_LABEL), limit).await?;
    if refs.is_empty() {
        writeln!(out, "No messages in inbox.")?;
        return Ok(());
    }

    writeln!(out, "Inbox Messages:")?;
    for message_ref in &refs {
        writeln!(out, "gmail message id:{}", message_ref.id)?;
        let message = api.get_message(&message_ref.id, MessageFormat::Full).await?;
        let payload = payload_of(&message)?;

        let subject = find_header(payload, "Subject").unwrap_or(NO_SUBJECT);
        writeln!(out, "subject:{}", subject)?;

        match extract_message_parts(payload) {
            Ok(bodies) => {
                if let Some(text) = bodies.preferred() {
                    let preview: String = text.chars().take(preview_chars).collect();
                    writeln!(out, "{}\n", preview)?;
                }
            }
            Err(e @ (MailError::Decode(_) | MailError::Utf8(_))) => {
                warn!("Skipping body of message {}: {}", message_ref.id, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Prints id and subject of the first `limit` messages matching `query`.
pub async fn search<A: MailApi, W: Write>(
    api: &A,
    out: &mut W,
    query: ListQuery,
    limit: usize,
) -> Result<()> {
    if let Some(label) = query.label_ids.first() {
        writeln!(out, "Messages by {}", label)?;
    }
    let refs = list_refs(api, query, limit).await?;
    debug!("Search matched {} message(s)", refs.len());

    for message_ref in &refs {
        let message = api
            .get_message(&message_ref.id, MessageFormat::Metadata)
            .await?;
        let subject = message
            .payload
            .as_ref()
            .and_then(|p| find_header(p, "Subject"))
            .unwrap_or(NO_SUBJECT);
        writeln!(out, "ID:{}  - {}", message_ref.id, subject)?;
    }
    Ok(())
}

/// Reduces an attachment name to a bare file name inside the target directory.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    match base {
        "" | "." | ".." => Err(MailError::InvalidFilename(filename.to_string())),
        name => Ok(name.to_string()),
    }
}

/// Saves every attachment of `message_id` into `dir` and returns the written paths.
pub async fn download_attachments<A: MailApi, W: Write>(
    api: &A,
    out: &mut W,
    message_id: &str,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let message = api.get_message(message_id, MessageFormat::Full).await?;
    writeln!(
        out,
        "Message ID: {}",
        message.id.as_deref().unwrap_or(message_id)
    )?;
    writeln!(
        out,
        "Message snippet: {}",
        message.snippet.as_deref().unwrap_or_default()
    )?;

    let payload = payload_of(&message)?;
    tokio::fs::create_dir_all(dir).await?;

    let mut saved = Vec::new();
    for attachment in find_attachments(payload) {
        writeln!(
            out,
            "filename: {}, attachment_id: {}",
            attachment.filename, attachment.attachment_id
        )?;
        let filepath = dir.join(sanitize_filename(&attachment.filename)?);
        let bytes = api
            .get_attachment(message_id, &attachment.attachment_id)
            .await?;
        tokio::fs::write(&filepath, &bytes).await?;
        info!("Wrote {} byte(s) to {}", bytes.len(), filepath.display());
        writeln!(out, "Saved attachment to {}", filepath.display())?;
        saved.push(filepath);
    }
    Ok(saved)
}

/// Groups the first `limit` inbox messages by MIME tree shape and prints the counts.
pub async fn mime_stats<A: MailApi, W: Write>(
    api: &A,
    out: &mut W,
    limit: usize,
) -> Result<Vec<ShapeCount>> {
    let refs = list_refs(api, ListQuery::label(INBOX_LABEL), limit).await?;
    if refs.is_empty() {
        writeln!(out, "No messages in inbox.")?;
        return Ok(Vec::new());
    }

    writeln!(out, "Inbox Messages:")?;
    let mut shapes = Vec::with_capacity(refs.len());
    for message_ref in &refs {
        let message = api.get_message(&message_ref.id, MessageFormat::Full).await?;
        shapes.push(render_mime_tree(payload_of(&message)?, 0)?);
    }

    let counts = aggregate_shapes(&shapes);
    for entry in &counts {
        writeln!(out, "{} : {}", entry.shape, entry.count)?;
    }
    Ok(counts)
}
