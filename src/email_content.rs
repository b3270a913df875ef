use crate::error::{MailError, Result};
use crate::types::{AttachmentRef, MessageBodies, MessagePart};
use base64::alphabet;
use base64::engine::general_purpose::GeneralPurposeConfig;
use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose};

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

// The API pads body data but not always attachment data.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn decode_base64url(data: &str) -> Result<Vec<u8>> {
    Ok(URL_SAFE_LENIENT.decode(data)?)
}

pub fn decode_body_text(data: &str) -> Result<String> {
    Ok(String::from_utf8(decode_base64url(data)?)?)
}

pub(crate) fn mime_type(part: &MessagePart) -> Result<&str> {
    part.mime_type
        .as_deref()
        .ok_or_else(|| MailError::MissingMimeType {
            part_id: part.part_id.clone(),
        })
}

/// Collects the first `text/plain` and the first `text/html` body in pre-order.
///
/// Every node is visited; later parts of an already found type are not decoded.
pub fn extract_message_parts(payload: &MessagePart) -> Result<MessageBodies> {
    let mut bodies = MessageBodies::default();
    collect_bodies(payload, &mut bodies)?;
    Ok(bodies)
}

fn collect_bodies(part: &MessagePart, bodies: &mut MessageBodies) -> Result<()> {
    let slot = match mime_type(part)? {
        TEXT_PLAIN => Some(&mut bodies.plain),
        TEXT_HTML => Some(&mut bodies.html),
        _ => None,
    };
    if let (Some(slot), Some(data)) = (slot, part.body_data()) {
        if slot.is_none() {
            *slot = Some(decode_body_text(data)?);
        }
    }

    for child in part.children() {
        collect_bodies(child, bodies)?;
    }
    Ok(())
}

// Extract plain text content specifically, stopping at the first hit
pub fn extract_plain_text_body(payload: &MessagePart) -> Result<Option<String>> {
    if mime_type(payload)? == TEXT_PLAIN {
        if let Some(data) = payload.body_data() {
            return decode_body_text(data).map(Some);
        }
    }

    for part in payload.children() {
        if let Some(text) = extract_plain_text_body(part)? {
            return Ok(Some(text));
        }
    }

    Ok(None)
}

/// Looks up a header on the given part only. Child parts are not searched.
pub fn find_header<'a>(payload: &'a MessagePart, name: &str) -> Option<&'a str> {
    payload
        .headers
        .as_deref()?
        .iter()
        .find(|h| h.name == name)
        .map(|h| h.value.as_str())
}

/// Lists the remotely stored attachments below the message root, in pre-order.
pub fn find_attachments(payload: &MessagePart) -> Vec<AttachmentRef> {
    let mut found = Vec::new();
    for part in payload.children() {
        collect_attachments(part, &mut found);
    }
    found
}

fn collect_attachments(part: &MessagePart, found: &mut Vec<AttachmentRef>) {
    let filename = part.filename.as_deref().filter(|f| !f.is_empty());
    if let (Some(filename), Some(attachment_id)) = (filename, part.attachment_id()) {
        found.push(AttachmentRef {
            filename: filename.to_string(),
            attachment_id: attachment_id.to_string(),
        });
    }
    for child in part.children() {
        collect_attachments(child, found);
    }
}
