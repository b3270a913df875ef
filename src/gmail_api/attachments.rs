use super::{path_segment, GmailClient};
use crate::email_content::decode_base64url;
use crate::error::{MailError, Result};
use crate::types::AttachmentBody;
use tracing::debug;

impl GmailClient {
    pub async fn fetch_attachment(&self, message_id: &str, attachment_id: &str) -> Result<Vec<u8>> {
        let attachment: AttachmentBody = self
            .get_json(
                &format!(
                    "messages/{}/attachments/{}",
                    path_segment(message_id)?,
                    path_segment(attachment_id)?
                ),
                &[] as &[(&str, &str)],
            )
            .await?;
        let data = attachment.data.ok_or(MailError::MissingField("data"))?;
        let bytes = decode_base64url(&data)?;
        debug!(
            "Attachment {} decoded to {} byte(s), {:?} declared",
            attachment_id,
            bytes.len(),
            attachment.size
        );
        Ok(bytes)
    }
}
