use super::GmailClient;
use crate::error::Result;
use crate::types::{Label, LabelsResponse};

impl GmailClient {
    pub async fn fetch_labels(&self) -> Result<Vec<Label>> {
        let labels_data: LabelsResponse = self.get_json("labels", &[] as &[(&str, &str)]).await?;
        Ok(labels_data.labels.unwrap_or_default())
    }
}
