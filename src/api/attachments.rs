use async_trait::async_trait;

use super::client::{file_part, ApiClient};
use crate::attachments::{Attachment, UploadBackend};
use crate::error::Result;

const ATTACHMENTS_PATH: &str = "attachments";

#[derive(Clone)]
pub struct AttachmentsApi {
    client: ApiClient,
}

impl AttachmentsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<Attachment> {
        let form = reqwest::multipart::Form::new().part("file", file_part(file_name, bytes));
        self.client.post_multipart(&[ATTACHMENTS_PATH], form).await
    }

    pub async fn delete(&self, attachment_id: &str) -> Result<()> {
        self.client.delete(&[ATTACHMENTS_PATH, attachment_id]).await
    }
}

#[async_trait]
impl UploadBackend for AttachmentsApi {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<Attachment> {
        AttachmentsApi::upload(self, file_name, bytes).await
    }
}
