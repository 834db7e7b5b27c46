//! Attachment list with local duplicate-name protection.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{NovaError, Result};
use crate::notify::{report, Notifier};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[async_trait]
pub trait UploadBackend: Send + Sync + 'static {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<Attachment>;
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct AttachmentList<B: UploadBackend> {
    backend: Arc<B>,
    notifier: Arc<dyn Notifier>,
    items: Vec<Attachment>,
}

impl<B: UploadBackend> AttachmentList<B> {
    pub fn new(backend: Arc<B>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Attachment] {
        &self.items
    }

    /// Trimmed, case-insensitive match against the current list.
    pub fn contains_name(&self, name: &str) -> bool {
        let needle = normalize_name(name);
        self.items
            .iter()
            .any(|item| normalize_name(&item.name) == needle)
    }

    /// Uploads a file unless an attachment with the same name is already
    /// present; duplicates are refused without touching the network.
    pub async fn add(&mut self, file_name: &str, bytes: Vec<u8>) -> Result<&Attachment> {
        let trimmed = file_name.trim();
        if trimmed.is_empty() {
            let err = NovaError::validation_error("File name is required");
            report(self.notifier.as_ref(), "Upload attachment", &err);
            return Err(err);
        }
        if self.contains_name(trimmed) {
            let err = NovaError::DuplicateAttachment {
                name: trimmed.to_string(),
            };
            report(self.notifier.as_ref(), "Upload attachment", &err);
            return Err(err);
        }

        match self.backend.upload(trimmed, bytes).await {
            Ok(attachment) => {
                tracing::info!("Attached {} ({})", attachment.name, attachment.id);
                self.items.push(attachment);
                let index = self.items.len() - 1;
                Ok(&self.items[index])
            }
            Err(err) => {
                report(self.notifier.as_ref(), "Upload attachment", &err);
                Err(err)
            }
        }
    }

    pub fn remove(&mut self, attachment_id: &str) -> Option<Attachment> {
        let position = self.items.iter().position(|item| item.id == attachment_id)?;
        Some(self.items.remove(position))
    }
}
