use async_trait::async_trait;

use super::dto::{ArchiveUpload, CommitRequest, DiscoverResponse, ImportJob};
use crate::error::Result;

/// The three calls of the plugin import flow.
#[async_trait]
pub trait ImportBackend: Send + Sync + 'static {
    async fn discover(&self, archive: ArchiveUpload) -> Result<DiscoverResponse>;

    /// Starts the import server-side. The returned job is usually not terminal.
    async fn commit(&self, request: &CommitRequest) -> Result<ImportJob>;

    async fn job_status(&self, job_id: &str) -> Result<ImportJob>;
}
