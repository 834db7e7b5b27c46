use async_trait::async_trait;

use super::client::{file_part, ApiClient};
use crate::error::{NovaError, Result};
use crate::import::backend::ImportBackend;
use crate::import::dto::{ArchiveUpload, CommitRequest, DiscoverResponse, ImportJob};

const IMPORT_PATH: [&str; 2] = ["plugins", "import"];

#[derive(Clone)]
pub struct ImportApi {
    client: ApiClient,
}

impl ImportApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn discover(&self, archive: ArchiveUpload) -> Result<DiscoverResponse> {
        if archive.bytes.is_empty() {
            return Err(NovaError::validation_error("Archive is empty"));
        }
        tracing::info!(
            "Uploading {} ({} bytes) for import discovery",
            archive.file_name,
            archive.bytes.len()
        );
        let form = reqwest::multipart::Form::new()
            .part("file", file_part(&archive.file_name, archive.bytes));
        let response: DiscoverResponse = self
            .client
            .post_multipart(&[IMPORT_PATH[0], IMPORT_PATH[1], "discover"], form)
            .await?;
        tracing::info!(
            "Discovered {} import candidates (archive {})",
            response.candidates.len(),
            response.archive_key
        );
        Ok(response)
    }

    pub async fn commit(&self, request: &CommitRequest) -> Result<ImportJob> {
        let job: ImportJob = self
            .client
            .post_json(&[IMPORT_PATH[0], IMPORT_PATH[1], "commit"], request)
            .await?;
        tracing::info!("Import job {} created ({:?})", job.job_id, job.status);
        Ok(job)
    }

    pub async fn job_status(&self, job_id: &str) -> Result<ImportJob> {
        self.client
            .get_json(&[IMPORT_PATH[0], IMPORT_PATH[1], "jobs", job_id])
            .await
    }
}

#[async_trait]
impl ImportBackend for ImportApi {
    async fn discover(&self, archive: ArchiveUpload) -> Result<DiscoverResponse> {
        ImportApi::discover(self, archive).await
    }

    async fn commit(&self, request: &CommitRequest) -> Result<ImportJob> {
        ImportApi::commit(self, request).await
    }

    async fn job_status(&self, job_id: &str) -> Result<ImportJob> {
        ImportApi::job_status(self, job_id).await
    }
}
