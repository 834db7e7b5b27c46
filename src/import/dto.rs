use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportCandidate {
    pub relative_path: String,
    pub plugin_name: String,
    #[serde(default)]
    pub will_overwrite: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoverResponse {
    pub archive_key: String,
    pub candidates: Vec<ImportCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportSelection {
    pub relative_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_override: Option<String>,
}

impl ImportSelection {
    pub fn new(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            name_override: None,
        }
    }

    pub fn renamed(relative_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            name_override: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitRequest {
    pub archive_key: String,
    pub selections: Vec<ImportSelection>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    /// Any status this client does not know; treated as still in progress.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImportItemStatus {
    Created,
    Overwritten,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportResultItem {
    pub relative_path: String,
    pub plugin_name: String,
    pub status: ImportItemStatus,
    #[serde(default)]
    pub overwritten: bool,
    #[serde(default)]
    pub plugin_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportJob {
    pub job_id: String,
    pub status: JobStatus,
    /// Fraction of work done, 0.0 to 1.0, when the backend reports it.
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub results: Vec<ImportResultItem>,
    #[serde(default)]
    pub error: Option<String>,
}

/// An archive to send to discover.
#[derive(Debug, Clone)]
pub struct ArchiveUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
