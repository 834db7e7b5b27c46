use thiserror::Error;

pub type Result<T> = std::result::Result<T, NovaError>;

#[derive(Error, Debug)]
pub enum NovaError {
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("Attachment already exists: {name}")]
    DuplicateAttachment { name: String },

    #[error("Import job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    #[error("Import job {job_id} still pending after {attempts} polls")]
    PollTimeout { job_id: String, attempts: u32 },

    #[error("Storage error: {0}")]
    StorageError(#[from] sled::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NovaError {
    pub fn api_error(status: u16, msg: impl Into<String>) -> Self {
        NovaError::ApiError {
            status,
            message: msg.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        NovaError::ConfigError(msg.into())
    }

    pub fn validation_error(msg: impl Into<String>) -> Self {
        NovaError::ValidationError {
            message: msg.into(),
        }
    }

    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        NovaError::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        NovaError::Internal(msg.into())
    }

    /// Short text suitable for a transient notification.
    ///
    /// Every error kind is surfaced the same way; this only picks the
    /// wording.
    pub fn user_message(&self) -> String {
        match self {
            NovaError::ApiError { message, .. } if !message.trim().is_empty() => message.clone(),
            NovaError::ApiError { status, .. } => format!("Request failed ({})", status),
            NovaError::NetworkError(e) if e.is_timeout() => "Request timed out".to_string(),
            NovaError::NetworkError(_) => "Network error, please try again".to_string(),
            NovaError::ValidationError { message } => message.clone(),
            NovaError::NotFound { kind, .. } => format!("{} not found", kind),
            NovaError::DuplicateAttachment { name } => {
                format!("A file named \"{}\" is already attached", name)
            }
            NovaError::JobFailed { message, .. } => format!("Import failed: {}", message),
            NovaError::PollTimeout { .. } => "Import is taking too long".to_string(),
            NovaError::SerializationError(_)
            | NovaError::ConfigError(_)
            | NovaError::StorageError(_)
            | NovaError::Internal(_) => "Something went wrong".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_prefers_backend_message() {
        let err = NovaError::api_error(409, "A plugin named foo already exists");
        assert_eq!(err.user_message(), "A plugin named foo already exists");

        let blank = NovaError::api_error(500, "  ");
        assert_eq!(blank.user_message(), "Request failed (500)");
    }

    #[test]
    fn duplicate_attachment_message_names_file() {
        let err = NovaError::DuplicateAttachment {
            name: "notes.md".into(),
        };
        assert!(err.user_message().contains("notes.md"));
    }
}
