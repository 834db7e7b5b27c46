use std::time::Duration;

use super::backend::ImportBackend;
use super::dto::{ImportJob, JobStatus};
use crate::config::PollingConfig;
use crate::error::{NovaError, Result};

/// Fixed-interval polling with a cap on the number of status requests.
///
/// A failed status request ends polling with that error; it is not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 120,
        }
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval(),
            max_attempts: config.max_attempts,
        }
    }
}

impl PollPolicy {
    /// Polls `job` until it reaches a terminal status. `on_update` sees every
    /// non-terminal status that comes back.
    pub async fn wait_for_terminal<B, F>(
        &self,
        backend: &B,
        job: ImportJob,
        mut on_update: F,
    ) -> Result<ImportJob>
    where
        B: ImportBackend + ?Sized,
        F: FnMut(&ImportJob) + Send,
    {
        if job.status.is_terminal() {
            return Ok(job);
        }

        let job_id = job.job_id;
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.interval).await;
            let current = backend.job_status(&job_id).await?;
            if current.job_id != job_id {
                return Err(NovaError::internal(format!(
                    "Asked for job {} but got {}",
                    job_id, current.job_id
                )));
            }
            if current.status.is_terminal() {
                tracing::debug!(
                    "Import job {} finished after {} polls: {:?}",
                    job_id,
                    attempt,
                    current.status
                );
                return Ok(current);
            }
            if current.status == JobStatus::Unknown {
                tracing::warn!("Import job {} reported an unrecognized status", job_id);
            }
            tracing::debug!(
                "Import job {} is {:?} (progress {:?})",
                job_id,
                current.status,
                current.progress
            );
            on_update(&current);
        }

        Err(NovaError::PollTimeout {
            job_id,
            attempts: self.max_attempts,
        })
    }
}
