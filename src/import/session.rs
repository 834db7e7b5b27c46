use std::collections::HashSet;
use std::sync::Arc;

use super::backend::ImportBackend;
use super::dto::{
    ArchiveUpload, CommitRequest, ImportCandidate, ImportItemStatus, ImportJob, ImportResultItem,
    ImportSelection, JobStatus,
};
use super::poller::PollPolicy;
use crate::error::{NovaError, Result};
use crate::notify::{report, Notification, Notifier};

#[derive(Debug, Clone, PartialEq)]
pub enum ImportPhase {
    Idle,
    Discovered {
        archive_key: String,
        candidates: Vec<ImportCandidate>,
    },
    Committed {
        job_id: String,
    },
    Running {
        job_id: String,
        progress: Option<f64>,
    },
    Succeeded {
        job_id: String,
        results: Vec<ImportResultItem>,
    },
    Failed {
        job_id: String,
        error: String,
    },
}

impl ImportPhase {
    fn job_id(&self) -> Option<&str> {
        match self {
            ImportPhase::Committed { job_id } | ImportPhase::Running { job_id, .. } => {
                Some(job_id)
            }
            _ => None,
        }
    }

    fn in_flight(&self) -> bool {
        self.job_id().is_some()
    }
}

/// Checks selections against what discover returned, before commit.
pub fn validate_selections(
    archive_key: &str,
    candidates: &[ImportCandidate],
    selections: &[ImportSelection],
) -> Result<()> {
    if archive_key.trim().is_empty() {
        return Err(NovaError::validation_error("Archive key is missing"));
    }
    if selections.is_empty() {
        return Err(NovaError::validation_error(
            "Select at least one plugin to import",
        ));
    }

    let known = candidates
        .iter()
        .map(|candidate| candidate.relative_path.as_str())
        .collect::<HashSet<_>>();
    let mut seen = HashSet::new();
    for selection in selections {
        let path = selection.relative_path.as_str();
        if !known.contains(path) {
            return Err(NovaError::validation_error(format!(
                "{} is not part of this archive",
                path
            )));
        }
        if !seen.insert(path) {
            return Err(NovaError::validation_error(format!(
                "{} is selected twice",
                path
            )));
        }
        if let Some(name) = &selection.name_override {
            if name.trim().is_empty() {
                return Err(NovaError::validation_error(format!(
                    "Name for {} cannot be blank",
                    path
                )));
            }
        }
    }
    Ok(())
}

/// One plugin import: discover, commit a selection, poll the job.
///
/// A failed step reports through the notifier and leaves the session in a
/// state from which the user can try again.
pub struct ImportSession<B: ImportBackend> {
    backend: Arc<B>,
    policy: PollPolicy,
    notifier: Arc<dyn Notifier>,
    phase: ImportPhase,
    // Set when polling gave up on the current job
    stalled: bool,
}

impl<B: ImportBackend> ImportSession<B> {
    pub fn new(backend: Arc<B>, policy: PollPolicy, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            policy,
            notifier,
            phase: ImportPhase::Idle,
            stalled: false,
        }
    }

    pub fn phase(&self) -> &ImportPhase {
        &self.phase
    }

    pub fn candidates(&self) -> &[ImportCandidate] {
        match &self.phase {
            ImportPhase::Discovered { candidates, .. } => candidates,
            _ => &[],
        }
    }

    fn fail(&self, action: &str, err: NovaError) -> NovaError {
        report(self.notifier.as_ref(), action, &err);
        err
    }

    /// Drops the current job, if any, and returns to `Idle`. The job keeps
    /// running server-side; its outcome is no longer tracked.
    pub fn abandon(&mut self) {
        if let Some(job_id) = self.phase.job_id() {
            tracing::info!("Abandoning import job {}", job_id);
        }
        self.phase = ImportPhase::Idle;
        self.stalled = false;
    }

    /// Uploads an archive and lists what it contains. Refused while a job is
    /// being tracked, unless polling for that job already gave up.
    pub async fn discover(&mut self, archive: ArchiveUpload) -> Result<&[ImportCandidate]> {
        if self.phase.in_flight() && !self.stalled {
            return Err(self.fail(
                "Discover import",
                NovaError::validation_error("An import is already running"),
            ));
        }

        let response = match self.backend.discover(archive).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail("Discover import", err)),
        };

        if self.stalled {
            self.abandon();
        }
        self.phase = ImportPhase::Discovered {
            archive_key: response.archive_key,
            candidates: response.candidates,
        };
        Ok(self.candidates())
    }

    /// Submits `selections` and returns the job id. The import itself runs
    /// server-side; call [`poll`](Self::poll) for the outcome. A job that has
    /// already failed when the commit returns is an error here.
    pub async fn commit(&mut self, selections: Vec<ImportSelection>) -> Result<String> {
        let (archive_key, candidates) = match &self.phase {
            ImportPhase::Discovered {
                archive_key,
                candidates,
            } => (archive_key.clone(), candidates),
            _ => {
                return Err(self.fail(
                    "Commit import",
                    NovaError::validation_error("Nothing has been discovered to import"),
                ))
            }
        };
        if let Err(err) = validate_selections(&archive_key, candidates, &selections) {
            return Err(self.fail("Commit import", err));
        }

        let request = CommitRequest {
            archive_key,
            selections,
        };
        let job = match self.backend.commit(&request).await {
            Ok(job) => job,
            Err(err) => return Err(self.fail("Commit import", err)),
        };

        let job_id = job.job_id.clone();
        if job.status.is_terminal() {
            self.settle(job)?;
        } else {
            self.track(&job);
        }
        Ok(job_id)
    }

    /// Commits every discovered candidate under its inferred name.
    pub async fn commit_all(&mut self) -> Result<String> {
        let selections = self
            .candidates()
            .iter()
            .map(|candidate| ImportSelection::new(candidate.relative_path.clone()))
            .collect();
        self.commit(selections).await
    }

    /// Polls the committed job until it finishes.
    pub async fn poll(&mut self) -> Result<Vec<ImportResultItem>> {
        let job_id = match &self.phase {
            ImportPhase::Succeeded { results, .. } => return Ok(results.clone()),
            ImportPhase::Failed { job_id, error } => {
                return Err(NovaError::JobFailed {
                    job_id: job_id.clone(),
                    message: error.clone(),
                })
            }
            phase => match phase.job_id() {
                Some(job_id) => job_id.to_string(),
                None => {
                    return Err(self.fail(
                        "Poll import",
                        NovaError::validation_error("No import job to wait for"),
                    ))
                }
            },
        };

        let start = ImportJob {
            job_id: job_id.clone(),
            status: JobStatus::Queued,
            progress: None,
            results: Vec::new(),
            error: None,
        };
        let backend = Arc::clone(&self.backend);
        let policy = self.policy;
        self.stalled = false;
        let phase = &mut self.phase;
        let waited = policy
            .wait_for_terminal(backend.as_ref(), start, |job| {
                *phase = ImportPhase::Running {
                    job_id: job.job_id.clone(),
                    progress: job.progress,
                };
            })
            .await;

        match waited {
            Ok(job) => self.settle(job),
            Err(err) => {
                self.stalled = true;
                Err(self.fail(&format!("Poll import job {}", job_id), err))
            }
        }
    }

    /// Discover, commit what `select` picks, and wait for the result.
    pub async fn run<F>(&mut self, archive: ArchiveUpload, select: F) -> Result<Vec<ImportResultItem>>
    where
        F: FnOnce(&[ImportCandidate]) -> Vec<ImportSelection>,
    {
        let selections = select(self.discover(archive).await?);
        self.commit(selections).await?;
        self.poll().await
    }

    fn track(&mut self, job: &ImportJob) {
        self.phase = match job.status {
            JobStatus::Running => ImportPhase::Running {
                job_id: job.job_id.clone(),
                progress: job.progress,
            },
            _ => ImportPhase::Committed {
                job_id: job.job_id.clone(),
            },
        };
    }

    fn settle(&mut self, job: ImportJob) -> Result<Vec<ImportResultItem>> {
        match job.status {
            JobStatus::Succeeded => {
                self.notifier
                    .notify(Notification::success(summarize(&job.results)));
                self.phase = ImportPhase::Succeeded {
                    job_id: job.job_id,
                    results: job.results.clone(),
                };
                Ok(job.results)
            }
            _ => {
                let message = job
                    .error
                    .filter(|error| !error.trim().is_empty())
                    .unwrap_or_else(|| "unknown error".to_string());
                self.phase = ImportPhase::Failed {
                    job_id: job.job_id.clone(),
                    error: message.clone(),
                };
                Err(self.fail(
                    "Import job",
                    NovaError::JobFailed {
                        job_id: job.job_id,
                        message,
                    },
                ))
            }
        }
    }
}

fn summarize(results: &[ImportResultItem]) -> String {
    let count = |status: ImportItemStatus| {
        results
            .iter()
            .filter(|item| item.status == status)
            .count()
    };
    let created = count(ImportItemStatus::Created);
    let overwritten = count(ImportItemStatus::Overwritten);
    let failed = count(ImportItemStatus::Error);

    let mut message = format!("Imported {} plugin(s)", created + overwritten);
    if overwritten > 0 {
        message.push_str(&format!(", {} overwritten", overwritten));
    }
    if failed > 0 {
        message.push_str(&format!(", {} failed", failed));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(path: &str, name: &str) -> ImportCandidate {
        ImportCandidate {
            relative_path: path.into(),
            plugin_name: name.into(),
            will_overwrite: false,
            description: None,
        }
    }

    #[test]
    fn rejects_unknown_and_duplicate_selections() {
        let candidates = vec![candidate("a/skill.json", "foo")];
        let unknown = validate_selections("k", &candidates, &[ImportSelection::new("b/x.json")]);
        assert!(unknown.is_err());

        let twice = validate_selections(
            "k",
            &candidates,
            &[
                ImportSelection::new("a/skill.json"),
                ImportSelection::renamed("a/skill.json", "other"),
            ],
        );
        assert!(twice.is_err());
    }

    #[test]
    fn rejects_blank_override_and_empty_selection() {
        let candidates = vec![candidate("a/skill.json", "foo")];
        assert!(validate_selections("k", &candidates, &[]).is_err());
        assert!(validate_selections(
            "k",
            &candidates,
            &[ImportSelection::renamed("a/skill.json", "  ")]
        )
        .is_err());
        assert!(validate_selections(" ", &candidates, &[ImportSelection::new("a/skill.json")])
            .is_err());
    }

    #[test]
    fn summary_counts_statuses() {
        let item = |status: ImportItemStatus| ImportResultItem {
            relative_path: "p".into(),
            plugin_name: "n".into(),
            status,
            overwritten: status == ImportItemStatus::Overwritten,
            plugin_id: None,
            message: None,
        };
        let message = summarize(&[
            item(ImportItemStatus::Created),
            item(ImportItemStatus::Overwritten),
            item(ImportItemStatus::Error),
        ]);
        assert_eq!(message, "Imported 2 plugin(s), 1 overwritten, 1 failed");
    }
}
