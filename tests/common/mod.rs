#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use nova_catalog::catalog::{CatalogBackend, Plugin, PluginInstall, PluginKind, Scope};
use nova_catalog::import::{
    ArchiveUpload, CommitRequest, DiscoverResponse, ImportBackend, ImportCandidate,
    ImportItemStatus, ImportJob, ImportResultItem, JobStatus,
};
use nova_catalog::notify::Notification;
use nova_catalog::{NovaError, Result};
use tokio::sync::{mpsc, oneshot};

pub fn plugin(id: &str, name: &str) -> Plugin {
    Plugin {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        entry: None,
        scope: Scope::User,
        owner_id: Some("u1".to_string()),
        manifest: serde_json::Value::Null,
        source: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn install(id: &str, plugin_id: &str, enabled: bool) -> PluginInstall {
    PluginInstall {
        id: id.to_string(),
        user_id: "u1".to_string(),
        plugin_id: plugin_id.to_string(),
        enabled,
        created_at: None,
    }
}

/// A call held open until the test answers it.
pub enum GatedCall {
    Update {
        install_id: String,
        enabled: bool,
        reply: oneshot::Sender<Result<PluginInstall>>,
    },
    Delete {
        entity_id: String,
        reply: oneshot::Sender<Result<()>>,
    },
}

impl GatedCall {
    pub fn answer_update(self, result: Result<PluginInstall>) {
        match self {
            GatedCall::Update { reply, .. } => {
                let _ = reply.send(result);
            }
            GatedCall::Delete { .. } => panic!("expected an update call"),
        }
    }

    pub fn answer_delete(self, result: Result<()>) {
        match self {
            GatedCall::Delete { reply, .. } => {
                let _ = reply.send(result);
            }
            GatedCall::Update { .. } => panic!("expected a delete call"),
        }
    }
}

/// In-memory plugin catalog with switchable failures.
#[derive(Default)]
pub struct FakeCatalog {
    pub entities: Mutex<Vec<Plugin>>,
    pub installs: Mutex<Vec<PluginInstall>>,
    pub fail_entities: AtomicBool,
    pub fail_installs: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_delete: AtomicBool,
    pub create_calls: AtomicUsize,
    gate: Mutex<Option<mpsc::UnboundedSender<GatedCall>>>,
}

impl FakeCatalog {
    /// Plugins p1 "foo" and p2 "bar", p3 "baz"; installs i1 (p1, off) and i2 (p2, on).
    pub fn seeded() -> Self {
        let fake = Self::default();
        *fake.entities.lock().unwrap() = vec![
            plugin("p1", "foo"),
            plugin("p2", "bar"),
            plugin("p3", "baz"),
        ];
        *fake.installs.lock().unwrap() = vec![install("i1", "p1", false), install("i2", "p2", true)];
        fake
    }

    /// Routes update and delete calls to the returned receiver.
    pub fn gate(&self) -> mpsc::UnboundedReceiver<GatedCall> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.gate.lock().unwrap() = Some(tx);
        rx
    }

    fn gate_sender(&self) -> Option<mpsc::UnboundedSender<GatedCall>> {
        self.gate.lock().unwrap().clone()
    }
}

fn dropped() -> NovaError {
    NovaError::internal("test dropped the gated call")
}

#[async_trait]
impl CatalogBackend for FakeCatalog {
    type Kind = PluginKind;

    async fn list_entities(&self) -> Result<Vec<Plugin>> {
        if self.fail_entities.load(Ordering::SeqCst) {
            return Err(NovaError::api_error(503, "plugins unavailable"));
        }
        Ok(self.entities.lock().unwrap().clone())
    }

    async fn list_installs(&self) -> Result<Vec<PluginInstall>> {
        if self.fail_installs.load(Ordering::SeqCst) {
            return Err(NovaError::api_error(503, "installs unavailable"));
        }
        Ok(self.installs.lock().unwrap().clone())
    }

    async fn create_install(&self, entity_id: &str) -> Result<PluginInstall> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(NovaError::api_error(409, "Already installed"));
        }
        let created = install(&format!("new-{}", n), entity_id, true);
        self.installs.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_install(&self, install_id: &str, enabled: bool) -> Result<PluginInstall> {
        if let Some(gate) = self.gate_sender() {
            let (reply, rx) = oneshot::channel();
            gate.send(GatedCall::Update {
                install_id: install_id.to_string(),
                enabled,
                reply,
            })
            .map_err(|_| dropped())?;
            return rx.await.map_err(|_| dropped())?;
        }
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(NovaError::api_error(500, "update failed"));
        }
        let mut installs = self.installs.lock().unwrap();
        let record = installs
            .iter_mut()
            .find(|record| record.id == install_id)
            .ok_or_else(|| NovaError::not_found("Install", install_id))?;
        record.enabled = enabled;
        Ok(record.clone())
    }

    async fn delete_entity(&self, entity_id: &str) -> Result<()> {
        if let Some(gate) = self.gate_sender() {
            let (reply, rx) = oneshot::channel();
            gate.send(GatedCall::Delete {
                entity_id: entity_id.to_string(),
                reply,
            })
            .map_err(|_| dropped())?;
            return rx.await.map_err(|_| dropped())?;
        }
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(NovaError::api_error(500, "delete failed"));
        }
        self.entities.lock().unwrap().retain(|p| p.id != entity_id);
        Ok(())
    }
}

/// Import backend that finishes every job on the second status request.
#[derive(Default)]
pub struct FakeImporter {
    pub candidates: Vec<ImportCandidate>,
    pub fail_discover: AtomicBool,
    pub fail_job: AtomicBool,
    pub never_finish: AtomicBool,
    pub finish_on_commit: AtomicBool,
    pub commit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    committed: Mutex<Option<CommitRequest>>,
}

impl FakeImporter {
    /// The two candidates of the reference scenario.
    pub fn with_reference_candidates() -> Self {
        Self {
            candidates: vec![
                ImportCandidate {
                    relative_path: "a/skill.json".into(),
                    plugin_name: "foo".into(),
                    will_overwrite: false,
                    description: None,
                },
                ImportCandidate {
                    relative_path: "b/skill.json".into(),
                    plugin_name: "bar".into(),
                    will_overwrite: true,
                    description: None,
                },
            ],
            ..Default::default()
        }
    }

    fn results(&self) -> Vec<ImportResultItem> {
        let committed = self.committed.lock().unwrap();
        let Some(request) = committed.as_ref() else {
            return Vec::new();
        };
        request
            .selections
            .iter()
            .filter_map(|selection| {
                let candidate = self
                    .candidates
                    .iter()
                    .find(|c| c.relative_path == selection.relative_path)?;
                Some(ImportResultItem {
                    relative_path: candidate.relative_path.clone(),
                    plugin_name: selection
                        .name_override
                        .clone()
                        .unwrap_or_else(|| candidate.plugin_name.clone()),
                    status: if candidate.will_overwrite {
                        ImportItemStatus::Overwritten
                    } else {
                        ImportItemStatus::Created
                    },
                    overwritten: candidate.will_overwrite,
                    plugin_id: Some(format!("plugin-{}", candidate.plugin_name)),
                    message: None,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ImportBackend for FakeImporter {
    async fn discover(&self, archive: ArchiveUpload) -> Result<DiscoverResponse> {
        if self.fail_discover.load(Ordering::SeqCst) {
            return Err(NovaError::api_error(400, "Not a zip archive"));
        }
        Ok(DiscoverResponse {
            archive_key: format!("key-{}", archive.file_name),
            candidates: self.candidates.clone(),
        })
    }

    async fn commit(&self, request: &CommitRequest) -> Result<ImportJob> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        *self.committed.lock().unwrap() = Some(request.clone());
        let queued = ImportJob {
            job_id: "job-1".into(),
            status: JobStatus::Queued,
            progress: Some(0.0),
            results: Vec::new(),
            error: None,
        };
        if !self.finish_on_commit.load(Ordering::SeqCst) {
            return Ok(queued);
        }
        if self.fail_job.load(Ordering::SeqCst) {
            return Ok(ImportJob {
                status: JobStatus::Failed,
                error: Some("Archive is corrupt".into()),
                ..queued
            });
        }
        Ok(ImportJob {
            status: JobStatus::Succeeded,
            progress: Some(1.0),
            results: self.results(),
            ..queued
        })
    }

    async fn job_status(&self, job_id: &str) -> Result<ImportJob> {
        let n = self.status_calls.fetch_add(1, Ordering::SeqCst);
        let running = ImportJob {
            job_id: job_id.to_string(),
            status: JobStatus::Running,
            progress: Some(0.5),
            results: Vec::new(),
            error: None,
        };
        if n == 0 || self.never_finish.load(Ordering::SeqCst) {
            return Ok(running);
        }
        if self.fail_job.load(Ordering::SeqCst) {
            return Ok(ImportJob {
                status: JobStatus::Failed,
                progress: None,
                error: Some("A plugin named foo already exists".into()),
                ..running
            });
        }
        Ok(ImportJob {
            status: JobStatus::Succeeded,
            progress: Some(1.0),
            results: self.results(),
            ..running
        })
    }
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        out.push(notification);
    }
    out
}
