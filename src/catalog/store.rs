use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::backend::{CatalogBackend, EntityOf, InstallOf};
use super::cache::SnapshotCache;
use super::kind::{CatalogEntity, CatalogInstall, CatalogKind, EntityKind};
use super::toggle::{PendingToggle, ToggleOutcome, ToggleState};
use crate::error::NovaError;
use crate::notify::{report, Notification, Notifier};

struct CatalogState<K: CatalogKind> {
    entities: Vec<EntityOf<K>>,
    installs: Vec<InstallOf<K>>,
    loading_id: Option<String>,
    pending: HashMap<u64, PendingToggle>,
}

impl<K: CatalogKind> CatalogState<K> {
    fn empty() -> Self {
        Self {
            entities: Vec::new(),
            installs: Vec::new(),
            loading_id: None,
            pending: HashMap::new(),
        }
    }
}

/// Local copy of one catalog kind (entities plus the user's installs),
/// patched optimistically by user actions.
///
/// Every action catches its own failure, logs it and turns it into a
/// notification; none of them return an error. A single `loading_id` marks
/// the row being worked on, but actions are not serialized: two calls on
/// the same id race and the last response wins.
pub struct CatalogStore<B: CatalogBackend> {
    backend: Arc<B>,
    notifier: Arc<dyn Notifier>,
    cache: Option<SnapshotCache>,
    state: RwLock<CatalogState<B::Kind>>,
    open: AtomicBool,
    next_call: AtomicU64,
}

impl<B: CatalogBackend> CatalogStore<B> {
    pub fn new(backend: Arc<B>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            cache: None,
            state: RwLock::new(CatalogState::empty()),
            open: AtomicBool::new(true),
            next_call: AtomicU64::new(1),
        }
    }

    pub fn with_cache(mut self, cache: SnapshotCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn label() -> &'static str {
        <B::Kind as EntityKind>::LABEL
    }

    fn cache_key() -> &'static str {
        <B::Kind as EntityKind>::ENTITY_PATH
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogState<B::Kind>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState<B::Kind>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn entities(&self) -> Vec<EntityOf<B::Kind>> {
        self.read().entities.clone()
    }

    pub fn installs(&self) -> Vec<InstallOf<B::Kind>> {
        self.read().installs.clone()
    }

    pub fn install_for(&self, entity_id: &str) -> Option<InstallOf<B::Kind>> {
        self.read()
            .installs
            .iter()
            .find(|install| install.entity_id() == entity_id)
            .cloned()
    }

    pub fn loading_id(&self) -> Option<String> {
        self.read().loading_id.clone()
    }

    /// Toggles whose request has not come back yet, oldest call first.
    pub fn pending_toggles(&self) -> Vec<PendingToggle> {
        let mut pending = self.read().pending.values().cloned().collect::<Vec<_>>();
        pending.sort_by_key(PendingToggle::call_id);
        pending
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Detaches the store from its view. Responses arriving afterwards are
    /// dropped without touching state or notifying.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    /// Seeds state from the snapshot cache. Only an empty store is seeded, so
    /// a snapshot never replaces lists already loaded from the server.
    /// Returns true if a snapshot was used.
    pub fn hydrate_from_cache(&self) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        {
            let state = self.read();
            if !state.entities.is_empty() || !state.installs.is_empty() {
                tracing::debug!("{} list already loaded, snapshot skipped", Self::label());
                return false;
            }
        }
        match cache.load::<EntityOf<B::Kind>, InstallOf<B::Kind>>(Self::cache_key()) {
            Ok(Some(snapshot)) => {
                tracing::debug!(
                    "Hydrated {} list from snapshot saved at {}",
                    Self::label(),
                    snapshot.saved_at
                );
                let mut state = self.write();
                if !state.entities.is_empty() || !state.installs.is_empty() {
                    return false;
                }
                state.entities = snapshot.entities;
                state.installs = snapshot.installs;
                true
            }
            Ok(None) => false,
            Err(err) => {
                tracing::warn!("Ignoring unreadable {} snapshot: {}", Self::label(), err);
                false
            }
        }
    }

    /// Re-fetches entities and installs together. Either both lists are
    /// replaced or neither is.
    pub async fn refresh(&self) -> bool {
        let (entities, installs) = tokio::join!(
            self.backend.list_entities(),
            self.backend.list_installs()
        );

        if !self.is_open() {
            tracing::debug!("{} refresh finished after close, dropped", Self::label());
            return false;
        }

        let (entities, installs) = match (entities, installs) {
            (Ok(entities), Ok(installs)) => (entities, installs),
            (Err(err), _) | (_, Err(err)) => {
                report(
                    self.notifier.as_ref(),
                    &format!("Load {} list", Self::label()),
                    &err,
                );
                return false;
            }
        };

        if let Some(cache) = &self.cache {
            if let Err(err) = cache.save(Self::cache_key(), &entities, &installs) {
                tracing::warn!("Failed to cache {} list: {}", Self::label(), err);
            }
        }

        tracing::debug!(
            "Loaded {} {} entries and {} installs",
            entities.len(),
            Self::label(),
            installs.len()
        );
        let mut state = self.write();
        state.entities = entities;
        state.installs = installs;
        true
    }

    /// Creates an install for `entity_id`. Nothing is applied before the
    /// server answers, so a failure leaves state as it was.
    pub async fn install(&self, entity_id: &str) -> Option<InstallOf<B::Kind>> {
        self.begin(entity_id);
        let result = self.backend.create_install(entity_id).await;

        if !self.is_open() {
            return result.ok();
        }

        match result {
            Ok(install) => {
                let name = {
                    let mut state = self.write();
                    state.installs.insert(0, install.clone());
                    state.loading_id = None;
                    Self::entity_name(&state, entity_id)
                };
                tracing::info!("Installed {} {}", Self::label(), entity_id);
                self.notifier
                    .notify(Notification::success(format!("Installed {}", name)));
                Some(install)
            }
            Err(err) => {
                self.finish();
                report(
                    self.notifier.as_ref(),
                    &format!("Install {} {}", Self::label(), entity_id),
                    &err,
                );
                None
            }
        }
    }

    /// Flips an install's enabled flag locally, then asks the server.
    ///
    /// On success the local record is replaced by the server's. On failure
    /// the flag goes back to the value captured when this call started.
    pub async fn set_enabled(&self, install_id: &str, enabled: bool) -> ToggleOutcome {
        let call_id = self.next_call.fetch_add(1, Ordering::SeqCst);

        let pending = {
            let mut state = self.write();
            let prior = state
                .installs
                .iter_mut()
                .find(|install| install.id() == install_id)
                .map(|install| {
                    let prior = install.enabled();
                    install.set_enabled(enabled);
                    prior
                });
            prior.map(|prior| {
                let toggle = PendingToggle::begin(call_id, install_id, prior, enabled);
                state.pending.insert(call_id, toggle.clone());
                state.loading_id = Some(install_id.to_string());
                toggle
            })
        };

        let Some(pending) = pending else {
            report(
                self.notifier.as_ref(),
                "Update install",
                &NovaError::not_found("Install", install_id),
            );
            return ToggleOutcome {
                call_id,
                state: ToggleState::Idle,
            };
        };

        let result = self.backend.update_install(install_id, enabled).await;

        if !self.is_open() {
            tracing::debug!("Toggle {} finished after close, dropped", call_id);
            let mut state = self.write();
            state.pending.remove(&call_id);
            if state.loading_id.as_deref() == Some(install_id) {
                state.loading_id = None;
            }
            return ToggleOutcome {
                call_id,
                state: pending.state(),
            };
        }

        let state = {
            let mut state = self.write();
            state.pending.remove(&call_id);
            let slot = state
                .installs
                .iter_mut()
                .find(|install| install.id() == install_id);
            let outcome = match (&result, slot) {
                (Ok(record), Some(slot)) => {
                    *slot = record.clone();
                    pending.commit(record.enabled())
                }
                (Ok(record), None) => pending.commit(record.enabled()),
                (Err(_), Some(slot)) => {
                    slot.set_enabled(pending.prior());
                    pending.roll_back()
                }
                (Err(_), None) => pending.roll_back(),
            };
            state.loading_id = None;
            outcome
        };

        if let Err(err) = &result {
            report(
                self.notifier.as_ref(),
                &format!("Update install {}", install_id),
                err,
            );
        }

        ToggleOutcome { call_id, state }
    }

    /// Deletes an entity server-side, then drops it and every install that
    /// references it from local state.
    pub async fn delete(&self, entity_id: &str) -> bool {
        self.begin(entity_id);
        let result = self.backend.delete_entity(entity_id).await;

        if !self.is_open() {
            return result.is_ok();
        }

        match result {
            Ok(()) => {
                let name = {
                    let mut state = self.write();
                    let name = Self::entity_name(&state, entity_id);
                    state.entities.retain(|entity| entity.id() != entity_id);
                    state
                        .installs
                        .retain(|install| install.entity_id() != entity_id);
                    state.loading_id = None;
                    name
                };
                self.notifier
                    .notify(Notification::success(format!("Deleted {}", name)));
                true
            }
            Err(err) => {
                self.finish();
                report(
                    self.notifier.as_ref(),
                    &format!("Delete {} {}", Self::label(), entity_id),
                    &err,
                );
                false
            }
        }
    }

    fn begin(&self, id: &str) {
        self.write().loading_id = Some(id.to_string());
    }

    fn finish(&self) {
        self.write().loading_id = None;
    }

    fn entity_name(state: &CatalogState<B::Kind>, entity_id: &str) -> String {
        state
            .entities
            .iter()
            .find(|entity| entity.id() == entity_id)
            .map(|entity| entity.display_name().to_string())
            .unwrap_or_else(|| entity_id.to_string())
    }
}
