use async_trait::async_trait;

use super::kind::{CatalogKind, EntityKind};
use crate::error::Result;

pub type EntityOf<K> = <K as EntityKind>::Entity;
pub type InstallOf<K> = <K as CatalogKind>::Install;

/// The calls a [`CatalogStore`](super::CatalogStore) needs from the backend.
#[async_trait]
pub trait CatalogBackend: Send + Sync + 'static {
    type Kind: CatalogKind;

    async fn list_entities(&self) -> Result<Vec<EntityOf<Self::Kind>>>;

    async fn list_installs(&self) -> Result<Vec<InstallOf<Self::Kind>>>;

    async fn create_install(&self, entity_id: &str) -> Result<InstallOf<Self::Kind>>;

    async fn update_install(
        &self,
        install_id: &str,
        enabled: bool,
    ) -> Result<InstallOf<Self::Kind>>;

    async fn delete_entity(&self, entity_id: &str) -> Result<()>;
}
