use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use super::client::ApiClient;
use crate::catalog::backend::{CatalogBackend, EntityOf, InstallOf};
use crate::catalog::dto::InstallToggle;
use crate::catalog::kind::{CatalogEntity, CatalogKind, EntityKind};
use crate::error::Result;
use crate::validation::validate_input;

/// CRUD over one entity collection.
pub struct EntityApi<K: EntityKind> {
    client: ApiClient,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind> Clone for EntityApi<K> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<K: EntityKind> EntityApi<K> {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<K::Entity>> {
        self.client.get_json(&[K::ENTITY_PATH]).await
    }

    pub async fn get(&self, id: &str) -> Result<K::Entity> {
        self.client.get_json(&[K::ENTITY_PATH, id]).await
    }

    pub async fn create(&self, request: &K::Create) -> Result<K::Entity> {
        validate_input(K::LABEL, &K::create_schema(), request)?;
        let entity: K::Entity = self.client.post_json(&[K::ENTITY_PATH], request).await?;
        tracing::info!("Created {} {}", K::LABEL, entity.id());
        Ok(entity)
    }

    pub async fn update(&self, id: &str, request: &K::Update) -> Result<K::Entity> {
        self.client.patch_json(&[K::ENTITY_PATH, id], request).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&[K::ENTITY_PATH, id]).await?;
        tracing::info!("Deleted {} {}", K::LABEL, id);
        Ok(())
    }
}

#[derive(Serialize)]
struct InstallUpdateBody {
    enabled: bool,
}

#[derive(Serialize)]
struct BulkInstallBody<'a> {
    updates: &'a [InstallToggle],
}

/// Entity CRUD plus the per-user install collection of an installable kind.
pub struct CatalogApi<K: CatalogKind> {
    entities: EntityApi<K>,
    client: ApiClient,
}

impl<K: CatalogKind> Clone for CatalogApi<K> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<K: CatalogKind> CatalogApi<K> {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self {
            entities: EntityApi::new(client.clone()),
            client,
        }
    }

    pub fn entities(&self) -> &EntityApi<K> {
        &self.entities
    }

    pub async fn list_installs(&self) -> Result<Vec<K::Install>> {
        self.client.get_json(&[K::INSTALL_PATH]).await
    }

    pub async fn create_install(&self, entity_id: &str) -> Result<K::Install> {
        let mut body = Map::new();
        body.insert(
            K::ENTITY_ID_FIELD.to_string(),
            Value::String(entity_id.to_string()),
        );
        self.client.post_json(&[K::INSTALL_PATH], &body).await
    }

    pub async fn update_install(&self, install_id: &str, enabled: bool) -> Result<K::Install> {
        self.client
            .patch_json(&[K::INSTALL_PATH, install_id], &InstallUpdateBody { enabled })
            .await
    }

    pub async fn bulk_update_installs(&self, updates: &[InstallToggle]) -> Result<Vec<K::Install>> {
        if updates.is_empty() {
            return Ok(Vec::new());
        }
        self.client
            .patch_json(&[K::INSTALL_PATH, "bulk"], &BulkInstallBody { updates })
            .await
    }

    pub async fn delete_install(&self, install_id: &str) -> Result<()> {
        self.client.delete(&[K::INSTALL_PATH, install_id]).await
    }
}

#[async_trait]
impl<K: CatalogKind> CatalogBackend for CatalogApi<K> {
    type Kind = K;

    async fn list_entities(&self) -> Result<Vec<EntityOf<K>>> {
        self.entities.list().await
    }

    async fn list_installs(&self) -> Result<Vec<InstallOf<K>>> {
        CatalogApi::list_installs(self).await
    }

    async fn create_install(&self, entity_id: &str) -> Result<InstallOf<K>> {
        CatalogApi::create_install(self, entity_id).await
    }

    async fn update_install(&self, install_id: &str, enabled: bool) -> Result<InstallOf<K>> {
        CatalogApi::update_install(self, install_id, enabled).await
    }

    async fn delete_entity(&self, entity_id: &str) -> Result<()> {
        self.entities.delete(entity_id).await
    }
}
