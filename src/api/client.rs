use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::attachments::AttachmentsApi;
use super::entities::{CatalogApi, EntityApi};
use super::helpers::{build_url, ensure_success, read_json};
use super::import::ImportApi;
use super::personalization::PersonalizationApi;
use crate::auth::ApiKeyAuth;
use crate::catalog::kind::{EnvVarKind, McpKind, PluginKind, SkillKind, SubAgentKind};
use crate::config::NovaConfig;
use crate::error::{NovaError, Result};

/// Thin JSON client for the catalog backend. One call per domain operation,
/// no retries and no caching.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: ApiKeyAuth,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &NovaConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.api.timeout())
            .user_agent(config.api.user_agent.as_str())
            .build()
            .map_err(NovaError::NetworkError)?;
        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            auth: ApiKeyAuth::new(&config.auth),
            upload_timeout: config.api.upload_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn plugins(&self) -> CatalogApi<PluginKind> {
        CatalogApi::new(self.clone())
    }

    pub fn skills(&self) -> CatalogApi<SkillKind> {
        CatalogApi::new(self.clone())
    }

    pub fn mcp_servers(&self) -> CatalogApi<McpKind> {
        CatalogApi::new(self.clone())
    }

    pub fn sub_agents(&self) -> EntityApi<SubAgentKind> {
        EntityApi::new(self.clone())
    }

    pub fn env_vars(&self) -> EntityApi<EnvVarKind> {
        EntityApi::new(self.clone())
    }

    pub fn personalization(&self) -> PersonalizationApi {
        PersonalizationApi::new(self.clone())
    }

    pub fn imports(&self) -> ImportApi {
        ImportApi::new(self.clone())
    }

    pub fn attachments(&self) -> AttachmentsApi {
        AttachmentsApi::new(self.clone())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = build_url(&self.base_url, segments);
        tracing::debug!("GET {}", url);
        let response = self
            .auth
            .apply(self.http.get(&url))
            .send()
            .await
            .map_err(NovaError::NetworkError)?;
        read_json(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = build_url(&self.base_url, segments);
        tracing::debug!("POST {}", url);
        let response = self
            .auth
            .apply(self.http.post(&url))
            .json(body)
            .send()
            .await
            .map_err(NovaError::NetworkError)?;
        read_json(response).await
    }

    pub(crate) async fn patch_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = build_url(&self.base_url, segments);
        tracing::debug!("PATCH {}", url);
        let response = self
            .auth
            .apply(self.http.patch(&url))
            .json(body)
            .send()
            .await
            .map_err(NovaError::NetworkError)?;
        read_json(response).await
    }

    pub(crate) async fn put_json<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = build_url(&self.base_url, segments);
        tracing::debug!("PUT {}", url);
        let response = self
            .auth
            .apply(self.http.put(&url))
            .json(body)
            .send()
            .await
            .map_err(NovaError::NetworkError)?;
        read_json(response).await
    }

    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<()> {
        let url = build_url(&self.base_url, segments);
        tracing::debug!("DELETE {}", url);
        let response = self
            .auth
            .apply(self.http.delete(&url))
            .send()
            .await
            .map_err(NovaError::NetworkError)?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Multipart upload, with the extended upload timeout.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let url = build_url(&self.base_url, segments);
        tracing::debug!("POST (multipart) {}", url);
        let response = self
            .auth
            .apply(self.http.post(&url))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(NovaError::NetworkError)?;
        read_json(response).await
    }
}

pub(crate) fn file_part(file_name: &str, bytes: Vec<u8>) -> reqwest::multipart::Part {
    reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string())
}
