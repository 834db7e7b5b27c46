use super::client::ApiClient;
use crate::catalog::dto::Personalization;
use crate::error::Result;

const PERSONALIZATION_PATH: &str = "personalization";

#[derive(Clone)]
pub struct PersonalizationApi {
    client: ApiClient,
}

impl PersonalizationApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<Personalization> {
        self.client.get_json(&[PERSONALIZATION_PATH]).await
    }

    /// Replaces the whole record.
    pub async fn update(&self, settings: &Personalization) -> Result<Personalization> {
        self.client.put_json(&[PERSONALIZATION_PATH], settings).await
    }
}
