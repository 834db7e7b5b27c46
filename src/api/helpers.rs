use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{NovaError, Result};

pub(crate) fn build_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(&urlencoding::encode(segment.trim_matches('/')));
    }
    url
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Turns a non-2xx response into a business error carrying the backend's text.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error).or(parsed.detail))
        .unwrap_or_else(|| body.trim().to_string());

    tracing::warn!("Catalog API returned {}: {}", status, message);
    Err(NovaError::api_error(status.as_u16(), message))
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await.map_err(NovaError::NetworkError)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_and_encodes() {
        assert_eq!(
            build_url("http://host/api/", &["plugins", "/a b/"]),
            "http://host/api/plugins/a%20b"
        );
        assert_eq!(
            build_url("http://host/api", &["plugin-installs", "bulk"]),
            "http://host/api/plugin-installs/bulk"
        );
    }
}
