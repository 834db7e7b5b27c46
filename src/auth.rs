use crate::config::AuthConfig;

/// Attaches the configured API key to outgoing requests.
#[derive(Clone, Debug)]
pub struct ApiKeyAuth {
    header_name: String,
    key: Option<String>,
}

impl ApiKeyAuth {
    pub fn new(cfg: &AuthConfig) -> Self {
        Self {
            header_name: cfg.header_name.clone(),
            key: cfg
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        }
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    pub fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.key {
            Some(key) => request.header(self.header_name.as_str(), key.as_str()),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_disables_auth() {
        let cfg = AuthConfig {
            api_key: Some("   ".into()),
            header_name: "x-api-key".into(),
        };
        assert!(!ApiKeyAuth::new(&cfg).is_enabled());
    }

    #[test]
    fn apply_sets_header() {
        let cfg = AuthConfig {
            api_key: Some("secret".into()),
            header_name: "x-api-key".into(),
        };
        let auth = ApiKeyAuth::new(&cfg);
        let request = auth
            .apply(reqwest::Client::new().get("http://localhost/"))
            .build()
            .unwrap();
        assert_eq!(request.headers().get("x-api-key").unwrap(), "secret");
    }
}
