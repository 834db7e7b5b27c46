use jsonschema::JSONSchema;
use serde::Serialize;
use serde_json::Value;

use crate::error::{NovaError, Result};

/// Checks an action input against a JSON Schema before any request is sent.
pub fn validate_input<T: Serialize>(label: &str, schema: &Value, input: &T) -> Result<()> {
    let instance = serde_json::to_value(input)?;
    let compiled = JSONSchema::compile(schema)
        .map_err(|e| NovaError::internal(format!("Invalid {} schema: {}", label, e)))?;

    if let Err(errors) = compiled.validate(&instance) {
        let messages = errors
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{}: {}", path.trim_start_matches('/'), error)
                }
            })
            .collect::<Vec<_>>();
        tracing::debug!("{} input rejected: {:?}", label, messages);
        return Err(NovaError::validation_error(format!(
            "Invalid {}: {}",
            label.to_lowercase(),
            messages.join("; ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::dto::{EnvVarCreateRequest, McpServerCreateRequest, McpTransport, Scope};
    use crate::catalog::kind::{EntityKind, EnvVarKind, McpKind};

    fn mcp_request(transport: McpTransport) -> McpServerCreateRequest {
        McpServerCreateRequest {
            name: "search".into(),
            description: None,
            transport,
            command: None,
            args: vec![],
            url: None,
            scope: Scope::User,
        }
    }

    #[test]
    fn stdio_server_requires_command() {
        let request = mcp_request(McpTransport::Stdio);
        let err = validate_input(McpKind::LABEL, &McpKind::create_schema(), &request).unwrap_err();
        assert!(matches!(err, NovaError::ValidationError { .. }));

        let request = McpServerCreateRequest {
            command: Some("npx".into()),
            ..mcp_request(McpTransport::Stdio)
        };
        validate_input(McpKind::LABEL, &McpKind::create_schema(), &request).unwrap();
    }

    #[test]
    fn remote_server_requires_http_url() {
        let request = McpServerCreateRequest {
            url: Some("ws://nope".into()),
            ..mcp_request(McpTransport::Sse)
        };
        assert!(validate_input(McpKind::LABEL, &McpKind::create_schema(), &request).is_err());
    }

    #[test]
    fn env_var_key_must_be_identifier() {
        let request = EnvVarCreateRequest {
            key: "1BAD KEY".into(),
            value: "x".into(),
            secret: false,
        };
        let err =
            validate_input(EnvVarKind::LABEL, &EnvVarKind::create_schema(), &request).unwrap_err();
        assert!(err.to_string().contains("key"));
    }
}
