//! Static description of each catalog entity type: its records, request
//! payloads, REST paths and input schema.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::dto::{
    EnvVar, EnvVarCreateRequest, EnvVarUpdateRequest, McpInstall, McpServer,
    McpServerCreateRequest, McpServerUpdateRequest, Plugin, PluginCreateRequest, PluginInstall,
    PluginUpdateRequest, Skill, SkillCreateRequest, SkillInstall, SkillUpdateRequest, SubAgent,
    SubAgentCreateRequest, SubAgentUpdateRequest,
};

pub trait CatalogEntity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
}

pub trait CatalogInstall: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    fn id(&self) -> &str;
    /// Id of the entity this install points at.
    fn entity_id(&self) -> &str;
    fn enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
}

/// An entity type served under its own REST collection.
pub trait EntityKind: Send + Sync + 'static {
    type Entity: CatalogEntity;
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;

    /// Human label used in logs and notifications.
    const LABEL: &'static str;
    const ENTITY_PATH: &'static str;

    /// JSON Schema the create payload must satisfy before it is sent.
    fn create_schema() -> Value;
}

/// An entity type that users install, with a per-user install collection.
pub trait CatalogKind: EntityKind {
    type Install: CatalogInstall;

    const INSTALL_PATH: &'static str;
    /// Field carrying the entity id in a create-install body.
    const ENTITY_ID_FIELD: &'static str;
}

fn name_schema() -> Value {
    json!({ "type": "string", "minLength": 1, "maxLength": 128, "pattern": "\\S" })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PluginKind;

impl EntityKind for PluginKind {
    type Entity = Plugin;
    type Create = PluginCreateRequest;
    type Update = PluginUpdateRequest;

    const LABEL: &'static str = "Plugin";
    const ENTITY_PATH: &'static str = "plugins";

    fn create_schema() -> Value {
        json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": name_schema(),
                "description": { "type": "string", "maxLength": 2000 },
                "entry": { "type": "string", "minLength": 1 },
                "scope": { "enum": ["user", "shared", "system"] },
                "manifest": { "type": ["object", "null"] }
            }
        })
    }
}

impl CatalogKind for PluginKind {
    type Install = PluginInstall;

    const INSTALL_PATH: &'static str = "plugin-installs";
    const ENTITY_ID_FIELD: &'static str = "plugin_id";
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SkillKind;

impl EntityKind for SkillKind {
    type Entity = Skill;
    type Create = SkillCreateRequest;
    type Update = SkillUpdateRequest;

    const LABEL: &'static str = "Skill";
    const ENTITY_PATH: &'static str = "skills";

    fn create_schema() -> Value {
        json!({
            "type": "object",
            "required": ["name", "content"],
            "properties": {
                "name": name_schema(),
                "description": { "type": "string", "maxLength": 2000 },
                "content": { "type": "string", "minLength": 1 },
                "scope": { "enum": ["user", "shared", "system"] }
            }
        })
    }
}

impl CatalogKind for SkillKind {
    type Install = SkillInstall;

    const INSTALL_PATH: &'static str = "skill-installs";
    const ENTITY_ID_FIELD: &'static str = "skill_id";
}

#[derive(Debug, Clone, Copy, Default)]
pub struct McpKind;

impl EntityKind for McpKind {
    type Entity = McpServer;
    type Create = McpServerCreateRequest;
    type Update = McpServerUpdateRequest;

    const LABEL: &'static str = "MCP server";
    const ENTITY_PATH: &'static str = "mcp-servers";

    fn create_schema() -> Value {
        // stdio servers need a command, remote ones a url
        json!({
            "type": "object",
            "required": ["name", "transport"],
            "properties": {
                "name": name_schema(),
                "transport": { "enum": ["stdio", "http", "sse"] },
                "command": { "type": "string", "minLength": 1 },
                "args": { "type": "array", "items": { "type": "string" } },
                "url": { "type": "string", "pattern": "^https?://" }
            },
            "oneOf": [
                {
                    "properties": { "transport": { "const": "stdio" } },
                    "required": ["command"]
                },
                {
                    "properties": { "transport": { "enum": ["http", "sse"] } },
                    "required": ["url"]
                }
            ]
        })
    }
}

impl CatalogKind for McpKind {
    type Install = McpInstall;

    const INSTALL_PATH: &'static str = "mcp-installs";
    const ENTITY_ID_FIELD: &'static str = "server_id";
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubAgentKind;

impl EntityKind for SubAgentKind {
    type Entity = SubAgent;
    type Create = SubAgentCreateRequest;
    type Update = SubAgentUpdateRequest;

    const LABEL: &'static str = "Sub-agent";
    const ENTITY_PATH: &'static str = "sub-agents";

    fn create_schema() -> Value {
        json!({
            "type": "object",
            "required": ["name", "system_prompt"],
            "properties": {
                "name": name_schema(),
                "model": { "type": "string", "minLength": 1 },
                "tools": {
                    "type": "array",
                    "items": { "type": "string", "minLength": 1 },
                    "uniqueItems": true
                },
                "system_prompt": { "type": "string", "minLength": 1 }
            }
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVarKind;

impl EntityKind for EnvVarKind {
    type Entity = EnvVar;
    type Create = EnvVarCreateRequest;
    type Update = EnvVarUpdateRequest;

    const LABEL: &'static str = "Environment variable";
    const ENTITY_PATH: &'static str = "env-vars";

    fn create_schema() -> Value {
        json!({
            "type": "object",
            "required": ["key", "value"],
            "properties": {
                "key": { "type": "string", "pattern": "^[A-Za-z_][A-Za-z0-9_]*$", "maxLength": 256 },
                "value": { "type": "string" },
                "secret": { "type": "boolean" }
            }
        })
    }
}

macro_rules! impl_entity {
    ($ty:ty, $name:ident) => {
        impl CatalogEntity for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn display_name(&self) -> &str {
                &self.$name
            }
        }
    };
}

impl_entity!(Plugin, name);
impl_entity!(Skill, name);
impl_entity!(McpServer, name);
impl_entity!(SubAgent, name);
impl_entity!(EnvVar, key);

macro_rules! impl_install {
    ($ty:ty, $entity_field:ident) => {
        impl CatalogInstall for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn entity_id(&self) -> &str {
                &self.$entity_field
            }

            fn enabled(&self) -> bool {
                self.enabled
            }

            fn set_enabled(&mut self, enabled: bool) {
                self.enabled = enabled;
            }
        }
    };
}

impl_install!(PluginInstall, plugin_id);
impl_install!(SkillInstall, skill_id);
impl_install!(McpInstall, server_id);
