pub mod backend;
pub mod cache;
pub mod dto;
pub mod kind;
pub mod store;
pub mod toggle;

pub use backend::{CatalogBackend, EntityOf, InstallOf};
pub use cache::{Snapshot, SnapshotCache};
pub use dto::{
    EnvVar, InstallToggle, McpInstall, McpServer, McpTransport, Personalization, Plugin,
    PluginInstall, Scope, Skill, SkillInstall, SourceInfo, SourceKind, SubAgent,
};
pub use kind::{
    CatalogEntity, CatalogInstall, CatalogKind, EntityKind, EnvVarKind, McpKind, PluginKind,
    SkillKind, SubAgentKind,
};
pub use store::CatalogStore;
pub use toggle::{PendingToggle, ToggleOutcome, ToggleState};
