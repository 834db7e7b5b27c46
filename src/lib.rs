pub mod api;
pub mod attachments;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod import;
pub mod notify;
pub mod validation;

pub use api::ApiClient;
pub use auth::ApiKeyAuth;
pub use catalog::CatalogStore;
pub use config::NovaConfig;
pub use error::{NovaError, Result};
pub use import::ImportSession;
