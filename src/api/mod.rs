pub mod attachments;
pub mod client;
pub mod entities;
mod helpers;
pub mod import;
pub mod personalization;

pub use attachments::AttachmentsApi;
pub use client::ApiClient;
pub use entities::{CatalogApi, EntityApi};
pub use import::ImportApi;
pub use personalization::PersonalizationApi;
