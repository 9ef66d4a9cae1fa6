//! Provider API key domain module

mod entity;
mod repository;

pub use entity::{ProviderApiKey, ProviderApiKeyId};
pub use repository::ProviderKeyRepository;
