//! Language model repository trait

use async_trait::async_trait;

use super::{LanguageModel, ModelId};
use crate::domain::provider::ProviderApiKeyId;
use crate::domain::DomainError;

/// Repository trait for LanguageModel persistence
#[async_trait]
pub trait ModelRepository: Send + Sync + std::fmt::Debug {
    /// Get a model by ID
    async fn get(&self, id: &ModelId) -> Result<Option<LanguageModel>, DomainError>;

    /// Get all models
    async fn list(&self) -> Result<Vec<LanguageModel>, DomainError>;

    /// Get all models owned by a provider API key
    async fn list_by_provider_key(
        &self,
        key_id: &ProviderApiKeyId,
    ) -> Result<Vec<LanguageModel>, DomainError>;

    /// Create a new model
    async fn create(&self, model: LanguageModel) -> Result<LanguageModel, DomainError>;

    /// Update an existing model
    async fn update(&self, model: LanguageModel) -> Result<LanguageModel, DomainError>;

    /// Delete a model by ID, returns true if deleted
    async fn delete(&self, id: &ModelId) -> Result<bool, DomainError>;
}
