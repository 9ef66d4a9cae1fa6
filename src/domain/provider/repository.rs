//! Provider API key repository trait

use async_trait::async_trait;

use super::{ProviderApiKey, ProviderApiKeyId};
use crate::domain::prompt::OrgId;
use crate::domain::DomainError;

/// Repository trait for ProviderApiKey persistence
#[async_trait]
pub trait ProviderKeyRepository: Send + Sync + std::fmt::Debug {
    /// Get a provider key by ID
    async fn get(&self, id: &ProviderApiKeyId) -> Result<Option<ProviderApiKey>, DomainError>;

    /// The org's custom provider key, if configured
    async fn find_by_org(&self, org_id: &OrgId) -> Result<Option<ProviderApiKey>, DomainError>;

    /// Create a new provider key
    async fn create(&self, key: ProviderApiKey) -> Result<ProviderApiKey, DomainError>;

    /// Delete a provider key by ID, returns true if deleted
    async fn delete(&self, id: &ProviderApiKeyId) -> Result<bool, DomainError>;
}
