//! Prompt repository trait

use async_trait::async_trait;

use super::{ConfigPayload, OrgId, Prompt, PromptId};
use crate::domain::model::ModelId;
use crate::domain::DomainError;

/// Repository trait for Prompt persistence
#[async_trait]
pub trait PromptRepository: Send + Sync + std::fmt::Debug {
    /// Get a prompt by ID
    async fn get(&self, id: &PromptId) -> Result<Option<Prompt>, DomainError>;

    /// Create a new prompt
    async fn create(&self, prompt: Prompt) -> Result<Prompt, DomainError>;

    /// Update an existing prompt (last-writer-wins)
    async fn update(&self, prompt: Prompt) -> Result<Prompt, DomainError>;

    /// Delete a prompt and its history, returns true if deleted
    async fn delete(&self, id: &PromptId) -> Result<bool, DomainError>;

    /// Get all prompts in an org referencing a model
    async fn list_by_model(
        &self,
        org_id: &OrgId,
        model_id: &ModelId,
    ) -> Result<Vec<Prompt>, DomainError>;

    /// Replace a prompt's configuration, returning the updated prompt
    async fn update_config(
        &self,
        id: &PromptId,
        config: ConfigPayload,
    ) -> Result<Prompt, DomainError>;

    /// Persist the cached commit-state flag
    async fn set_commit_flag(&self, id: &PromptId, committed: bool) -> Result<(), DomainError>;

    /// Count prompts in an org whose current model is one of the given ids
    async fn count_using_models(
        &self,
        org_id: &OrgId,
        model_ids: &[ModelId],
    ) -> Result<u64, DomainError>;
}
