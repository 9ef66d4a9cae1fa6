//! Commit repository trait

use async_trait::async_trait;

use super::{Branch, BranchId, Commit};
use crate::domain::model::ModelId;
use crate::domain::prompt::{OrgId, PromptId};
use crate::domain::DomainError;

/// Repository trait for Commit and Branch persistence
#[async_trait]
pub trait CommitRepository: Send + Sync + std::fmt::Debug {
    /// Store a new commit; the newest commit of a prompt is its productive one
    async fn create(&self, commit: Commit) -> Result<Commit, DomainError>;

    /// The commit currently served for a prompt, if any
    async fn productive_commit(&self, prompt_id: &PromptId)
        -> Result<Option<Commit>, DomainError>;

    /// Number of commits recorded for a prompt
    async fn commit_count(&self, prompt_id: &PromptId) -> Result<u64, DomainError>;

    /// All commits for a prompt, oldest first
    async fn list_by_prompt(&self, prompt_id: &PromptId) -> Result<Vec<Commit>, DomainError>;

    /// All commits in an org referencing any of the given models
    async fn list_using_models(
        &self,
        org_id: &OrgId,
        model_ids: &[ModelId],
    ) -> Result<Vec<Commit>, DomainError>;

    /// Count productive commits in an org referencing any of the given models
    async fn count_productive_using_models(
        &self,
        org_id: &OrgId,
        model_ids: &[ModelId],
    ) -> Result<u64, DomainError>;

    /// Create a branch
    async fn create_branch(&self, branch: Branch) -> Result<Branch, DomainError>;

    /// Get a branch by ID
    async fn get_branch(&self, id: &BranchId) -> Result<Option<Branch>, DomainError>;
}
