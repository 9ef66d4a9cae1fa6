//! Atomic batch operations over the storage backend

use async_trait::async_trait;

use crate::domain::commit::CommitId;
use crate::domain::model::ModelId;
use crate::domain::prompt::{ConfigPayload, PromptId};
use crate::domain::provider::ProviderApiKeyId;
use crate::domain::DomainError;

/// One step of an all-or-nothing storage batch
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Point a prompt's live state at a different model
    ResetPromptModel {
        prompt_id: PromptId,
        model_id: ModelId,
        config: ConfigPayload,
    },
    /// Rewrite a stored commit's model reference
    ResetCommitModel {
        commit_id: CommitId,
        model_id: ModelId,
        config: ConfigPayload,
    },
    /// Delete a language model
    DeleteModel { model_id: ModelId },
    /// Delete a provider API key
    DeleteProviderKey { key_id: ProviderApiKeyId },
}

/// Storage backends that can apply a batch of operations atomically.
///
/// Either every operation is applied or none is; a failed operation must
/// leave no observable partial state.
#[async_trait]
pub trait AtomicStore: Send + Sync + std::fmt::Debug {
    async fn run_atomic_batch(&self, operations: Vec<BatchOperation>) -> Result<(), DomainError>;
}
