//! Commit and branch entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::model::ModelId;
use crate::domain::prompt::{ConfigPayload, PromptId};

/// Commit identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(Uuid);

impl CommitId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for CommitId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Branch identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(Uuid);

impl BranchId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for BranchId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BranchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a prompt's current content matches its productive commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    Committed,
    Dirty,
}

impl CommitState {
    pub fn is_committed(self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Branch entity grouping a prompt's ordered commits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    id: BranchId,
    prompt_id: PromptId,
    name: String,
    created_at: DateTime<Utc>,
}

impl Branch {
    pub fn new(id: BranchId, prompt_id: PromptId, name: impl Into<String>) -> Self {
        Self {
            id,
            prompt_id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> BranchId {
        self.id
    }

    pub fn prompt_id(&self) -> &PromptId {
        &self.prompt_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A committed version of a prompt.
///
/// Commits are immutable once created; the only mutation is the fallback
/// migration rewriting references to a deleted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    id: CommitId,
    prompt_id: PromptId,
    branch_id: BranchId,
    /// Fingerprint of (value, config, generation) at commit time
    commit_hash: String,
    value: String,
    config: ConfigPayload,
    model_id: ModelId,
    created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    created_at: DateTime<Utc>,
}

impl Commit {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: CommitId,
        prompt_id: PromptId,
        branch_id: BranchId,
        commit_hash: impl Into<String>,
        value: impl Into<String>,
        config: ConfigPayload,
        model_id: ModelId,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id,
            prompt_id,
            branch_id,
            commit_hash: commit_hash.into(),
            value: value.into(),
            config,
            model_id,
            created_by: created_by.into(),
            message: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn id(&self) -> CommitId {
        self.id
    }

    pub fn prompt_id(&self) -> &PromptId {
        &self.prompt_id
    }

    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    pub fn commit_hash(&self) -> &str {
        &self.commit_hash
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn config(&self) -> &ConfigPayload {
        &self.config
    }

    pub fn model_id(&self) -> ModelId {
        self.model_id
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Rewrite the model reference during a fallback migration
    pub(crate) fn reset_model(&mut self, model_id: ModelId, config: ConfigPayload) {
        self.model_id = model_id;
        self.config = config;
    }
}
