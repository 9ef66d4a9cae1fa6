//! Prompt entity and related types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::commit::BranchId;
use crate::domain::model::ModelId;
use crate::domain::validation::{validate_identifier, IdentifierError};

/// Free-form model configuration carried by prompts and commits.
///
/// A sorted map keeps serialization deterministic, which the commit
/// fingerprint depends on.
pub type ConfigPayload = BTreeMap<String, serde_json::Value>;

/// Organization identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrgId(String);

impl OrgId {
    /// Create a new OrgId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, IdentifierError> {
        let id = id.into();
        validate_identifier(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrgId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrgId> for String {
    fn from(id: OrgId) -> Self {
        id.0
    }
}

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Prompt identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromptId(String);

impl PromptId {
    /// Create a new PromptId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, IdentifierError> {
        let id = id.into();
        validate_identifier(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PromptId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PromptId> for String {
    fn from(id: PromptId) -> Self {
        id.0
    }
}

impl std::fmt::Display for PromptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The hashable portion of a prompt: its text and model configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptSnapshot {
    pub value: String,
    pub config: ConfigPayload,
}

/// Prompt entity: an editable prompt with a cached commit-state flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    /// Unique identifier
    id: PromptId,
    /// Owning organization
    org_id: OrgId,
    /// Display name
    name: String,
    /// Current prompt text
    value: String,
    /// Current model configuration
    config: ConfigPayload,
    /// Language model this prompt targets
    model_id: ModelId,
    /// Branch grouping this prompt's commits
    branch_id: BranchId,
    /// Cached result of the last commit-state resolution
    committed: bool,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Prompt {
    /// Create a new Prompt with required fields
    pub fn new(
        id: PromptId,
        org_id: OrgId,
        name: impl Into<String>,
        value: impl Into<String>,
        model_id: ModelId,
        branch_id: BranchId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            org_id,
            name: name.into(),
            value: value.into(),
            config: ConfigPayload::new(),
            model_id,
            branch_id,
            committed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_config(mut self, config: ConfigPayload) -> Self {
        self.config = config;
        self
    }

    // Getters

    pub fn id(&self) -> &PromptId {
        &self.id
    }

    pub fn org_id(&self) -> &OrgId {
        &self.org_id
    }

    pub fn name(&self) -> &str {
        &self.name
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

    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Snapshot of the hashable content (text + configuration)
    pub fn snapshot(&self) -> PromptSnapshot {
        PromptSnapshot {
            value: self.value.clone(),
            config: self.config.clone(),
        }
    }

    // Mutators

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.touch();
    }

    pub fn set_config(&mut self, config: ConfigPayload) {
        self.config = config;
        self.touch();
    }

    /// Point the prompt at a different model, replacing its configuration
    pub fn set_model(&mut self, model_id: ModelId, config: ConfigPayload) {
        self.model_id = model_id;
        self.config = config;
        self.touch();
    }

    /// Update the cached commit-state flag
    pub fn set_committed(&mut self, committed: bool) {
        self.committed = committed;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commit::BranchId;
    use crate::domain::model::ModelId;

    fn create_prompt(id: &str) -> Prompt {
        Prompt::new(
            PromptId::new(id).unwrap(),
            OrgId::new("acme").unwrap(),
            format!("Prompt {}", id),
            "You are a helpful assistant.",
            ModelId::generate(),
            BranchId::generate(),
        )
    }

    #[test]
    fn test_prompt_id_valid() {
        let id = PromptId::new("my-prompt-1").unwrap();
        assert_eq!(id.as_str(), "my-prompt-1");
    }

    #[test]
    fn test_prompt_id_invalid() {
        assert!(PromptId::new("invalid_prompt!").is_err());
    }

    #[test]
    fn test_prompt_creation() {
        let prompt = create_prompt("welcome");

        assert_eq!(prompt.id().as_str(), "welcome");
        assert_eq!(prompt.org_id().as_str(), "acme");
        assert_eq!(prompt.value(), "You are a helpful assistant.");
        assert!(prompt.config().is_empty());
        assert!(!prompt.is_committed());
    }

    #[test]
    fn test_prompt_snapshot_tracks_edits() {
        let mut prompt = create_prompt("edited");
        let before = prompt.snapshot();

        prompt.set_value("You are a terse assistant.");
        let after = prompt.snapshot();

        assert_ne!(before, after);
        assert_eq!(after.value, "You are a terse assistant.");
    }

    #[test]
    fn test_prompt_set_model_replaces_config() {
        let mut prompt = create_prompt("migrated");
        let mut config = ConfigPayload::new();
        config.insert("temperature".to_string(), serde_json::json!(0.5));
        prompt.set_config(config);

        let next_model = ModelId::generate();
        prompt.set_model(next_model, ConfigPayload::new());

        assert_eq!(prompt.model_id(), next_model);
        assert!(prompt.config().is_empty());
    }
}
