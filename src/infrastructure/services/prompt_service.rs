//! Prompt service - CRUD and edit operations for prompts

use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    Branch, BranchId, CommitRepository, CommitState, ConfigPayload, DomainError, ModelId,
    ModelRepository, OrgId, Prompt, PromptId, PromptRepository,
};

use super::commit_service::CommitService;
use super::model_config_service::ModelConfigService;

/// Request to create a new prompt
#[derive(Debug, Clone)]
pub struct CreatePromptRequest {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub value: String,
    pub model_id: ModelId,
    pub config: Option<ConfigPayload>,
}

/// Prompt service driving edits through reconciliation and commit-state
/// resolution.
#[derive(Debug)]
pub struct PromptService {
    prompts: Arc<dyn PromptRepository>,
    commits: Arc<dyn CommitRepository>,
    models: Arc<dyn ModelRepository>,
    commit_service: Arc<CommitService>,
    model_config: Arc<ModelConfigService>,
}

impl PromptService {
    pub fn new(
        prompts: Arc<dyn PromptRepository>,
        commits: Arc<dyn CommitRepository>,
        models: Arc<dyn ModelRepository>,
        commit_service: Arc<CommitService>,
        model_config: Arc<ModelConfigService>,
    ) -> Self {
        Self {
            prompts,
            commits,
            models,
            commit_service,
            model_config,
        }
    }

    /// Get a prompt by ID
    pub async fn get(&self, id: &str) -> Result<Option<Prompt>, DomainError> {
        let prompt_id = parse_prompt_id(id)?;
        self.prompts.get(&prompt_id).await
    }

    /// Get a prompt by ID, returning an error if not found
    pub async fn get_required(&self, id: &str) -> Result<Prompt, DomainError> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Prompt '{}' not found", id)))
    }

    /// Create a new prompt on a fresh `main` branch.
    ///
    /// The configuration is reconciled against the target model's schema
    /// before it is stored, so an invalid payload never lands.
    pub async fn create(&self, request: CreatePromptRequest) -> Result<Prompt, DomainError> {
        let prompt_id = parse_prompt_id(&request.id)?;
        let org_id =
            OrgId::new(request.org_id).map_err(|e| DomainError::validation(e.to_string()))?;

        let model = self
            .models
            .get(&request.model_id)
            .await?
            .ok_or(DomainError::ModelNotFound {
                id: request.model_id,
            })?;

        let config = self.model_config.reconcile_config(
            model.vendor(),
            model.name(),
            &request.config.unwrap_or_default(),
            model.parameters_schema(),
        );

        let branch = Branch::new(BranchId::generate(), prompt_id.clone(), "main");
        let branch = self.commits.create_branch(branch).await?;

        let prompt = Prompt::new(
            prompt_id,
            org_id,
            request.name,
            request.value,
            model.id(),
            branch.id(),
        )
        .with_config(config);

        let prompt = self.prompts.create(prompt).await?;
        debug!(prompt_id = %prompt.id(), "created prompt");
        Ok(prompt)
    }

    /// Edit a prompt's text, re-resolving its commit state
    pub async fn edit_value(&self, id: &str, value: impl Into<String>) -> Result<Prompt, DomainError> {
        let mut prompt = self.get_required(id).await?;
        prompt.set_value(value);
        let prompt = self.prompts.update(prompt).await?;
        self.refresh_state(prompt).await
    }

    /// Edit a prompt's configuration.
    ///
    /// The payload passes through reconciliation first, then the commit
    /// state is re-resolved.
    pub async fn edit_config(&self, id: &str, config: ConfigPayload) -> Result<Prompt, DomainError> {
        let mut prompt = self.get_required(id).await?;

        let model = self
            .models
            .get(&prompt.model_id())
            .await?
            .ok_or(DomainError::ModelNotFound {
                id: prompt.model_id(),
            })?;

        let reconciled = self.model_config.reconcile_config(
            model.vendor(),
            model.name(),
            &config,
            model.parameters_schema(),
        );

        prompt.set_config(reconciled);
        let prompt = self.prompts.update(prompt).await?;
        self.refresh_state(prompt).await
    }

    /// Point a prompt at a different model, carrying its configuration
    /// over through reconciliation against the new model's schema.
    pub async fn change_model(&self, id: &str, model_id: ModelId) -> Result<Prompt, DomainError> {
        let mut prompt = self.get_required(id).await?;

        let model = self
            .models
            .get(&model_id)
            .await?
            .ok_or(DomainError::ModelNotFound { id: model_id })?;

        let config = self.model_config.reconcile_config(
            model.vendor(),
            model.name(),
            prompt.config(),
            model.parameters_schema(),
        );

        prompt.set_model(model.id(), config);
        let prompt = self.prompts.update(prompt).await?;
        self.refresh_state(prompt).await
    }

    /// Delete a prompt and its history
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let prompt_id = parse_prompt_id(id)?;
        self.prompts.delete(&prompt_id).await
    }

    async fn refresh_state(&self, mut prompt: Prompt) -> Result<Prompt, DomainError> {
        let state = self.commit_service.resolve_state(&prompt).await?;
        prompt.set_committed(state == CommitState::Committed);
        Ok(prompt)
    }
}

fn parse_prompt_id(id: &str) -> Result<PromptId, DomainError> {
    PromptId::new(id).map_err(|e| DomainError::validation(e.to_string()))
}
