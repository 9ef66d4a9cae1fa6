//! Provider deletion service - deletability planning and atomic fallback
//! migration

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    AtomicStore, BatchOperation, CommitRepository, DomainError, ModelId, ModelRepository, OrgId,
    ParameterSchemaRegistry, PromptRepository, ProviderApiKeyId, ProviderKeyRepository,
};

/// Deletability assessment for an org's custom provider.
///
/// Carries both usage counts so callers can explain exactly why a
/// deletion is blocked instead of reporting a bare boolean.
#[derive(Debug, Clone)]
pub struct DeletionPlan {
    pub provider_key_id: ProviderApiKeyId,
    pub model_ids: Vec<ModelId>,
    pub live_usage: u64,
    pub committed_usage: u64,
    pub can_delete: bool,
}

/// Result of an executed provider deletion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub reassigned_prompts: u64,
    pub reassigned_commits: u64,
    pub deleted_models: u64,
}

/// Guards provider removal behind usage counts and performs the
/// all-or-nothing fallback migration.
#[derive(Debug)]
pub struct ProviderDeletionService {
    prompts: Arc<dyn PromptRepository>,
    commits: Arc<dyn CommitRepository>,
    models: Arc<dyn ModelRepository>,
    provider_keys: Arc<dyn ProviderKeyRepository>,
    atomic: Arc<dyn AtomicStore>,
    registry: Arc<ParameterSchemaRegistry>,
    fallback_model_id: ModelId,
}

impl ProviderDeletionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        prompts: Arc<dyn PromptRepository>,
        commits: Arc<dyn CommitRepository>,
        models: Arc<dyn ModelRepository>,
        provider_keys: Arc<dyn ProviderKeyRepository>,
        atomic: Arc<dyn AtomicStore>,
        registry: Arc<ParameterSchemaRegistry>,
        fallback_model_id: ModelId,
    ) -> Self {
        Self {
            prompts,
            commits,
            models,
            provider_keys,
            atomic,
            registry,
            fallback_model_id,
        }
    }

    /// Assess whether the org's custom provider can be deleted.
    ///
    /// Returns `None` when the org has no custom provider. Live and
    /// committed usage are counted independently: a prompt's editable
    /// state and its productive commit can reference different models.
    pub async fn plan_deletion(&self, org_id: &OrgId) -> Result<Option<DeletionPlan>, DomainError> {
        let Some(key) = self.provider_keys.find_by_org(org_id).await? else {
            return Ok(None);
        };

        let model_ids: Vec<ModelId> = self
            .models
            .list_by_provider_key(&key.id())
            .await?
            .iter()
            .map(|m| m.id())
            .collect();

        let live_usage = self.prompts.count_using_models(org_id, &model_ids).await?;
        let committed_usage = self
            .commits
            .count_productive_using_models(org_id, &model_ids)
            .await?;

        Ok(Some(DeletionPlan {
            provider_key_id: key.id(),
            model_ids,
            live_usage,
            committed_usage,
            can_delete: live_usage == 0 && committed_usage == 0,
        }))
    }

    /// Delete the org's custom provider and its models, migrating every
    /// remaining reference to the fallback model in one atomic batch.
    ///
    /// The usage counts and the batch are separate storage operations;
    /// a prompt starting to reference a doomed model in that window is an
    /// accepted race of the optimistic check. Re-planning here narrows
    /// the window without closing it.
    pub async fn execute_deletion(&self, org_id: &OrgId) -> Result<DeletionOutcome, DomainError> {
        let plan = self
            .plan_deletion(org_id)
            .await?
            .ok_or_else(|| DomainError::ProviderNotConfigured {
                org_id: org_id.clone(),
            })?;

        if !plan.can_delete {
            return Err(DomainError::ProviderDeletionBlocked {
                live_usage: plan.live_usage,
                committed_usage: plan.committed_usage,
            });
        }

        let fallback = self
            .models
            .get(&self.fallback_model_id)
            .await?
            .ok_or(DomainError::ModelNotFound {
                id: self.fallback_model_id,
            })?;

        if plan.model_ids.contains(&fallback.id()) {
            return Err(DomainError::validation(
                "Fallback model is owned by the provider being deleted",
            ));
        }

        let fallback_config = match fallback.parameters_schema().filter(|s| !s.is_empty()) {
            Some(schema) => schema.default_payload(),
            None => self
                .registry
                .generic_defaults(fallback.vendor(), fallback.name()),
        };

        let mut operations = Vec::new();
        let mut outcome = DeletionOutcome::default();

        // Defensive sweep: gating makes these empty in the common case,
        // but rows created in the check/execute window still get
        // migrated rather than left dangling.
        for model_id in &plan.model_ids {
            for prompt in self.prompts.list_by_model(org_id, model_id).await? {
                operations.push(BatchOperation::ResetPromptModel {
                    prompt_id: prompt.id().clone(),
                    model_id: fallback.id(),
                    config: fallback_config.clone(),
                });
                outcome.reassigned_prompts += 1;
            }
        }

        for commit in self
            .commits
            .list_using_models(org_id, &plan.model_ids)
            .await?
        {
            operations.push(BatchOperation::ResetCommitModel {
                commit_id: commit.id(),
                model_id: fallback.id(),
                config: fallback_config.clone(),
            });
            outcome.reassigned_commits += 1;
        }

        for model_id in &plan.model_ids {
            operations.push(BatchOperation::DeleteModel {
                model_id: *model_id,
            });
            outcome.deleted_models += 1;
        }

        operations.push(BatchOperation::DeleteProviderKey {
            key_id: plan.provider_key_id,
        });

        self.atomic.run_atomic_batch(operations).await?;

        info!(
            org_id = %org_id,
            provider_key_id = %plan.provider_key_id,
            deleted_models = outcome.deleted_models,
            reassigned_prompts = outcome.reassigned_prompts,
            reassigned_commits = outcome.reassigned_commits,
            "deleted custom provider"
        );
        Ok(outcome)
    }
}
