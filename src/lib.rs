//! Prompt versioning and reconciliation engine
//!
//! A library for iteratively editing AI prompts with a git-like history of
//! committed versions, keeping each prompt's model configuration valid as
//! the allowed parameters of its underlying model change:
//! - deterministic commit fingerprints and dirty/committed state tracking
//! - schema-driven sanitization of free-form configuration payloads
//! - batch reindexing of prompts when a model's schema is edited
//! - create-missing/preserve-existing sync of provider model listings
//! - guarded, atomic provider deletion with fallback migration
//!
//! HTTP routing, authentication and the actual LLM calls are external
//! collaborators; this crate is the engine they invoke.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::EngineConfig;
pub use domain::{
    compute_commit_hash, Branch, BranchId, Commit, CommitId, CommitRepository, CommitState,
    ConfigPayload, DomainError, LanguageModel, ModelId, ModelRepository, OrgId,
    ParameterDefinition, ParameterSchema, ParameterSchemaRegistry, Prompt, PromptId,
    PromptRepository, PromptSnapshot, ProviderApiKey, ProviderApiKeyId, ProviderKeyRepository,
    Vendor,
};
pub use infrastructure::services::{
    CommitService, CreatePromptRequest, DeletionOutcome, DeletionPlan, FetchedModel,
    ModelConfigService, ModelSyncService, PromptService, ProviderDeletionService, ReindexOutcome,
    SyncOutcome,
};
pub use infrastructure::storage::{InMemoryEngineStore, PostgresConfig, PostgresEngineStore};

use std::sync::Arc;

use domain::AtomicStore;
use uuid::Uuid;

/// The engine's services wired over a single storage backend
#[derive(Debug)]
pub struct Engine {
    prompts: Arc<PromptService>,
    commits: Arc<CommitService>,
    model_config: Arc<ModelConfigService>,
    model_sync: Arc<ModelSyncService>,
    provider_deletion: Arc<ProviderDeletionService>,
}

impl Engine {
    /// Wire the services over a storage backend implementing every
    /// repository port.
    pub fn new<S>(
        store: Arc<S>,
        registry: Arc<ParameterSchemaRegistry>,
        fallback_model_id: ModelId,
    ) -> Self
    where
        S: PromptRepository
            + CommitRepository
            + ModelRepository
            + ProviderKeyRepository
            + AtomicStore
            + 'static,
    {
        let prompts: Arc<dyn PromptRepository> = store.clone();
        let commits: Arc<dyn CommitRepository> = store.clone();
        let models: Arc<dyn ModelRepository> = store.clone();
        let provider_keys: Arc<dyn ProviderKeyRepository> = store.clone();
        let atomic: Arc<dyn AtomicStore> = store;

        let commit_service = Arc::new(CommitService::new(prompts.clone(), commits.clone()));
        let model_config = Arc::new(ModelConfigService::new(
            prompts.clone(),
            models.clone(),
            commit_service.clone(),
            registry.clone(),
        ));
        let prompt_service = Arc::new(PromptService::new(
            prompts.clone(),
            commits.clone(),
            models.clone(),
            commit_service.clone(),
            model_config.clone(),
        ));
        let model_sync = Arc::new(ModelSyncService::new(models.clone(), provider_keys.clone()));
        let provider_deletion = Arc::new(ProviderDeletionService::new(
            prompts,
            commits,
            models,
            provider_keys,
            atomic,
            registry,
            fallback_model_id,
        ));

        Self {
            prompts: prompt_service,
            commits: commit_service,
            model_config,
            model_sync,
            provider_deletion,
        }
    }

    /// Engine over an in-memory store, for tests and development
    pub fn in_memory(store: Arc<InMemoryEngineStore>, fallback_model_id: ModelId) -> Self {
        Self::new(
            store,
            Arc::new(ParameterSchemaRegistry::with_builtin_schemas()),
            fallback_model_id,
        )
    }

    /// Build an engine from configuration, connecting the configured
    /// storage backend.
    pub async fn from_config(config: &EngineConfig) -> anyhow::Result<Self> {
        let fallback_model_id = config
            .engine
            .fallback_model_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("engine.fallback_model_id is required"))?;
        let fallback_model_id = ModelId::from(Uuid::parse_str(fallback_model_id)?);

        match config.storage.backend.as_str() {
            "postgres" => {
                let url = config
                    .storage
                    .url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("storage.url is required for postgres"))?;
                let store = PostgresEngineStore::connect(&PostgresConfig::new(url)).await?;
                store.ensure_tables().await?;
                tracing::info!("Using PostgreSQL storage backend");
                Ok(Self::new(
                    Arc::new(store),
                    Arc::new(ParameterSchemaRegistry::with_builtin_schemas()),
                    fallback_model_id,
                ))
            }
            _ => {
                tracing::info!("Using in-memory storage backend");
                Ok(Self::in_memory(
                    Arc::new(InMemoryEngineStore::new()),
                    fallback_model_id,
                ))
            }
        }
    }

    pub fn prompts(&self) -> &PromptService {
        &self.prompts
    }

    pub fn commits(&self) -> &CommitService {
        &self.commits
    }

    pub fn model_config(&self) -> &ModelConfigService {
        &self.model_config
    }

    pub fn model_sync(&self) -> &ModelSyncService {
        &self.model_sync
    }

    pub fn provider_deletion(&self) -> &ProviderDeletionService {
        &self.provider_deletion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_engine_wires_services_over_one_store() {
        let fallback = LanguageModel::new(ModelId::generate(), "gpt-4o", Vendor::OpenAi);
        let store = Arc::new(InMemoryEngineStore::new().with_model(fallback.clone()));
        let engine = Engine::in_memory(store, fallback.id());

        let prompt = engine
            .prompts()
            .create(CreatePromptRequest {
                id: "smoke".to_string(),
                org_id: "acme".to_string(),
                name: "Smoke".to_string(),
                value: "You are a helpful assistant.".to_string(),
                model_id: fallback.id(),
                config: None,
            })
            .await
            .unwrap();

        engine
            .commits()
            .commit(prompt.id(), "alice", None)
            .await
            .unwrap();

        let refreshed = engine.prompts().get_required("smoke").await.unwrap();
        assert!(refreshed.is_committed());

        // No custom provider configured, so nothing to delete.
        let plan = engine
            .provider_deletion()
            .plan_deletion(&OrgId::new("acme").unwrap())
            .await
            .unwrap();
        assert!(plan.is_none());
    }
}
