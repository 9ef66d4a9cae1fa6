//! Model configuration service - reconciliation and batch reindexing

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    ConfigPayload, DomainError, ModelId, ModelRepository, OrgId, ParameterSchema,
    ParameterSchemaRegistry, Prompt, PromptRepository, Vendor,
};

use super::commit_service::CommitService;

/// Outcome of a batch reindex
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexOutcome {
    pub updated: u64,
    pub skipped: u64,
}

/// Keeps stored configuration payloads valid against their model's
/// allowed-parameter definitions.
#[derive(Debug)]
pub struct ModelConfigService {
    prompts: Arc<dyn PromptRepository>,
    models: Arc<dyn ModelRepository>,
    commit_service: Arc<CommitService>,
    registry: Arc<ParameterSchemaRegistry>,
}

impl ModelConfigService {
    pub fn new(
        prompts: Arc<dyn PromptRepository>,
        models: Arc<dyn ModelRepository>,
        commit_service: Arc<CommitService>,
        registry: Arc<ParameterSchemaRegistry>,
    ) -> Self {
        Self {
            prompts,
            models,
            commit_service,
            registry,
        }
    }

    /// Reconcile a configuration payload against a model's schema.
    ///
    /// Without a schema the stored payload is discarded in favor of the
    /// vendor+model generic defaults; with one, the payload is sanitized
    /// (clamped, defaulted, unknown keys dropped). Idempotent.
    pub fn reconcile_config(
        &self,
        vendor: Vendor,
        model_name: &str,
        current: &ConfigPayload,
        schema: Option<&ParameterSchema>,
    ) -> ConfigPayload {
        match schema.filter(|s| !s.is_empty()) {
            Some(schema) => schema.sanitize(current),
            None => self.registry.generic_defaults(vendor, model_name),
        }
    }

    /// Re-run reconciliation over every prompt in the org referencing a
    /// model.
    ///
    /// Each prompt is an independent unit of work: a failed update is
    /// logged, left out of the `updated` count and does not abort the
    /// remaining prompts.
    pub async fn reindex_prompts_for_model(
        &self,
        org_id: &OrgId,
        model_id: &ModelId,
        model_name: &str,
        vendor: Vendor,
        schema: Option<&ParameterSchema>,
    ) -> Result<ReindexOutcome, DomainError> {
        let prompts = self.prompts.list_by_model(org_id, model_id).await?;
        let mut outcome = ReindexOutcome::default();

        for prompt in prompts {
            let next = self.reconcile_config(vendor, model_name, prompt.config(), schema);

            if next == *prompt.config() {
                outcome.skipped += 1;
                continue;
            }

            match self.apply_config(&prompt, next).await {
                Ok(()) => outcome.updated += 1,
                Err(error) => {
                    warn!(
                        prompt_id = %prompt.id(),
                        %error,
                        "failed to reindex prompt, continuing"
                    );
                }
            }
        }

        info!(
            model_id = %model_id,
            updated = outcome.updated,
            skipped = outcome.skipped,
            "reindexed prompts for model"
        );
        Ok(outcome)
    }

    /// Persist an edited parameter schema on a model, then reindex the
    /// prompts referencing it so their payloads stay valid.
    pub async fn apply_schema_edit(
        &self,
        org_id: &OrgId,
        model_id: &ModelId,
        schema: Option<ParameterSchema>,
    ) -> Result<ReindexOutcome, DomainError> {
        let mut model = self
            .models
            .get(model_id)
            .await?
            .ok_or(DomainError::ModelNotFound { id: *model_id })?;

        model.set_parameters_schema(schema);
        let model = self.models.update(model).await?;

        self.reindex_prompts_for_model(
            org_id,
            model_id,
            model.name(),
            model.vendor(),
            model.parameters_schema(),
        )
        .await
    }

    async fn apply_config(&self, prompt: &Prompt, next: ConfigPayload) -> Result<(), DomainError> {
        let refreshed = self.prompts.update_config(prompt.id(), next).await?;
        self.commit_service.resolve_state(&refreshed).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use crate::domain::{
        BranchId, LanguageModel, ParameterDefinition, PromptId,
    };
    use crate::infrastructure::storage::InMemoryEngineStore;

    fn org() -> OrgId {
        OrgId::new("acme").unwrap()
    }

    fn restrictive_schema() -> ParameterSchema {
        ParameterSchema::new().with_parameter(
            "temperature",
            ParameterDefinition::Numeric {
                min: 0.0,
                max: 1.0,
                default: 0.7,
            },
        )
    }

    fn service_over(prompts: Arc<dyn PromptRepository>, store: Arc<InMemoryEngineStore>) -> ModelConfigService {
        let commit_service = Arc::new(CommitService::new(prompts.clone(), store.clone()));
        ModelConfigService::new(
            prompts,
            store,
            commit_service,
            Arc::new(ParameterSchemaRegistry::with_builtin_schemas()),
        )
    }

    async fn seed_prompts(
        store: &Arc<InMemoryEngineStore>,
        model: &LanguageModel,
        count: usize,
    ) -> Vec<PromptId> {
        let mut ids = Vec::new();
        for i in 0..count {
            let mut config = ConfigPayload::new();
            config.insert("temperature".to_string(), json!(0.5));
            // Parameter the schema edit will strip.
            config.insert("logit_bias".to_string(), json!({"50256": -100}));

            let id = PromptId::new(format!("prompt-{}", i)).unwrap();
            let prompt = Prompt::new(
                id.clone(),
                org(),
                format!("Prompt {}", i),
                "You are a helpful assistant.",
                model.id(),
                BranchId::generate(),
            )
            .with_config(config);
            PromptRepository::create(store.as_ref(), prompt).await.unwrap();
            ids.push(id);
        }
        ids
    }

    #[tokio::test]
    async fn test_reconcile_without_schema_returns_generic_defaults() {
        let store = Arc::new(InMemoryEngineStore::new());
        let service = service_over(store.clone(), store.clone());

        let mut current = ConfigPayload::new();
        current.insert("temperature".to_string(), json!(1.8));

        let reconciled = service.reconcile_config(Vendor::Custom, "mystery-model", &current, None);

        // Stored payload is ignored entirely.
        assert_eq!(reconciled["temperature"], json!(1.0));
        assert_eq!(reconciled["max_tokens"], json!(2048.0));
    }

    #[tokio::test]
    async fn test_reconcile_empty_schema_treated_as_absent() {
        let store = Arc::new(InMemoryEngineStore::new());
        let service = service_over(store.clone(), store.clone());

        let empty = ParameterSchema::new();
        let reconciled =
            service.reconcile_config(Vendor::Custom, "mystery-model", &ConfigPayload::new(), Some(&empty));

        assert_eq!(reconciled["max_tokens"], json!(2048.0));
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let store = Arc::new(InMemoryEngineStore::new());
        let service = service_over(store.clone(), store.clone());
        let schema = restrictive_schema();

        let mut current = ConfigPayload::new();
        current.insert("temperature".to_string(), json!(4.2));
        current.insert("stop".to_string(), json!(["END"]));

        let once = service.reconcile_config(Vendor::Custom, "m", &current, Some(&schema));
        let twice = service.reconcile_config(Vendor::Custom, "m", &once, Some(&schema));
        assert_eq!(once, twice);
        assert_eq!(once["temperature"], json!(1.0));
        assert!(!once.contains_key("stop"));
    }

    #[tokio::test]
    async fn test_reindex_updates_then_skips() {
        let model = LanguageModel::new(ModelId::generate(), "llama-3-70b", Vendor::Custom)
            .with_parameters_schema(restrictive_schema());
        let store = Arc::new(InMemoryEngineStore::new().with_model(model.clone()));
        let service = service_over(store.clone(), store.clone());

        seed_prompts(&store, &model, 10).await;

        let schema = restrictive_schema();
        let first = service
            .reindex_prompts_for_model(&org(), &model.id(), model.name(), model.vendor(), Some(&schema))
            .await
            .unwrap();
        assert_eq!(
            first,
            ReindexOutcome {
                updated: 10,
                skipped: 0
            }
        );

        // Stripped parameter is gone from every stored payload.
        for prompt in store.list_by_model(&org(), &model.id()).await.unwrap() {
            assert!(!prompt.config().contains_key("logit_bias"));
            assert_eq!(prompt.config()["temperature"], json!(0.5));
        }

        let second = service
            .reindex_prompts_for_model(&org(), &model.id(), model.name(), model.vendor(), Some(&schema))
            .await
            .unwrap();
        assert_eq!(
            second,
            ReindexOutcome {
                updated: 0,
                skipped: 10
            }
        );
    }

    #[tokio::test]
    async fn test_apply_schema_edit_persists_and_reindexes() {
        let model = LanguageModel::new(ModelId::generate(), "llama-3-70b", Vendor::Custom);
        let store = Arc::new(InMemoryEngineStore::new().with_model(model.clone()));
        let service = service_over(store.clone(), store.clone());

        seed_prompts(&store, &model, 3).await;

        let outcome = service
            .apply_schema_edit(&org(), &model.id(), Some(restrictive_schema()))
            .await
            .unwrap();
        assert_eq!(outcome.updated, 3);

        let stored = ModelRepository::get(store.as_ref(), &model.id())
            .await
            .unwrap()
            .unwrap();
        assert!(stored.parameters_schema().is_some());
    }

    /// Wrapper that fails `update_config` for selected prompts
    #[derive(Debug)]
    struct FlakyPromptRepository {
        inner: Arc<InMemoryEngineStore>,
        failing: Mutex<HashSet<String>>,
    }

    impl FlakyPromptRepository {
        fn new(inner: Arc<InMemoryEngineStore>, failing: &[&str]) -> Self {
            Self {
                inner,
                failing: Mutex::new(failing.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl PromptRepository for FlakyPromptRepository {
        async fn get(&self, id: &PromptId) -> Result<Option<Prompt>, DomainError> {
            PromptRepository::get(self.inner.as_ref(), id).await
        }

        async fn create(&self, prompt: Prompt) -> Result<Prompt, DomainError> {
            PromptRepository::create(self.inner.as_ref(), prompt).await
        }

        async fn update(&self, prompt: Prompt) -> Result<Prompt, DomainError> {
            PromptRepository::update(self.inner.as_ref(), prompt).await
        }

        async fn delete(&self, id: &PromptId) -> Result<bool, DomainError> {
            PromptRepository::delete(self.inner.as_ref(), id).await
        }

        async fn list_by_model(
            &self,
            org_id: &OrgId,
            model_id: &ModelId,
        ) -> Result<Vec<Prompt>, DomainError> {
            self.inner.list_by_model(org_id, model_id).await
        }

        async fn update_config(
            &self,
            id: &PromptId,
            config: ConfigPayload,
        ) -> Result<Prompt, DomainError> {
            if self.failing.lock().unwrap().contains(id.as_str()) {
                return Err(DomainError::storage("simulated write failure"));
            }
            self.inner.update_config(id, config).await
        }

        async fn set_commit_flag(&self, id: &PromptId, committed: bool) -> Result<(), DomainError> {
            self.inner.set_commit_flag(id, committed).await
        }

        async fn count_using_models(
            &self,
            org_id: &OrgId,
            model_ids: &[ModelId],
        ) -> Result<u64, DomainError> {
            self.inner.count_using_models(org_id, model_ids).await
        }
    }

    #[tokio::test]
    async fn test_reindex_continues_after_per_prompt_failure() {
        let model = LanguageModel::new(ModelId::generate(), "llama-3-70b", Vendor::Custom);
        let store = Arc::new(InMemoryEngineStore::new().with_model(model.clone()));

        seed_prompts(&store, &model, 5).await;

        let flaky = Arc::new(FlakyPromptRepository::new(store.clone(), &["prompt-2"]));
        let service = service_over(flaky, store.clone());

        let schema = restrictive_schema();
        let outcome = service
            .reindex_prompts_for_model(&org(), &model.id(), model.name(), model.vendor(), Some(&schema))
            .await
            .unwrap();

        // The failed prompt is neither updated nor skipped.
        assert_eq!(outcome.updated, 4);
        assert_eq!(outcome.skipped, 0);

        // The failing prompt kept its stale payload.
        let stale = PromptRepository::get(store.as_ref(), &PromptId::new("prompt-2").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(stale.config().contains_key("logit_bias"));
    }
}
