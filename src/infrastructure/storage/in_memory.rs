//! In-memory storage backend for testing and development

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    AtomicStore, BatchOperation, Branch, BranchId, Commit, CommitRepository, ConfigPayload,
    DomainError, LanguageModel, ModelId, ModelRepository, OrgId, Prompt, PromptId,
    PromptRepository, ProviderApiKey, ProviderApiKeyId, ProviderKeyRepository,
};

#[derive(Debug, Clone, Default)]
struct EngineState {
    prompts: HashMap<String, Prompt>,
    commits: HashMap<Uuid, Commit>,
    /// Per prompt, commit ids oldest first; the last entry is productive
    commit_log: HashMap<String, Vec<Uuid>>,
    branches: HashMap<Uuid, Branch>,
    models: HashMap<Uuid, LanguageModel>,
    provider_keys: HashMap<Uuid, ProviderApiKey>,
}

impl EngineState {
    fn prompt_org(&self, prompt_id: &str) -> Option<&OrgId> {
        self.prompts.get(prompt_id).map(|p| p.org_id())
    }

    fn apply(&mut self, operation: &BatchOperation) -> Result<(), DomainError> {
        match operation {
            BatchOperation::ResetPromptModel {
                prompt_id,
                model_id,
                config,
            } => {
                let prompt = self.prompts.get_mut(prompt_id.as_str()).ok_or_else(|| {
                    DomainError::not_found(format!("Prompt '{}' not found", prompt_id))
                })?;
                prompt.set_model(*model_id, config.clone());
                Ok(())
            }
            BatchOperation::ResetCommitModel {
                commit_id,
                model_id,
                config,
            } => {
                let commit = self.commits.get_mut(&commit_id.as_uuid()).ok_or_else(|| {
                    DomainError::not_found(format!("Commit '{}' not found", commit_id))
                })?;
                commit.reset_model(*model_id, config.clone());
                Ok(())
            }
            BatchOperation::DeleteModel { model_id } => {
                self.models
                    .remove(&model_id.as_uuid())
                    .map(|_| ())
                    .ok_or(DomainError::ModelNotFound { id: *model_id })
            }
            BatchOperation::DeleteProviderKey { key_id } => {
                self.provider_keys
                    .remove(&key_id.as_uuid())
                    .map(|_| ())
                    .ok_or(DomainError::ApiKeyNotFound { id: *key_id })
            }
        }
    }
}

/// In-memory storage backend implementing every repository port.
///
/// A single mutex guards the whole state so the atomic batch can swap in a
/// fully-applied copy, giving real all-or-nothing semantics.
#[derive(Debug, Default)]
pub struct InMemoryEngineStore {
    state: Mutex<EngineState>,
}

impl InMemoryEngineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(self, model: LanguageModel) -> Self {
        self.state
            .lock()
            .unwrap()
            .models
            .insert(model.id().as_uuid(), model);
        self
    }

    pub fn with_provider_key(self, key: ProviderApiKey) -> Self {
        self.state
            .lock()
            .unwrap()
            .provider_keys
            .insert(key.id().as_uuid(), key);
        self
    }
}

#[async_trait]
impl PromptRepository for InMemoryEngineStore {
    async fn get(&self, id: &PromptId) -> Result<Option<Prompt>, DomainError> {
        Ok(self.state.lock().unwrap().prompts.get(id.as_str()).cloned())
    }

    async fn create(&self, prompt: Prompt) -> Result<Prompt, DomainError> {
        let mut state = self.state.lock().unwrap();
        let id = prompt.id().to_string();

        if state.prompts.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Prompt with ID '{}' already exists",
                id
            )));
        }

        state.prompts.insert(id, prompt.clone());
        Ok(prompt)
    }

    async fn update(&self, prompt: Prompt) -> Result<Prompt, DomainError> {
        let mut state = self.state.lock().unwrap();
        let id = prompt.id().to_string();

        if !state.prompts.contains_key(&id) {
            return Err(DomainError::not_found(format!("Prompt '{}' not found", id)));
        }

        state.prompts.insert(id, prompt.clone());
        Ok(prompt)
    }

    async fn delete(&self, id: &PromptId) -> Result<bool, DomainError> {
        let mut state = self.state.lock().unwrap();

        let removed = state.prompts.remove(id.as_str()).is_some();
        if removed {
            if let Some(commit_ids) = state.commit_log.remove(id.as_str()) {
                for commit_id in commit_ids {
                    state.commits.remove(&commit_id);
                }
            }
            state
                .branches
                .retain(|_, branch| branch.prompt_id().as_str() != id.as_str());
        }
        Ok(removed)
    }

    async fn list_by_model(
        &self,
        org_id: &OrgId,
        model_id: &ModelId,
    ) -> Result<Vec<Prompt>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .prompts
            .values()
            .filter(|p| p.org_id() == org_id && p.model_id() == *model_id)
            .cloned()
            .collect())
    }

    async fn update_config(
        &self,
        id: &PromptId,
        config: ConfigPayload,
    ) -> Result<Prompt, DomainError> {
        let mut state = self.state.lock().unwrap();

        let prompt = state
            .prompts
            .get_mut(id.as_str())
            .ok_or_else(|| DomainError::not_found(format!("Prompt '{}' not found", id)))?;
        prompt.set_config(config);
        Ok(prompt.clone())
    }

    async fn set_commit_flag(&self, id: &PromptId, committed: bool) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();

        let prompt = state
            .prompts
            .get_mut(id.as_str())
            .ok_or_else(|| DomainError::not_found(format!("Prompt '{}' not found", id)))?;
        prompt.set_committed(committed);
        Ok(())
    }

    async fn count_using_models(
        &self,
        org_id: &OrgId,
        model_ids: &[ModelId],
    ) -> Result<u64, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .prompts
            .values()
            .filter(|p| p.org_id() == org_id && model_ids.contains(&p.model_id()))
            .count() as u64)
    }
}

#[async_trait]
impl CommitRepository for InMemoryEngineStore {
    async fn create(&self, commit: Commit) -> Result<Commit, DomainError> {
        let mut state = self.state.lock().unwrap();
        let id = commit.id().as_uuid();

        if state.commits.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Commit '{}' already exists",
                commit.id()
            )));
        }

        state
            .commit_log
            .entry(commit.prompt_id().to_string())
            .or_default()
            .push(id);
        state.commits.insert(id, commit.clone());
        Ok(commit)
    }

    async fn productive_commit(
        &self,
        prompt_id: &PromptId,
    ) -> Result<Option<Commit>, DomainError> {
        let state = self.state.lock().unwrap();

        Ok(state
            .commit_log
            .get(prompt_id.as_str())
            .and_then(|log| log.last())
            .and_then(|id| state.commits.get(id))
            .cloned())
    }

    async fn commit_count(&self, prompt_id: &PromptId) -> Result<u64, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .commit_log
            .get(prompt_id.as_str())
            .map(|log| log.len() as u64)
            .unwrap_or(0))
    }

    async fn list_by_prompt(&self, prompt_id: &PromptId) -> Result<Vec<Commit>, DomainError> {
        let state = self.state.lock().unwrap();

        Ok(state
            .commit_log
            .get(prompt_id.as_str())
            .map(|log| {
                log.iter()
                    .filter_map(|id| state.commits.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_using_models(
        &self,
        org_id: &OrgId,
        model_ids: &[ModelId],
    ) -> Result<Vec<Commit>, DomainError> {
        let state = self.state.lock().unwrap();

        Ok(state
            .commits
            .values()
            .filter(|c| {
                model_ids.contains(&c.model_id())
                    && state.prompt_org(c.prompt_id().as_str()) == Some(org_id)
            })
            .cloned()
            .collect())
    }

    async fn count_productive_using_models(
        &self,
        org_id: &OrgId,
        model_ids: &[ModelId],
    ) -> Result<u64, DomainError> {
        let state = self.state.lock().unwrap();

        let count = state
            .commit_log
            .iter()
            .filter(|(prompt_id, _)| state.prompt_org(prompt_id) == Some(org_id))
            .filter_map(|(_, log)| log.last())
            .filter_map(|id| state.commits.get(id))
            .filter(|c| model_ids.contains(&c.model_id()))
            .count();
        Ok(count as u64)
    }

    async fn create_branch(&self, branch: Branch) -> Result<Branch, DomainError> {
        let mut state = self.state.lock().unwrap();
        let id = branch.id().as_uuid();

        if state.branches.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Branch '{}' already exists",
                branch.id()
            )));
        }

        state.branches.insert(id, branch.clone());
        Ok(branch)
    }

    async fn get_branch(&self, id: &BranchId) -> Result<Option<Branch>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .branches
            .get(&id.as_uuid())
            .cloned())
    }
}

#[async_trait]
impl ModelRepository for InMemoryEngineStore {
    async fn get(&self, id: &ModelId) -> Result<Option<LanguageModel>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .models
            .get(&id.as_uuid())
            .cloned())
    }

    async fn list(&self) -> Result<Vec<LanguageModel>, DomainError> {
        Ok(self.state.lock().unwrap().models.values().cloned().collect())
    }

    async fn list_by_provider_key(
        &self,
        key_id: &ProviderApiKeyId,
    ) -> Result<Vec<LanguageModel>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .models
            .values()
            .filter(|m| m.provider_key_id() == Some(*key_id))
            .cloned()
            .collect())
    }

    async fn create(&self, model: LanguageModel) -> Result<LanguageModel, DomainError> {
        let mut state = self.state.lock().unwrap();
        let id = model.id().as_uuid();

        if state.models.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Model '{}' already exists",
                model.id()
            )));
        }

        state.models.insert(id, model.clone());
        Ok(model)
    }

    async fn update(&self, model: LanguageModel) -> Result<LanguageModel, DomainError> {
        let mut state = self.state.lock().unwrap();
        let id = model.id().as_uuid();

        if !state.models.contains_key(&id) {
            return Err(DomainError::ModelNotFound { id: model.id() });
        }

        state.models.insert(id, model.clone());
        Ok(model)
    }

    async fn delete(&self, id: &ModelId) -> Result<bool, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .models
            .remove(&id.as_uuid())
            .is_some())
    }
}

#[async_trait]
impl ProviderKeyRepository for InMemoryEngineStore {
    async fn get(&self, id: &ProviderApiKeyId) -> Result<Option<ProviderApiKey>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .provider_keys
            .get(&id.as_uuid())
            .cloned())
    }

    async fn find_by_org(&self, org_id: &OrgId) -> Result<Option<ProviderApiKey>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .provider_keys
            .values()
            .find(|k| k.org_id() == org_id)
            .cloned())
    }

    async fn create(&self, key: ProviderApiKey) -> Result<ProviderApiKey, DomainError> {
        let mut state = self.state.lock().unwrap();
        let id = key.id().as_uuid();

        if state.provider_keys.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Provider API key '{}' already exists",
                key.id()
            )));
        }

        if state.provider_keys.values().any(|k| k.org_id() == key.org_id()) {
            return Err(DomainError::conflict(format!(
                "Org '{}' already has a custom provider configured",
                key.org_id()
            )));
        }

        state.provider_keys.insert(id, key.clone());
        Ok(key)
    }

    async fn delete(&self, id: &ProviderApiKeyId) -> Result<bool, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .provider_keys
            .remove(&id.as_uuid())
            .is_some())
    }
}

#[async_trait]
impl AtomicStore for InMemoryEngineStore {
    async fn run_atomic_batch(&self, operations: Vec<BatchOperation>) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();

        // Apply to a copy; only swap it in once every operation succeeded.
        let mut staged = state.clone();
        for operation in &operations {
            staged.apply(operation)?;
        }

        *state = staged;
        Ok(())
    }
}
