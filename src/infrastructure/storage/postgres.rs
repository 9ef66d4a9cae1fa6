//! PostgreSQL storage backend with connection pooling
//!
//! Entities are stored as JSONB payloads alongside the columns the usage
//! and filter queries need. The atomic batch runs inside a single
//! transaction.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::{
    AtomicStore, BatchOperation, Branch, BranchId, Commit, CommitRepository, ConfigPayload,
    DomainError, LanguageModel, ModelId, ModelRepository, OrgId, Prompt, PromptId,
    PromptRepository, ProviderApiKey, ProviderApiKeyId, ProviderKeyRepository,
};

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/promptvc".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}

/// PostgreSQL storage backend implementing every repository port
pub struct PostgresEngineStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresEngineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresEngineStore").finish()
    }
}

fn encode<T: Serialize>(entity: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(entity)
        .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))
}

fn decode<T: DeserializeOwned>(data: serde_json::Value) -> Result<T, DomainError> {
    serde_json::from_value(data)
        .map_err(|e| DomainError::storage(format!("Failed to deserialize entity: {}", e)))
}

fn storage_error(context: &str, error: sqlx::Error) -> DomainError {
    DomainError::storage(format!("{}: {}", context, error))
}

fn uuids(model_ids: &[ModelId]) -> Vec<Uuid> {
    model_ids.iter().map(|id| id.as_uuid()).collect()
}

impl PostgresEngineStore {
    /// Creates a new store with an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new store with connection pooling
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ensures the storage tables exist
    pub async fn ensure_tables(&self) -> Result<(), DomainError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS prompts (
                id VARCHAR(255) PRIMARY KEY,
                org_id VARCHAR(255) NOT NULL,
                model_id UUID NOT NULL,
                committed BOOLEAN NOT NULL DEFAULT FALSE,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS commits (
                id UUID PRIMARY KEY,
                seq BIGSERIAL,
                prompt_id VARCHAR(255) NOT NULL,
                model_id UUID NOT NULL,
                productive BOOLEAN NOT NULL DEFAULT FALSE,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS branches (
                id UUID PRIMARY KEY,
                prompt_id VARCHAR(255) NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS language_models (
                id UUID PRIMARY KEY,
                provider_key_id UUID,
                name VARCHAR(255) NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS provider_api_keys (
                id UUID PRIMARY KEY,
                org_id VARCHAR(255) NOT NULL,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_prompts_org_model ON prompts (org_id, model_id)",
            "CREATE INDEX IF NOT EXISTS idx_commits_prompt ON commits (prompt_id)",
            "CREATE INDEX IF NOT EXISTS idx_commits_model ON commits (model_id)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| storage_error("Failed to create table", e))?;
        }

        Ok(())
    }
}

#[async_trait]
impl PromptRepository for PostgresEngineStore {
    async fn get(&self, id: &PromptId) -> Result<Option<Prompt>, DomainError> {
        let row = sqlx::query("SELECT data FROM prompts WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get prompt", e))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }

    async fn create(&self, prompt: Prompt) -> Result<Prompt, DomainError> {
        let data = encode(&prompt)?;

        sqlx::query(
            "INSERT INTO prompts (id, org_id, model_id, committed, data) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(prompt.id().as_str())
        .bind(prompt.org_id().as_str())
        .bind(prompt.model_id().as_uuid())
        .bind(prompt.is_committed())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("duplicate key") {
                DomainError::conflict(format!("Prompt with ID '{}' already exists", prompt.id()))
            } else {
                storage_error("Failed to create prompt", e)
            }
        })?;

        Ok(prompt)
    }

    async fn update(&self, prompt: Prompt) -> Result<Prompt, DomainError> {
        let data = encode(&prompt)?;

        let result = sqlx::query(
            "UPDATE prompts SET data = $2, model_id = $3, committed = $4, updated_at = NOW() WHERE id = $1",
        )
        .bind(prompt.id().as_str())
        .bind(&data)
        .bind(prompt.model_id().as_uuid())
        .bind(prompt.is_committed())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update prompt", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Prompt '{}' not found",
                prompt.id()
            )));
        }

        Ok(prompt)
    }

    async fn delete(&self, id: &PromptId) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        sqlx::query("DELETE FROM commits WHERE prompt_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to delete commits", e))?;

        sqlx::query("DELETE FROM branches WHERE prompt_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to delete branches", e))?;

        let result = sqlx::query("DELETE FROM prompts WHERE id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to delete prompt", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit transaction", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_model(
        &self,
        org_id: &OrgId,
        model_id: &ModelId,
    ) -> Result<Vec<Prompt>, DomainError> {
        let rows = sqlx::query(
            "SELECT data FROM prompts WHERE org_id = $1 AND model_id = $2 ORDER BY created_at",
        )
        .bind(org_id.as_str())
        .bind(model_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list prompts", e))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }

    async fn update_config(
        &self,
        id: &PromptId,
        config: ConfigPayload,
    ) -> Result<Prompt, DomainError> {
        let mut prompt = PromptRepository::get(self, id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Prompt '{}' not found", id)))?;
        prompt.set_config(config);
        PromptRepository::update(self, prompt).await
    }

    async fn set_commit_flag(&self, id: &PromptId, committed: bool) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE prompts
            SET committed = $2,
                data = jsonb_set(data, '{committed}', to_jsonb($2::boolean)),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(committed)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to set commit flag", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("Prompt '{}' not found", id)));
        }

        Ok(())
    }

    async fn count_using_models(
        &self,
        org_id: &OrgId,
        model_ids: &[ModelId],
    ) -> Result<u64, DomainError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM prompts WHERE org_id = $1 AND model_id = ANY($2)",
        )
        .bind(org_id.as_str())
        .bind(uuids(model_ids))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to count prompts", e))?;

        let count: i64 = row.get("count");
        Ok(count as u64)
    }
}

#[async_trait]
impl CommitRepository for PostgresEngineStore {
    async fn create(&self, commit: Commit) -> Result<Commit, DomainError> {
        let data = encode(&commit)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        sqlx::query("UPDATE commits SET productive = FALSE WHERE prompt_id = $1 AND productive")
            .bind(commit.prompt_id().as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to clear productive flag", e))?;

        sqlx::query(
            "INSERT INTO commits (id, prompt_id, model_id, productive, data) VALUES ($1, $2, $3, TRUE, $4)",
        )
        .bind(commit.id().as_uuid())
        .bind(commit.prompt_id().as_str())
        .bind(commit.model_id().as_uuid())
        .bind(&data)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if e.to_string().contains("duplicate key") {
                DomainError::conflict(format!("Commit '{}' already exists", commit.id()))
            } else {
                storage_error("Failed to create commit", e)
            }
        })?;

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit transaction", e))?;

        Ok(commit)
    }

    async fn productive_commit(
        &self,
        prompt_id: &PromptId,
    ) -> Result<Option<Commit>, DomainError> {
        let row = sqlx::query("SELECT data FROM commits WHERE prompt_id = $1 AND productive")
            .bind(prompt_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get productive commit", e))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }

    async fn commit_count(&self, prompt_id: &PromptId) -> Result<u64, DomainError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM commits WHERE prompt_id = $1")
            .bind(prompt_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to count commits", e))?;

        let count: i64 = row.get("count");
        Ok(count as u64)
    }

    async fn list_by_prompt(&self, prompt_id: &PromptId) -> Result<Vec<Commit>, DomainError> {
        let rows = sqlx::query("SELECT data FROM commits WHERE prompt_id = $1 ORDER BY seq")
            .bind(prompt_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to list commits", e))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }

    async fn list_using_models(
        &self,
        org_id: &OrgId,
        model_ids: &[ModelId],
    ) -> Result<Vec<Commit>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT c.data FROM commits c
            JOIN prompts p ON p.id = c.prompt_id
            WHERE p.org_id = $1 AND c.model_id = ANY($2)
            ORDER BY c.seq
            "#,
        )
        .bind(org_id.as_str())
        .bind(uuids(model_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list commits", e))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }

    async fn count_productive_using_models(
        &self,
        org_id: &OrgId,
        model_ids: &[ModelId],
    ) -> Result<u64, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM commits c
            JOIN prompts p ON p.id = c.prompt_id
            WHERE p.org_id = $1 AND c.productive AND c.model_id = ANY($2)
            "#,
        )
        .bind(org_id.as_str())
        .bind(uuids(model_ids))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to count commits", e))?;

        let count: i64 = row.get("count");
        Ok(count as u64)
    }

    async fn create_branch(&self, branch: Branch) -> Result<Branch, DomainError> {
        let data = encode(&branch)?;

        sqlx::query("INSERT INTO branches (id, prompt_id, data) VALUES ($1, $2, $3)")
            .bind(branch.id().as_uuid())
            .bind(branch.prompt_id().as_str())
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("duplicate key") {
                    DomainError::conflict(format!("Branch '{}' already exists", branch.id()))
                } else {
                    storage_error("Failed to create branch", e)
                }
            })?;

        Ok(branch)
    }

    async fn get_branch(&self, id: &BranchId) -> Result<Option<Branch>, DomainError> {
        let row = sqlx::query("SELECT data FROM branches WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get branch", e))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }
}

#[async_trait]
impl ModelRepository for PostgresEngineStore {
    async fn get(&self, id: &ModelId) -> Result<Option<LanguageModel>, DomainError> {
        let row = sqlx::query("SELECT data FROM language_models WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get model", e))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }

    async fn list(&self) -> Result<Vec<LanguageModel>, DomainError> {
        let rows = sqlx::query("SELECT data FROM language_models ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to list models", e))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }

    async fn list_by_provider_key(
        &self,
        key_id: &ProviderApiKeyId,
    ) -> Result<Vec<LanguageModel>, DomainError> {
        let rows = sqlx::query(
            "SELECT data FROM language_models WHERE provider_key_id = $1 ORDER BY created_at",
        )
        .bind(key_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list models", e))?;

        rows.into_iter().map(|r| decode(r.get("data"))).collect()
    }

    async fn create(&self, model: LanguageModel) -> Result<LanguageModel, DomainError> {
        let data = encode(&model)?;

        sqlx::query(
            "INSERT INTO language_models (id, provider_key_id, name, data) VALUES ($1, $2, $3, $4)",
        )
        .bind(model.id().as_uuid())
        .bind(model.provider_key_id().map(|id| id.as_uuid()))
        .bind(model.name())
        .bind(&data)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("duplicate key") {
                DomainError::conflict(format!("Model '{}' already exists", model.id()))
            } else {
                storage_error("Failed to create model", e)
            }
        })?;

        Ok(model)
    }

    async fn update(&self, model: LanguageModel) -> Result<LanguageModel, DomainError> {
        let data = encode(&model)?;

        let result = sqlx::query(
            "UPDATE language_models SET data = $2, name = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(model.id().as_uuid())
        .bind(&data)
        .bind(model.name())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update model", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ModelNotFound { id: model.id() });
        }

        Ok(model)
    }

    async fn delete(&self, id: &ModelId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM language_models WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete model", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProviderKeyRepository for PostgresEngineStore {
    async fn get(&self, id: &ProviderApiKeyId) -> Result<Option<ProviderApiKey>, DomainError> {
        let row = sqlx::query("SELECT data FROM provider_api_keys WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to get provider key", e))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }

    async fn find_by_org(&self, org_id: &OrgId) -> Result<Option<ProviderApiKey>, DomainError> {
        let row = sqlx::query("SELECT data FROM provider_api_keys WHERE org_id = $1 LIMIT 1")
            .bind(org_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to find provider key", e))?;

        row.map(|r| decode(r.get("data"))).transpose()
    }

    async fn create(&self, key: ProviderApiKey) -> Result<ProviderApiKey, DomainError> {
        if self.find_by_org(key.org_id()).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "Org '{}' already has a custom provider configured",
                key.org_id()
            )));
        }

        let data = encode(&key)?;

        sqlx::query("INSERT INTO provider_api_keys (id, org_id, data) VALUES ($1, $2, $3)")
            .bind(key.id().as_uuid())
            .bind(key.org_id().as_str())
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("duplicate key") {
                    DomainError::conflict(format!("Provider API key '{}' already exists", key.id()))
                } else {
                    storage_error("Failed to create provider key", e)
                }
            })?;

        Ok(key)
    }

    async fn delete(&self, id: &ProviderApiKeyId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM provider_api_keys WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete provider key", e))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AtomicStore for PostgresEngineStore {
    async fn run_atomic_batch(&self, operations: Vec<BatchOperation>) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin transaction", e))?;

        for operation in &operations {
            match operation {
                BatchOperation::ResetPromptModel {
                    prompt_id,
                    model_id,
                    config,
                } => {
                    let row =
                        sqlx::query("SELECT data FROM prompts WHERE id = $1 FOR UPDATE")
                            .bind(prompt_id.as_str())
                            .fetch_optional(&mut *tx)
                            .await
                            .map_err(|e| storage_error("Failed to lock prompt", e))?
                            .ok_or_else(|| {
                                DomainError::not_found(format!(
                                    "Prompt '{}' not found",
                                    prompt_id
                                ))
                            })?;

                    let mut prompt: Prompt = decode(row.get("data"))?;
                    prompt.set_model(*model_id, config.clone());
                    let data = encode(&prompt)?;

                    sqlx::query(
                        "UPDATE prompts SET data = $2, model_id = $3, updated_at = NOW() WHERE id = $1",
                    )
                    .bind(prompt_id.as_str())
                    .bind(&data)
                    .bind(model_id.as_uuid())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| storage_error("Failed to reset prompt model", e))?;
                }
                BatchOperation::ResetCommitModel {
                    commit_id,
                    model_id,
                    config,
                } => {
                    let row = sqlx::query("SELECT data FROM commits WHERE id = $1 FOR UPDATE")
                        .bind(commit_id.as_uuid())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(|e| storage_error("Failed to lock commit", e))?
                        .ok_or_else(|| {
                            DomainError::not_found(format!("Commit '{}' not found", commit_id))
                        })?;

                    let mut commit: Commit = decode(row.get("data"))?;
                    commit.reset_model(*model_id, config.clone());
                    let data = encode(&commit)?;

                    sqlx::query(
                        "UPDATE commits SET data = $2, model_id = $3 WHERE id = $1",
                    )
                    .bind(commit_id.as_uuid())
                    .bind(&data)
                    .bind(model_id.as_uuid())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| storage_error("Failed to reset commit model", e))?;
                }
                BatchOperation::DeleteModel { model_id } => {
                    let result = sqlx::query("DELETE FROM language_models WHERE id = $1")
                        .bind(model_id.as_uuid())
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| storage_error("Failed to delete model", e))?;

                    if result.rows_affected() == 0 {
                        return Err(DomainError::ModelNotFound { id: *model_id });
                    }
                }
                BatchOperation::DeleteProviderKey { key_id } => {
                    let result = sqlx::query("DELETE FROM provider_api_keys WHERE id = $1")
                        .bind(key_id.as_uuid())
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| storage_error("Failed to delete provider key", e))?;

                    if result.rows_affected() == 0 {
                        return Err(DomainError::ApiKeyNotFound { id: *key_id });
                    }
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit transaction", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_config_default() {
        let config = PostgresConfig::default();

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.connect_timeout_secs, 30);
        assert_eq!(config.idle_timeout_secs, 600);
    }

    #[test]
    fn test_postgres_config_builder() {
        let config = PostgresConfig::new("postgres://localhost/test")
            .with_max_connections(20)
            .with_min_connections(5)
            .with_connect_timeout(60)
            .with_idle_timeout(300);

        assert_eq!(config.url, "postgres://localhost/test");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.connect_timeout_secs, 60);
        assert_eq!(config.idle_timeout_secs, 300);
    }
}
