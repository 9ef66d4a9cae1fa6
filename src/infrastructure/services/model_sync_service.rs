//! Model sync service - reconciles provider model listings with storage

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::domain::{
    DomainError, LanguageModel, ModelId, ModelRepository, OrgId, ProviderApiKey,
    ProviderApiKeyId, ProviderKeyRepository, Vendor,
};

/// A model name fetched from a provider's listing endpoint
#[derive(Debug, Clone)]
pub struct FetchedModel {
    pub name: String,
    pub display_name: Option<String>,
}

impl FetchedModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Outcome of a model sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub created: u64,
    pub existing: u64,
}

/// Reconciles an externally-fetched model listing against stored models.
///
/// Create-missing, preserve-existing: admin-edited pricing and limits on
/// already-stored models are never overwritten, and models that dropped
/// out of the listing are never deleted here (removal goes through the
/// explicit provider deletion flow).
#[derive(Debug)]
pub struct ModelSyncService {
    models: Arc<dyn ModelRepository>,
    provider_keys: Arc<dyn ProviderKeyRepository>,
}

impl ModelSyncService {
    pub fn new(
        models: Arc<dyn ModelRepository>,
        provider_keys: Arc<dyn ProviderKeyRepository>,
    ) -> Self {
        Self {
            models,
            provider_keys,
        }
    }

    /// Sync the fetched listing for the org's custom provider
    pub async fn sync_models(
        &self,
        org_id: &OrgId,
        fetched: &[FetchedModel],
    ) -> Result<SyncOutcome, DomainError> {
        let key = self
            .provider_keys
            .find_by_org(org_id)
            .await?
            .ok_or_else(|| DomainError::ProviderNotConfigured {
                org_id: org_id.clone(),
            })?;

        self.sync_for_key(&key, fetched).await
    }

    /// Sync the fetched listing for a specific provider key
    pub async fn sync_models_for_key(
        &self,
        key_id: &ProviderApiKeyId,
        fetched: &[FetchedModel],
    ) -> Result<SyncOutcome, DomainError> {
        let key = self
            .provider_keys
            .get(key_id)
            .await?
            .ok_or(DomainError::ApiKeyNotFound { id: *key_id })?;

        self.sync_for_key(&key, fetched).await
    }

    async fn sync_for_key(
        &self,
        key: &ProviderApiKey,
        fetched: &[FetchedModel],
    ) -> Result<SyncOutcome, DomainError> {
        if key.vendor() == Vendor::Custom && key.base_url().is_none() {
            return Err(DomainError::ProviderMissingBaseUrl { key_id: key.id() });
        }

        let stored = self.models.list_by_provider_key(&key.id()).await?;
        let mut known: HashSet<String> =
            stored.into_iter().map(|m| m.name().to_string()).collect();

        let mut outcome = SyncOutcome::default();
        for entry in fetched {
            if known.contains(&entry.name) {
                outcome.existing += 1;
                continue;
            }

            let model = LanguageModel::new(ModelId::generate(), &entry.name, key.vendor())
                .with_display_name(entry.display_name.clone().unwrap_or_else(|| entry.name.clone()))
                .with_description(format!(
                    "Imported from the {} model listing",
                    key.display_name()
                ))
                .with_owner(key.org_id().clone(), key.id());

            self.models.create(model).await?;
            known.insert(entry.name.clone());
            outcome.created += 1;
        }

        info!(
            provider_key_id = %key.id(),
            created = outcome.created,
            existing = outcome.existing,
            "synced provider models"
        );
        Ok(outcome)
    }
}
