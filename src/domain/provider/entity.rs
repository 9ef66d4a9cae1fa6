//! Provider API key entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::model::Vendor;
use crate::domain::prompt::OrgId;

/// Provider API key identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderApiKeyId(Uuid);

impl ProviderApiKeyId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ProviderApiKeyId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ProviderApiKeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credentials for an org's custom model provider.
///
/// An org has at most one custom provider; its key owns the language
/// models imported from that provider's listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderApiKey {
    /// Unique identifier
    id: ProviderApiKeyId,
    /// Owning organization
    org_id: OrgId,
    /// Vendor family of the provider
    vendor: Vendor,
    /// Key material
    secret: String,
    /// Endpoint for self-hosted / custom deployments
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    /// Display name shown to users
    display_name: String,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl ProviderApiKey {
    pub fn new(
        id: ProviderApiKeyId,
        org_id: OrgId,
        vendor: Vendor,
        secret: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            org_id,
            vendor,
            secret: secret.into(),
            base_url: None,
            display_name: display_name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    // Getters

    pub fn id(&self) -> ProviderApiKeyId {
        self.id
    }

    pub fn org_id(&self) -> &OrgId {
        &self.org_id
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.secret = secret.into();
        self.touch();
    }

    pub fn set_base_url(&mut self, base_url: Option<String>) {
        self.base_url = base_url;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_key_creation() {
        let key = ProviderApiKey::new(
            ProviderApiKeyId::generate(),
            OrgId::new("acme").unwrap(),
            Vendor::Custom,
            "sk-secret",
            "Acme vLLM cluster",
        )
        .with_base_url("https://llm.acme.internal/v1");

        assert_eq!(key.org_id().as_str(), "acme");
        assert_eq!(key.vendor(), Vendor::Custom);
        assert_eq!(key.base_url(), Some("https://llm.acme.internal/v1"));
        assert_eq!(key.display_name(), "Acme vLLM cluster");
    }

    #[test]
    fn test_provider_key_without_base_url() {
        let key = ProviderApiKey::new(
            ProviderApiKeyId::generate(),
            OrgId::new("acme").unwrap(),
            Vendor::OpenAi,
            "sk-secret",
            "OpenAI",
        );

        assert!(key.base_url().is_none());
    }
}
