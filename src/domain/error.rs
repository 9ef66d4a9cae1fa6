use thiserror::Error;

use crate::domain::model::ModelId;
use crate::domain::prompt::OrgId;
use crate::domain::provider::ProviderApiKeyId;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Model '{id}' not found")]
    ModelNotFound { id: ModelId },

    #[error("Provider API key '{id}' not found")]
    ApiKeyNotFound { id: ProviderApiKeyId },

    #[error("No custom provider configured for org '{org_id}'")]
    ProviderNotConfigured { org_id: OrgId },

    #[error("Provider API key '{key_id}' has no base URL configured")]
    ProviderMissingBaseUrl { key_id: ProviderApiKeyId },

    #[error(
        "Provider deletion blocked: {live_usage} prompt(s) and {committed_usage} productive commit(s) still reference its models"
    )]
    ProviderDeletionBlocked { live_usage: u64, committed_usage: u64 },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
