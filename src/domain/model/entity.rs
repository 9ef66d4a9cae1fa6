//! Language model entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::ParameterSchema;
use crate::domain::prompt::OrgId;
use crate::domain::provider::ProviderApiKeyId;

/// Language model identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(Uuid);

impl ModelId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ModelId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Model vendor (provider family)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    OpenAi,
    Anthropic,
    Google,
    Custom,
}

impl Vendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Language model entity
///
/// Built-in models have no owner; models imported from a custom provider
/// carry the owning org and provider key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageModel {
    /// Unique identifier
    id: ModelId,

    /// Vendor-facing model name (e.g. "gpt-4o")
    name: String,

    /// Display name shown to users
    display_name: String,

    /// Description of the model
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    /// Vendor this model belongs to
    vendor: Vendor,

    /// Allowed-parameter definitions; None means no restriction
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters_schema: Option<ParameterSchema>,

    /// Owning organization (None = built-in)
    #[serde(skip_serializing_if = "Option::is_none")]
    org_id: Option<OrgId>,

    /// Owning provider API key (None = built-in)
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_key_id: Option<ProviderApiKeyId>,

    /// Price per 1k input tokens
    input_price: f64,

    /// Price per 1k output tokens
    output_price: f64,

    /// Maximum input tokens accepted
    max_input_tokens: u32,

    /// Maximum output tokens produced
    max_output_tokens: u32,

    /// Creation timestamp
    created_at: DateTime<Utc>,

    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl LanguageModel {
    /// Create a new LanguageModel with zeroed pricing and limits
    pub fn new(id: ModelId, name: impl Into<String>, vendor: Vendor) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id,
            display_name: name.clone(),
            name,
            description: None,
            vendor,
            parameters_schema: None,
            org_id: None,
            provider_key_id: None,
            input_price: 0.0,
            output_price: 0.0,
            max_input_tokens: 0,
            max_output_tokens: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameters_schema(mut self, schema: ParameterSchema) -> Self {
        self.parameters_schema = Some(schema);
        self
    }

    pub fn with_owner(mut self, org_id: OrgId, provider_key_id: ProviderApiKeyId) -> Self {
        self.org_id = Some(org_id);
        self.provider_key_id = Some(provider_key_id);
        self
    }

    pub fn with_pricing(mut self, input_price: f64, output_price: f64) -> Self {
        self.input_price = input_price;
        self.output_price = output_price;
        self
    }

    pub fn with_limits(mut self, max_input_tokens: u32, max_output_tokens: u32) -> Self {
        self.max_input_tokens = max_input_tokens;
        self.max_output_tokens = max_output_tokens;
        self
    }

    // Getters

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn parameters_schema(&self) -> Option<&ParameterSchema> {
        self.parameters_schema.as_ref()
    }

    pub fn org_id(&self) -> Option<&OrgId> {
        self.org_id.as_ref()
    }

    pub fn provider_key_id(&self) -> Option<ProviderApiKeyId> {
        self.provider_key_id
    }

    pub fn input_price(&self) -> f64 {
        self.input_price
    }

    pub fn output_price(&self) -> f64 {
        self.output_price
    }

    pub fn max_input_tokens(&self) -> u32 {
        self.max_input_tokens
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    /// Replace the allowed-parameter definitions.
    ///
    /// Callers are expected to reindex the prompts referencing this model
    /// afterwards so stored configurations stay valid.
    pub fn set_parameters_schema(&mut self, schema: Option<ParameterSchema>) {
        self.parameters_schema = schema;
        self.touch();
    }

    pub fn set_pricing(&mut self, input_price: f64, output_price: f64) {
        self.input_price = input_price;
        self.output_price = output_price;
        self.touch();
    }

    pub fn set_limits(&mut self, max_input_tokens: u32, max_output_tokens: u32) {
        self.max_input_tokens = max_input_tokens;
        self.max_output_tokens = max_output_tokens;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::schema::ParameterDefinition;

    #[test]
    fn test_model_creation_zeroes_pricing_and_limits() {
        let model = LanguageModel::new(ModelId::generate(), "gpt-4o", Vendor::OpenAi);

        assert_eq!(model.name(), "gpt-4o");
        assert_eq!(model.display_name(), "gpt-4o");
        assert_eq!(model.input_price(), 0.0);
        assert_eq!(model.output_price(), 0.0);
        assert_eq!(model.max_input_tokens(), 0);
        assert!(model.org_id().is_none());
        assert!(model.provider_key_id().is_none());
    }

    #[test]
    fn test_model_builder() {
        let org = OrgId::new("acme").unwrap();
        let key_id = ProviderApiKeyId::generate();
        let schema = ParameterSchema::new().with_parameter(
            "temperature",
            ParameterDefinition::Numeric {
                min: 0.0,
                max: 2.0,
                default: 1.0,
            },
        );

        let model = LanguageModel::new(ModelId::generate(), "llama-3-70b", Vendor::Custom)
            .with_display_name("Llama 3 70B")
            .with_description("Self-hosted Llama deployment")
            .with_parameters_schema(schema)
            .with_owner(org.clone(), key_id)
            .with_pricing(0.5, 1.5)
            .with_limits(8192, 4096);

        assert_eq!(model.display_name(), "Llama 3 70B");
        assert_eq!(model.vendor(), Vendor::Custom);
        assert_eq!(model.org_id(), Some(&org));
        assert_eq!(model.provider_key_id(), Some(key_id));
        assert!(model.parameters_schema().is_some());
        assert_eq!(model.max_input_tokens(), 8192);
    }

    #[test]
    fn test_vendor_display() {
        assert_eq!(Vendor::OpenAi.to_string(), "openai");
        assert_eq!(Vendor::Custom.to_string(), "custom");
    }
}
