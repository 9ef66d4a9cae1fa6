//! Parameter schema registry keyed by (vendor, model name)

use std::collections::HashMap;

use serde_json::json;

use super::entity::Vendor;
use super::schema::{ParameterDefinition, ParameterSchema};
use crate::domain::prompt::ConfigPayload;

/// Lookup of allowed-parameter definitions per (vendor, model name).
///
/// A missing schema means "no restriction": reconciliation falls back to
/// the vendor-level generic defaults instead of failing.
#[derive(Debug, Clone, Default)]
pub struct ParameterSchemaRegistry {
    schemas: HashMap<(Vendor, String), ParameterSchema>,
}

impl ParameterSchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-seeded with schemas for the stock vendor models
    pub fn with_builtin_schemas() -> Self {
        let mut registry = Self::new();

        for model in ["gpt-4o", "gpt-4o-mini", "gpt-4-turbo"] {
            registry.register(Vendor::OpenAi, model, openai_schema());
        }

        for model in [
            "claude-3-5-sonnet-latest",
            "claude-3-5-haiku-latest",
            "claude-3-opus-latest",
        ] {
            registry.register(Vendor::Anthropic, model, anthropic_schema());
        }

        for model in ["gemini-1.5-pro", "gemini-1.5-flash"] {
            registry.register(Vendor::Google, model, google_schema());
        }

        registry
    }

    pub fn register(
        &mut self,
        vendor: Vendor,
        model_name: impl Into<String>,
        schema: ParameterSchema,
    ) {
        self.schemas.insert((vendor, model_name.into()), schema);
    }

    pub fn resolve(&self, vendor: Vendor, model_name: &str) -> Option<&ParameterSchema> {
        self.schemas.get(&(vendor, model_name.to_string()))
    }

    /// Generic default payload for a model without a registered schema.
    ///
    /// Uses the built-in schema's defaults when the model is known,
    /// otherwise the vendor-level fallback payload.
    pub fn generic_defaults(&self, vendor: Vendor, model_name: &str) -> ConfigPayload {
        if let Some(schema) = self.resolve(vendor, model_name) {
            return schema.default_payload();
        }
        vendor_default_payload(vendor)
    }
}

fn openai_schema() -> ParameterSchema {
    ParameterSchema::new()
        .with_parameter(
            "temperature",
            ParameterDefinition::Numeric {
                min: 0.0,
                max: 2.0,
                default: 1.0,
            },
        )
        .with_parameter(
            "top_p",
            ParameterDefinition::Numeric {
                min: 0.0,
                max: 1.0,
                default: 1.0,
            },
        )
        .with_parameter(
            "max_tokens",
            ParameterDefinition::Numeric {
                min: 1.0,
                max: 16384.0,
                default: 4096.0,
            },
        )
        .with_parameter(
            "presence_penalty",
            ParameterDefinition::Numeric {
                min: -2.0,
                max: 2.0,
                default: 0.0,
            },
        )
        .with_parameter(
            "frequency_penalty",
            ParameterDefinition::Numeric {
                min: -2.0,
                max: 2.0,
                default: 0.0,
            },
        )
        .with_parameter(
            "response_format",
            ParameterDefinition::Enum {
                allowed: vec!["text".to_string(), "json_object".to_string()],
                default: Some("text".to_string()),
            },
        )
}

fn anthropic_schema() -> ParameterSchema {
    ParameterSchema::new()
        .with_parameter(
            "temperature",
            ParameterDefinition::Numeric {
                min: 0.0,
                max: 1.0,
                default: 1.0,
            },
        )
        .with_parameter(
            "top_p",
            ParameterDefinition::Numeric {
                min: 0.0,
                max: 1.0,
                default: 1.0,
            },
        )
        .with_parameter(
            "top_k",
            ParameterDefinition::Numeric {
                min: 0.0,
                max: 500.0,
                default: 0.0,
            },
        )
        .with_parameter(
            "max_tokens",
            ParameterDefinition::Numeric {
                min: 1.0,
                max: 8192.0,
                default: 1024.0,
            },
        )
}

fn google_schema() -> ParameterSchema {
    ParameterSchema::new()
        .with_parameter(
            "temperature",
            ParameterDefinition::Numeric {
                min: 0.0,
                max: 2.0,
                default: 1.0,
            },
        )
        .with_parameter(
            "top_p",
            ParameterDefinition::Numeric {
                min: 0.0,
                max: 1.0,
                default: 0.95,
            },
        )
        .with_parameter(
            "max_output_tokens",
            ParameterDefinition::Numeric {
                min: 1.0,
                max: 8192.0,
                default: 2048.0,
            },
        )
}

fn vendor_default_payload(vendor: Vendor) -> ConfigPayload {
    let mut payload = ConfigPayload::new();
    match vendor {
        Vendor::OpenAi => {
            payload.insert("temperature".to_string(), json!(1.0));
            payload.insert("top_p".to_string(), json!(1.0));
            payload.insert("max_tokens".to_string(), json!(4096.0));
        }
        Vendor::Anthropic => {
            payload.insert("temperature".to_string(), json!(1.0));
            payload.insert("max_tokens".to_string(), json!(1024.0));
        }
        Vendor::Google => {
            payload.insert("temperature".to_string(), json!(1.0));
            payload.insert("top_p".to_string(), json!(0.95));
            payload.insert("max_output_tokens".to_string(), json!(2048.0));
        }
        Vendor::Custom => {
            payload.insert("temperature".to_string(), json!(1.0));
            payload.insert("max_tokens".to_string(), json!(2048.0));
        }
    }
    payload
}
