//! Allowed-parameter definitions and configuration sanitization

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::prompt::ConfigPayload;

/// Definition of a single model parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterDefinition {
    /// Numeric parameter clamped into [min, max]
    Numeric { min: f64, max: f64, default: f64 },
    /// String parameter restricted to an allowed set
    Enum {
        allowed: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<String>,
    },
    /// Boolean toggle
    Flag { default: bool },
}

impl ParameterDefinition {
    /// Sanitize a stored value against this definition.
    ///
    /// A value that is already valid is returned unchanged, so repeated
    /// sanitization is a fixed point.
    pub fn sanitize(&self, current: Option<&Value>) -> Value {
        match self {
            Self::Numeric { min, max, default } => {
                let Some(value) = current else {
                    return json!(default.clamp(*min, *max));
                };
                match value.as_f64() {
                    Some(n) if n < *min => json!(*min),
                    Some(n) if n > *max => json!(*max),
                    Some(_) => value.clone(),
                    None => json!(default.clamp(*min, *max)),
                }
            }
            Self::Enum { allowed, default } => {
                if let Some(value) = current {
                    if value
                        .as_str()
                        .is_some_and(|s| allowed.iter().any(|a| a == s))
                    {
                        return value.clone();
                    }
                }
                match default {
                    Some(d) => Value::String(d.clone()),
                    None => allowed
                        .first()
                        .map(|a| Value::String(a.clone()))
                        .unwrap_or(Value::Null),
                }
            }
            Self::Flag { default } => match current.and_then(Value::as_bool) {
                Some(b) => Value::Bool(b),
                None => Value::Bool(*default),
            },
        }
    }
}

/// Set of enabled parameters for a model.
///
/// Keys not present here are disallowed: sanitization drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    parameters: BTreeMap<String, ParameterDefinition>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        definition: ParameterDefinition,
    ) -> Self {
        self.parameters.insert(name.into(), definition);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.get(name)
    }

    pub fn parameters(&self) -> &BTreeMap<String, ParameterDefinition> {
        &self.parameters
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Sanitize a configuration payload against this schema.
    ///
    /// Every enabled parameter ends up present (clamped, coerced or
    /// defaulted); every unknown key is dropped. Idempotent:
    /// `sanitize(sanitize(x)) == sanitize(x)`.
    pub fn sanitize(&self, current: &ConfigPayload) -> ConfigPayload {
        self.parameters
            .iter()
            .map(|(name, definition)| (name.clone(), definition.sanitize(current.get(name))))
            .collect()
    }

    /// The payload produced by sanitizing an empty configuration
    pub fn default_payload(&self) -> ConfigPayload {
        self.sanitize(&ConfigPayload::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ParameterSchema {
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
                "response_format",
                ParameterDefinition::Enum {
                    allowed: vec!["text".to_string(), "json_object".to_string()],
                    default: Some("text".to_string()),
                },
            )
            .with_parameter("stream", ParameterDefinition::Flag { default: false })
    }

    fn payload(entries: &[(&str, Value)]) -> ConfigPayload {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_numeric_clamped_not_rejected() {
        let sanitized = schema().sanitize(&payload(&[("temperature", json!(3.5))]));
        assert_eq!(sanitized["temperature"], json!(2.0));

        let sanitized = schema().sanitize(&payload(&[("temperature", json!(-1.0))]));
        assert_eq!(sanitized["temperature"], json!(0.0));
    }

    #[test]
    fn test_numeric_in_range_kept_verbatim() {
        let sanitized = schema().sanitize(&payload(&[("temperature", json!(1))]));
        // Integer representation survives so re-sanitizing is a no-op.
        assert_eq!(sanitized["temperature"], json!(1));
    }

    #[test]
    fn test_numeric_non_number_replaced_with_default() {
        let sanitized = schema().sanitize(&payload(&[("temperature", json!("hot"))]));
        assert_eq!(sanitized["temperature"], json!(1.0));
    }

    #[test]
    fn test_enum_outside_allowed_falls_back_to_default() {
        let sanitized = schema().sanitize(&payload(&[("response_format", json!("yaml"))]));
        assert_eq!(sanitized["response_format"], json!("text"));
    }

    #[test]
    fn test_enum_without_default_uses_first_allowed() {
        let definition = ParameterDefinition::Enum {
            allowed: vec!["low".to_string(), "high".to_string()],
            default: None,
        };
        assert_eq!(definition.sanitize(Some(&json!("extreme"))), json!("low"));
    }

    #[test]
    fn test_flag_coercion() {
        let sanitized = schema().sanitize(&payload(&[("stream", json!("yes"))]));
        assert_eq!(sanitized["stream"], json!(false));

        let sanitized = schema().sanitize(&payload(&[("stream", json!(true))]));
        assert_eq!(sanitized["stream"], json!(true));
    }

    #[test]
    fn test_unknown_keys_dropped() {
        let sanitized = schema().sanitize(&payload(&[
            ("temperature", json!(0.5)),
            ("logit_bias", json!({"50256": -100})),
        ]));
        assert!(!sanitized.contains_key("logit_bias"));
        assert_eq!(sanitized.len(), 3);
    }

    #[test]
    fn test_missing_parameters_filled_with_defaults() {
        let sanitized = schema().sanitize(&ConfigPayload::new());
        assert_eq!(sanitized["temperature"], json!(1.0));
        assert_eq!(sanitized["response_format"], json!("text"));
        assert_eq!(sanitized["stream"], json!(false));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            ConfigPayload::new(),
            payload(&[("temperature", json!(9.9)), ("stream", json!(1))]),
            payload(&[("response_format", json!("json_object"))]),
            payload(&[("unknown", json!("x")), ("temperature", json!("cold"))]),
        ];

        let schema = schema();
        for input in inputs {
            let once = schema.sanitize(&input);
            assert_eq!(schema.sanitize(&once), once);
        }
    }

    #[test]
    fn test_out_of_range_default_is_clamped_on_fill() {
        let definition = ParameterDefinition::Numeric {
            min: 0.0,
            max: 1.0,
            default: 2.0,
        };
        assert_eq!(definition.sanitize(None), json!(1.0));
    }

    #[test]
    fn test_default_payload() {
        let defaults = schema().default_payload();
        assert_eq!(defaults, schema().sanitize(&defaults));
        assert_eq!(defaults.len(), 3);
    }

    #[test]
    fn test_schema_serde_round_trip() {
        let schema = schema();
        let json = serde_json::to_string(&schema).unwrap();
        let back: ParameterSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(schema, back);
    }
}
