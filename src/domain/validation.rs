//! Identifier validation utilities

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length for string identifiers (org ids, prompt ids)
pub const MAX_IDENTIFIER_LENGTH: usize = 50;

/// Regex pattern for valid identifiers (alphanumeric + hyphens)
static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]$|^[a-zA-Z0-9]$").unwrap());

/// Identifier validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierError {
    /// Identifier is empty
    Empty,
    /// Identifier exceeds maximum length
    TooLong { length: usize, max: usize },
    /// Identifier contains invalid characters
    InvalidFormat { id: String },
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Identifier cannot be empty"),
            Self::TooLong { length, max } => {
                write!(f, "Identifier too long: {} characters (max {})", length, max)
            }
            Self::InvalidFormat { id } => {
                write!(
                    f,
                    "Invalid identifier format '{}': must be alphanumeric with hyphens, cannot start or end with hyphen",
                    id
                )
            }
        }
    }
}

impl std::error::Error for IdentifierError {}

/// Validate a string identifier
pub fn validate_identifier(id: &str) -> Result<(), IdentifierError> {
    if id.is_empty() {
        return Err(IdentifierError::Empty);
    }

    if id.len() > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierError::TooLong {
            length: id.len(),
            max: MAX_IDENTIFIER_LENGTH,
        });
    }

    if !IDENTIFIER_PATTERN.is_match(id) {
        return Err(IdentifierError::InvalidFormat { id: id.to_string() });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("a").is_ok());
        assert!(validate_identifier("acme").is_ok());
        assert!(validate_identifier("my-prompt-1").is_ok());
        assert!(validate_identifier("Org-42").is_ok());
        assert!(validate_identifier("1a").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(matches!(
            validate_identifier(""),
            Err(IdentifierError::Empty)
        ));

        let long_id = "a".repeat(51);
        assert!(matches!(
            validate_identifier(&long_id),
            Err(IdentifierError::TooLong { .. })
        ));

        assert!(matches!(
            validate_identifier("my_prompt"),
            Err(IdentifierError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_identifier("my prompt"),
            Err(IdentifierError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_identifier("-prompt"),
            Err(IdentifierError::InvalidFormat { .. })
        ));
        assert!(matches!(
            validate_identifier("prompt-"),
            Err(IdentifierError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_max_length_identifier() {
        let max_id = "a".repeat(50);
        assert!(validate_identifier(&max_id).is_ok());
    }
}
