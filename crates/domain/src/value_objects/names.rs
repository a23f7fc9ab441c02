//! Validated character name newtype
//!
//! Names are valid by construction:
//! - Non-empty
//! - Within length limits
//! - Trimmed of leading/trailing whitespace

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for a character name
const MAX_NAME_LENGTH: usize = 200;

/// A validated character name (non-empty, <=200 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CharacterName(String);

impl CharacterName {
    /// Create a new validated character name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The name is empty after trimming
    /// - The name exceeds 200 characters after trimming
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Character name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Character name cannot exceed {} characters",
                MAX_NAME_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CharacterName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CharacterName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl TryFrom<String> for CharacterName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CharacterName> for String {
    fn from(name: CharacterName) -> String {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_name() {
        let name = CharacterName::new("Aria").unwrap();
        assert_eq!(name.as_str(), "Aria");
        assert_eq!(name.to_string(), "Aria");
    }

    #[test]
    fn name_is_trimmed() {
        let name = CharacterName::new("  Bram \n").unwrap();
        assert_eq!(name.as_str(), "Bram");
    }

    #[test]
    fn empty_name_rejected() {
        let err = CharacterName::new("").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn whitespace_only_rejected() {
        assert!(CharacterName::new("   ").is_err());
    }

    #[test]
    fn too_long_rejected() {
        let err = CharacterName::new("a".repeat(201)).unwrap_err();
        assert!(err.to_string().contains("cannot exceed 200"));
    }

    #[test]
    fn serde_roundtrip_validates() {
        let name: CharacterName = serde_json::from_str("\"Aria\"").unwrap();
        assert_eq!(name.as_str(), "Aria");
        assert!(serde_json::from_str::<CharacterName>("\"  \"").is_err());
    }
}
