//! Scene participants - the two characters allowed to speak in a scene.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::CharacterName;

/// One named roleplay entity in a scene.
///
/// The description is an opaque blob owned by the character subsystem; the
/// scene only ever forwards it to the generators as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: CharacterName,
    pub description: String,
}

impl Participant {
    pub fn new(name: CharacterName, description: impl Into<String>) -> Self {
        Self {
            name,
            description: description.into(),
        }
    }
}

/// The exact pair of participants in a scene.
///
/// # Invariants
///
/// - Exactly two participants
/// - Their names are distinct
///
/// `first` is the canonical opener when nobody has spoken yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneCast {
    first: Participant,
    second: Participant,
}

impl SceneCast {
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if both participants share a name.
    pub fn new(first: Participant, second: Participant) -> Result<Self, DomainError> {
        if first.name == second.name {
            return Err(DomainError::constraint(format!(
                "Scene participants must have distinct names, got '{}' twice",
                first.name
            )));
        }
        Ok(Self { first, second })
    }

    #[inline]
    pub fn first(&self) -> &Participant {
        &self.first
    }

    #[inline]
    pub fn second(&self) -> &Participant {
        &self.second
    }

    /// Look up a participant by name.
    pub fn get(&self, name: &CharacterName) -> Option<&Participant> {
        if self.first.name == *name {
            Some(&self.first)
        } else if self.second.name == *name {
            Some(&self.second)
        } else {
            None
        }
    }

    pub fn contains(&self, name: &CharacterName) -> bool {
        self.get(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(name: &str) -> Participant {
        Participant::new(CharacterName::new(name).unwrap(), format!("{name} desc"))
    }

    #[test]
    fn distinct_names_accepted() {
        let cast = SceneCast::new(participant("Aria"), participant("Bram")).unwrap();
        assert_eq!(cast.first().name.as_str(), "Aria");
        assert_eq!(cast.second().name.as_str(), "Bram");
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = SceneCast::new(participant("Aria"), participant(" Aria ")).unwrap_err();
        assert!(matches!(err, DomainError::Constraint(_)));
    }

    #[test]
    fn lookup_by_name() {
        let cast = SceneCast::new(participant("Aria"), participant("Bram")).unwrap();
        let bram = CharacterName::new("Bram").unwrap();
        let cole = CharacterName::new("Cole").unwrap();
        assert_eq!(cast.get(&bram).map(|p| p.description.as_str()), Some("Bram desc"));
        assert!(!cast.contains(&cole));
    }
}
