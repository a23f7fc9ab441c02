//! Character profile - the result of the creation flow.
//!
//! A profile is filled in stages: appearance first (which also yields the
//! image prompt and an initial name/personality sketch), then the backstory.
//! The rendered `full_description` is what chat and scenes see of a character.

use serde::{Deserialize, Serialize};

use crate::entities::Participant;
use crate::value_objects::CharacterName;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    name: CharacterName,
    appearance: String,
    personality: String,
    backstory: String,
    image_prompt: String,
}

impl CharacterProfile {
    pub fn new(name: CharacterName) -> Self {
        Self {
            name,
            appearance: String::new(),
            personality: String::new(),
            backstory: String::new(),
            image_prompt: String::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    #[inline]
    pub fn appearance(&self) -> &str {
        &self.appearance
    }

    #[inline]
    pub fn personality(&self) -> &str {
        &self.personality
    }

    #[inline]
    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    #[inline]
    pub fn image_prompt(&self) -> &str {
        &self.image_prompt
    }

    // =========================================================================
    // Builder
    // =========================================================================

    pub fn with_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.appearance = appearance.into();
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    pub fn with_backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    pub fn with_image_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.image_prompt = prompt.into();
        self
    }

    pub fn rename(&mut self, name: CharacterName) {
        self.name = name;
    }

    /// Render the description blob used as generation context.
    ///
    /// Sections with no content are omitted.
    pub fn full_description(&self) -> String {
        let mut parts = vec![format!("Name: {}", self.name)];

        for (label, body) in [
            ("Appearance", &self.appearance),
            ("Personality", &self.personality),
            ("Backstory", &self.backstory),
        ] {
            let body = body.trim();
            if !body.is_empty() {
                parts.push(format!("{}:\n{}", label, body));
            }
        }

        parts.join("\n\n")
    }

    pub fn to_participant(&self) -> Participant {
        Participant::new(self.name.clone(), self.full_description())
    }
}
