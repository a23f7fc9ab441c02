//! Character drafting from an appearance description.
//!
//! Asks the LLM for an image prompt, a name and a personality sketch in a
//! line-oriented format and parses the reply leniently.

use std::sync::Arc;

use rolecast_domain::{CharacterName, CharacterProfile, Creativity, DomainError};

use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};

/// Name used when the reply does not provide one.
pub const UNNAMED_CHARACTER: &str = "Unnamed Character";

const DRAFT_SYSTEM_PROMPT: &str = "You are a professional prompt engineer for anime art generation. \
Based on character appearance details, create ONE detailed prompt for an AI art generator. \
Use the formula: (subject/character description)(artistic medium)(style references)(lighting)(colors)(composition). \
Speak naturally without brackets. Be specific and vivid. \
After the prompt, create a brief character name and initial personality sketch. \
Output format:\nPrompt: <prompt>\nName: <name>\nPersonality: <brief description>";

/// A first pass at a character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDraft {
    pub image_prompt: String,
    pub name: String,
    pub personality_sketch: String,
}

impl CharacterDraft {
    /// Parse a `Prompt:` / `Name:` / `Personality:` reply.
    ///
    /// A missing name becomes "Unnamed Character"; a missing prompt becomes
    /// the whole reply.
    pub fn parse(reply: &str) -> Self {
        let mut image_prompt = String::new();
        let mut name = String::new();
        let mut personality_sketch = String::new();

        for line in reply.lines().map(str::trim) {
            if let Some(rest) = line.strip_prefix("Prompt:") {
                image_prompt = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("Name:") {
                name = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("Personality:") {
                personality_sketch = rest.trim().to_string();
            }
        }

        if image_prompt.is_empty() {
            image_prompt = reply.trim().to_string();
        }
        if name.is_empty() {
            name = UNNAMED_CHARACTER.to_string();
        }

        Self {
            image_prompt,
            name,
            personality_sketch,
        }
    }

    /// Turn the draft into a profile for the given appearance.
    pub fn into_profile(self, appearance: &str) -> Result<CharacterProfile, DomainError> {
        let name = CharacterName::new(self.name)?;
        Ok(CharacterProfile::new(name)
            .with_appearance(appearance)
            .with_personality(self.personality_sketch)
            .with_image_prompt(self.image_prompt))
    }
}

pub struct DraftCharacter {
    llm: Arc<dyn LlmPort>,
    max_tokens: Option<u32>,
}

impl DraftCharacter {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self {
            llm,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Draft a character. `None` if the generator fails.
    pub async fn execute(&self, appearance: &str, creativity: Creativity) -> Option<CharacterDraft> {
        let request = LlmRequest::new(vec![ChatMessage::user(appearance)])
            .with_system_prompt(DRAFT_SYSTEM_PROMPT)
            .with_temperature(creativity.value())
            .with_max_tokens(self.max_tokens);

        tracing::debug!(creativity = %creativity, "Drafting character");

        match self.llm.generate(request).await {
            Ok(response) => {
                let draft = CharacterDraft::parse(&response.content);
                tracing::info!(name = %draft.name, "Character drafted");
                Some(draft)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Character draft failed");
                None
            }
        }
    }
}
