//! Backstory writing for a drafted character.

use std::sync::Arc;

use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};

const BACKSTORY_SYSTEM_PROMPT: &str = "You are a creative character development specialist. \
Based on the character's appearance and the personality and background details provided, \
create a rich, detailed backstory that ties everything together. \
Include the character's origins, key life events, motivations, relationships, \
and how they became who they are. \
Make it engaging and narratively coherent. Write 3-4 paragraphs. \
Output only the backstory text, no additional formatting.";

pub struct WriteBackstory {
    llm: Arc<dyn LlmPort>,
    max_tokens: Option<u32>,
}

impl WriteBackstory {
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

    /// Write a backstory. `None` if the generator fails or returns nothing.
    pub async fn execute(&self, name: &str, appearance: &str, personality: &str) -> Option<String> {
        let message = format!(
            "Character Name: {name}\n\nAPPEARANCE:\n{appearance}\n\nPERSONALITY & BACKGROUND:\n{personality}\n\nCreate a detailed, engaging backstory for this character."
        );

        let request = LlmRequest::new(vec![ChatMessage::user(message)])
            .with_system_prompt(BACKSTORY_SYSTEM_PROMPT)
            .with_max_tokens(self.max_tokens);

        match self.llm.generate(request).await {
            Ok(response) => {
                let backstory = response.content.trim();
                if backstory.is_empty() {
                    tracing::warn!(character = %name, "Backstory reply was empty");
                    return None;
                }
                tracing::info!(character = %name, chars = backstory.len(), "Backstory written");
                Some(backstory.to_string())
            }
            Err(e) => {
                tracing::warn!(character = %name, error = %e, "Backstory generation failed");
                None
            }
        }
    }
}
