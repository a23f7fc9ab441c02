//! Character roleplay agents.
//!
//! A `CharacterAgent` speaks as one character, either in free chat or as a
//! participant in a directed scene. Each agent keeps its own message history.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rolecast_domain::{CharacterName, CharacterProfile, Creativity, DomainError};

use crate::infrastructure::ports::{ChatMessage, LlmError, LlmPort, LlmRequest};
use crate::use_cases::scene::{fallback_line, PerformerCue, ScenePerformer};

pub struct CharacterAgent {
    name: CharacterName,
    description: String,
    llm: Arc<dyn LlmPort>,
    creativity: Creativity,
    history: Mutex<Vec<ChatMessage>>,
}

impl CharacterAgent {
    pub fn new(name: CharacterName, description: impl Into<String>, llm: Arc<dyn LlmPort>) -> Self {
        Self {
            name,
            description: description.into(),
            llm,
            creativity: Creativity::default(),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn from_profile(profile: &CharacterProfile, llm: Arc<dyn LlmPort>) -> Self {
        Self::new(profile.name().clone(), profile.full_description(), llm)
    }

    pub fn with_creativity(mut self, creativity: Creativity) -> Self {
        self.creativity = creativity;
        self
    }

    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    /// Free conversation in character.
    ///
    /// Never fails: a generator error yields an in-character "distracted" line
    /// and leaves the history untouched.
    pub async fn chat(&self, message: &str) -> String {
        let system_prompt = format!(
            r#"You are roleplaying as the following character. Stay in character at all times.

{description}

IMPORTANT INSTRUCTIONS:
- Respond as this character would, using their personality, background and speech patterns
- Reference your backstory and experiences naturally in conversation
- Show emotions and reactions consistent with your personality
- If asked about things outside your character's knowledge, respond as the character would
- Never break character or mention that you're an AI

You are: {name}"#,
            description = self.description,
            name = self.name,
        );

        match self.exchange(system_prompt, message).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(character = %self.name, error = %e, "Character chat failed");
                fallback_line(&self.name)
            }
        }
    }

    /// One line in a directed scene, responding to `other`.
    ///
    /// The cue and reply are added to the history on success.
    pub async fn scene_line(
        &self,
        cue: &str,
        other: &CharacterName,
        scene_context: &str,
    ) -> Result<String, LlmError> {
        let system_prompt = format!(
            r#"You are roleplaying as the following character in a directed scene WITH ANOTHER CHARACTER.

{description}

You are: {name}
You are interacting with: {other}

SCENE SO FAR:
{context}

DIALOGUE INSTRUCTIONS:
- You are having a CONVERSATION with {other}; speak TO them directly
- If they just said something, RESPOND to what they said
- Use their name naturally when appropriate
- Show your personality through HOW you talk to them
- Keep it brief: 1-3 sentences of dialogue plus an optional *brief action*
- Your line should invite a response from {other}

FORMAT: Speak as your character. Use *asterisks* only for brief physical actions."#,
            description = self.description,
            name = self.name,
            other = other,
            context = scene_context,
        );

        self.exchange(system_prompt, &format!("Director's cue: {}", cue))
            .await
    }

    pub async fn reset(&self) {
        self.history.lock().await.clear();
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.history.lock().await.clone()
    }

    async fn exchange(&self, system_prompt: String, input: &str) -> Result<String, LlmError> {
        let mut messages = self.history.lock().await.clone();
        messages.push(ChatMessage::user(input));

        let request = LlmRequest::new(messages)
            .with_system_prompt(system_prompt)
            .with_temperature(self.creativity.value());

        let response = self.llm.generate(request).await?;
        let reply = response.content.trim().to_string();
        if reply.is_empty() {
            return Err(LlmError::InvalidResponse("Empty reply".to_string()));
        }

        let mut history = self.history.lock().await;
        history.push(ChatMessage::user(input));
        history.push(ChatMessage::assistant(reply.clone()));

        tracing::debug!(character = %self.name, history_len = history.len(), "Character replied");
        Ok(reply)
    }
}

/// The two agents of a scene, performing lines on the director's cue.
pub struct CastPerformer {
    first: Arc<CharacterAgent>,
    second: Arc<CharacterAgent>,
}

impl CastPerformer {
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if both agents play the same character.
    pub fn new(first: Arc<CharacterAgent>, second: Arc<CharacterAgent>) -> Result<Self, DomainError> {
        if first.name() == second.name() {
            return Err(DomainError::constraint(format!(
                "A cast needs two distinct characters, got '{}' twice",
                first.name()
            )));
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> &Arc<CharacterAgent> {
        &self.first
    }

    pub fn second(&self) -> &Arc<CharacterAgent> {
        &self.second
    }

    /// The agent playing `speaker`, if it is part of this cast.
    pub fn agent_for(&self, speaker: &CharacterName) -> Option<&Arc<CharacterAgent>> {
        [&self.first, &self.second]
            .into_iter()
            .find(|agent| agent.name() == speaker)
    }

    /// User talks to both characters: the first replies, then the second
    /// replies having heard both.
    pub async fn group_chat(&self, message: &str) -> (String, String) {
        let first_reply = self.first.chat(message).await;
        let second_input = format!("User: {}\n{}: {}", message, self.first.name(), first_reply);
        let second_reply = self.second.chat(&second_input).await;
        (first_reply, second_reply)
    }

    pub async fn reset(&self) {
        self.first.reset().await;
        self.second.reset().await;
    }
}

#[async_trait]
impl ScenePerformer for CastPerformer {
    async fn perform(&self, cue: &PerformerCue) -> Result<String, LlmError> {
        let agent = match self.agent_for(&cue.speaker) {
            Some(agent) => agent,
            None => {
                tracing::warn!(
                    speaker = %cue.speaker,
                    first = %self.first.name(),
                    second = %self.second.name(),
                    "Cue for a speaker outside the cast, first agent answers"
                );
                &self.first
            }
        };
        agent
            .scene_line(&cue.cue, &cue.counterpart, &cue.scene_context)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MessageRole, ScriptedLlm};

    fn name(s: &str) -> CharacterName {
        CharacterName::new(s).unwrap()
    }

    #[tokio::test]
    async fn chat_keeps_history() {
        let llm = Arc::new(ScriptedLlm::from_fn(|_, call| Ok(format!(" reply {call} "))));
        let agent = CharacterAgent::new(name("Aria"), "Name: Aria", llm.clone());

        assert_eq!(agent.chat("Hello").await, "reply 0");
        assert_eq!(agent.chat("Where to?").await, "reply 1");

        let history = agent.history().await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[3].content, "reply 1");

        // Second call saw the first exchange
        let second = &llm.requests()[1];
        assert_eq!(second.messages.len(), 3);
        assert_eq!(second.messages[2].content, "Where to?");
        assert!(second.system_prompt.as_deref().unwrap().contains("You are: Aria"));
    }

    #[tokio::test]
    async fn chat_failure_is_in_character_and_leaves_history() {
        let llm = Arc::new(ScriptedLlm::failing(LlmError::RequestFailed("down".to_string())));
        let agent = CharacterAgent::new(name("Aria"), "", llm);

        assert_eq!(
            agent.chat("Hello").await,
            "*Aria seems distracted and didn't respond*"
        );
        assert!(agent.history().await.is_empty());
    }

    #[tokio::test]
    async fn reset_clears_history() {
        let agent = CharacterAgent::new(name("Aria"), "", Arc::new(ScriptedLlm::always("hi")));
        agent.chat("Hello").await;
        agent.reset().await;
        assert!(agent.history().await.is_empty());
    }

    #[tokio::test]
    async fn scene_line_prompt_names_the_counterpart() {
        let llm = Arc::new(ScriptedLlm::always("\"Late again, Bram?\" *taps watch*"));
        let agent = CharacterAgent::new(name("Aria"), "Name: Aria", llm.clone())
            .with_creativity(Creativity::new(0.9));

        let line = agent
            .scene_line("Be impatient", &name("Bram"), "Bram: \"Sorry.\"\n")
            .await
            .unwrap();
        assert_eq!(line, "\"Late again, Bram?\" *taps watch*");

        let request = &llm.requests()[0];
        let system = request.system_prompt.as_deref().unwrap();
        assert!(system.contains("You are interacting with: Bram"));
        assert!(system.contains("SCENE SO FAR:\nBram: \"Sorry.\""));
        assert_eq!(request.messages[0].content, "Director's cue: Be impatient");
        assert_eq!(request.temperature, Some(0.9));
        assert_eq!(agent.history().await.len(), 2);
    }

    #[tokio::test]
    async fn scene_line_rejects_empty_reply() {
        let agent = CharacterAgent::new(name("Aria"), "", Arc::new(ScriptedLlm::always("   ")));
        let result = agent.scene_line("cue", &name("Bram"), "").await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
        assert!(agent.history().await.is_empty());
    }

    #[tokio::test]
    async fn cast_routes_cue_to_speaker() {
        let aria_llm = Arc::new(ScriptedLlm::always("from Aria"));
        let bram_llm = Arc::new(ScriptedLlm::always("from Bram"));
        let cast = CastPerformer::new(
            Arc::new(CharacterAgent::new(name("Aria"), "", aria_llm.clone())),
            Arc::new(CharacterAgent::new(name("Bram"), "", bram_llm.clone())),
        )
        .unwrap();

        let cue = PerformerCue {
            speaker: name("Bram"),
            counterpart: name("Aria"),
            cue: "Answer".to_string(),
            scene_context: String::new(),
        };
        assert_eq!(cast.perform(&cue).await.unwrap(), "from Bram");
        assert_eq!(aria_llm.call_count(), 0);
        assert_eq!(bram_llm.call_count(), 1);
    }

    #[tokio::test]
    async fn cue_for_unknown_speaker_goes_to_first_agent() {
        let aria_llm = Arc::new(ScriptedLlm::always("from Aria"));
        let bram_llm = Arc::new(ScriptedLlm::always("from Bram"));
        let cast = CastPerformer::new(
            Arc::new(CharacterAgent::new(name("Aria"), "", aria_llm.clone())),
            Arc::new(CharacterAgent::new(name("Bram"), "", bram_llm.clone())),
        )
        .unwrap();

        assert_eq!(cast.agent_for(&name("Bram")).unwrap().name(), &name("Bram"));
        assert!(cast.agent_for(&name("Cole")).is_none());

        let cue = PerformerCue {
            speaker: name("Cole"),
            counterpart: name("Aria"),
            cue: "Answer".to_string(),
            scene_context: String::new(),
        };
        assert_eq!(cast.perform(&cue).await.unwrap(), "from Aria");
        assert_eq!(bram_llm.call_count(), 0);
    }

    #[tokio::test]
    async fn cast_rejects_same_character_twice() {
        let llm: Arc<dyn LlmPort> = Arc::new(ScriptedLlm::always("x"));
        let result = CastPerformer::new(
            Arc::new(CharacterAgent::new(name("Aria"), "", llm.clone())),
            Arc::new(CharacterAgent::new(name("Aria"), "", llm)),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn group_chat_second_hears_first() {
        let bram_llm = Arc::new(ScriptedLlm::always("Indeed."));
        let cast = CastPerformer::new(
            Arc::new(CharacterAgent::new(name("Aria"), "", Arc::new(ScriptedLlm::always("Hello!")))),
            Arc::new(CharacterAgent::new(name("Bram"), "", bram_llm.clone())),
        )
        .unwrap();

        let (first, second) = cast.group_chat("Hi both").await;
        assert_eq!(first, "Hello!");
        assert_eq!(second, "Indeed.");
        assert_eq!(
            bram_llm.requests()[0].messages[0].content,
            "User: Hi both\nAria: Hello!"
        );
    }
}
