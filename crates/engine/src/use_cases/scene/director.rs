//! Scene direction via LLM.
//!
//! Produces one `Directive` per scene advance. Turn order, pacing and
//! completion are decided by the domain policies; the LLM only supplies prose
//! (narration and a cue for the speaker). Whatever the LLM returns is repaired
//! against those policies, and an unusable or failed reply degrades to a
//! default directive instead of an error.

use std::sync::Arc;

use rolecast_domain::scene::{counterpart, may_complete, needs_narration, select_next};
use rolecast_domain::{CharacterName, Creativity, Directive, SceneCast, SceneState};

use crate::infrastructure::ports::{ChatMessage, LlmError, LlmPort, LlmRequest};

/// How many earlier narrations the director is shown so it avoids repeating them.
pub const PREVIOUS_NARRATION_LIMIT: usize = 3;

/// Everything the director needs to know about a scene, as an owned snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionContext {
    pub instruction: String,
    pub cast: SceneCast,
    /// Rendered dialogue (utterances and directions, no narration)
    pub dialogue: String,
    pub exchange_count: usize,
    pub last_speaker: Option<CharacterName>,
    pub first_spoke: bool,
    pub second_spoke: bool,
    pub previous_narrations: Vec<String>,
}

impl DirectionContext {
    pub fn from_state(cast: &SceneCast, state: &SceneState) -> Self {
        let transcript = state.transcript();
        Self {
            instruction: state.instruction().to_string(),
            cast: cast.clone(),
            dialogue: transcript.render_dialogue_context(),
            exchange_count: transcript.exchange_count(),
            last_speaker: transcript.last_speaker().cloned(),
            first_spoke: transcript.has_spoken(&cast.first().name),
            second_spoke: transcript.has_spoken(&cast.second().name),
            previous_narrations: transcript.collect_recent_narrations(PREVIOUS_NARRATION_LIMIT),
        }
    }

    /// The participant who must speak next.
    pub fn forced_speaker(&self) -> &CharacterName {
        select_next(
            self.last_speaker.as_ref(),
            self.first_spoke,
            self.second_spoke,
            &self.cast.first().name,
            &self.cast.second().name,
        )
    }

    /// The participant being responded to this turn.
    pub fn responding_to(&self) -> &CharacterName {
        counterpart(
            self.forced_speaker(),
            &self.cast.first().name,
            &self.cast.second().name,
        )
    }
}

/// Fields the LLM may return. Every field is optional; absence is ordinary data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDirection {
    pub narration: Option<String>,
    pub next_character: Option<String>,
    pub prompt_for_character: Option<String>,
    pub scene_complete: Option<bool>,
}

/// Outcome of decoding an LLM reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionDecode {
    /// The reply was a JSON object; fields may still be missing.
    Parsed(RawDirection),
    /// The reply could not be interpreted as a JSON object.
    Unparseable { reason: String },
    /// The LLM call itself failed.
    Unavailable(LlmError),
}

impl DirectionDecode {
    pub fn into_raw(self) -> RawDirection {
        match self {
            Self::Parsed(raw) => raw,
            Self::Unparseable { .. } | Self::Unavailable(_) => RawDirection::default(),
        }
    }
}

/// Decode an LLM reply into a `RawDirection`.
///
/// Tolerates markdown code fences and prose around the JSON object.
pub fn decode_direction(reply: &str) -> DirectionDecode {
    let json_str = extract_json(reply);
    let parsed: serde_json::Value = match serde_json::from_str(json_str) {
        Ok(value) => value,
        Err(e) => {
            return DirectionDecode::Unparseable {
                reason: e.to_string(),
            }
        }
    };

    let Some(object) = parsed.as_object() else {
        return DirectionDecode::Unparseable {
            reason: "reply is not a JSON object".to_string(),
        };
    };

    let text_field = |key: &str| {
        object
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
    };

    DirectionDecode::Parsed(RawDirection {
        narration: text_field("narration"),
        next_character: text_field("next_character"),
        prompt_for_character: text_field("prompt_for_character").filter(|s| !s.is_empty()),
        scene_complete: object.get("scene_complete").and_then(|v| match v {
            serde_json::Value::Bool(b) => Some(*b),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }),
    })
}

/// Extract JSON from a reply that might have markdown code blocks or extra text.
fn extract_json(response: &str) -> &str {
    // Try to find JSON in markdown code block
    if let Some(start) = response.find("```json") {
        let body = &response[start + 7..];
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }

    // Try to find JSON in plain code block
    if let Some(start) = response.find("```") {
        let body = &response[start + 3..];
        if let Some(end) = body.find("```") {
            let content = body[..end].trim();
            // Skip language identifier if present
            if let Some(newline_pos) = content.find('\n') {
                if !content[..newline_pos].trim_start().starts_with('{') {
                    return content[newline_pos + 1..].trim();
                }
            }
            return content;
        }
    }

    // Try to find raw JSON object
    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if start < end {
            return &response[start..=end];
        }
    }

    response.trim()
}

/// Repair a raw direction against the scene policies. Total: never fails.
pub fn resolve_directive(raw: RawDirection, context: &DirectionContext) -> Directive {
    let forced = context.forced_speaker();
    let other = context.responding_to();

    if let Some(proposed) = raw.next_character.as_deref() {
        if proposed != forced.as_str() {
            tracing::debug!(
                proposed = %proposed,
                forced = %forced,
                "Director proposed a different speaker; keeping forced turn order"
            );
        }
    }

    let narration = if needs_narration(context.exchange_count) {
        raw.narration.unwrap_or_default()
    } else {
        String::new()
    };

    let completion_allowed = may_complete(
        context.exchange_count,
        context.first_spoke,
        context.second_spoke,
    );

    Directive {
        narration,
        next_speaker: forced.clone(),
        cue_for_speaker: raw
            .prompt_for_character
            .unwrap_or_else(|| default_cue(other)),
        scene_complete: completion_allowed && raw.scene_complete.unwrap_or(false),
    }
}

/// Cue used when the director gives none.
pub fn default_cue(other: &CharacterName) -> String {
    format!("Respond to {} with emotion.", other)
}

/// Directs two-character scenes using the LLM.
pub struct SceneDirector {
    llm: Arc<dyn LlmPort>,
    creativity: Creativity,
}

impl SceneDirector {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self {
            llm,
            creativity: Creativity::default(),
        }
    }

    pub fn with_creativity(mut self, creativity: Creativity) -> Self {
        self.creativity = creativity;
        self
    }

    /// Decide the next turn of a scene.
    ///
    /// Makes exactly one LLM call. Never fails: generator errors and malformed
    /// replies fall back to an empty narration, a generic cue and no completion.
    pub async fn direct(&self, context: &DirectionContext) -> Directive {
        let forced = context.forced_speaker();
        let render_narration = needs_narration(context.exchange_count);

        let request = LlmRequest::new(vec![ChatMessage::user(format!(
            "Continue the story - what happens as {} responds?",
            forced
        ))])
        .with_system_prompt(self.build_system_prompt(context, render_narration))
        .with_temperature(self.creativity.value());

        tracing::debug!(
            forced = %forced,
            exchange_count = context.exchange_count,
            render_narration,
            "Requesting scene direction"
        );

        let decoded = match self.llm.generate(request).await {
            Ok(response) => decode_direction(&response.content),
            Err(e) => DirectionDecode::Unavailable(e),
        };

        match &decoded {
            DirectionDecode::Parsed(_) => {}
            DirectionDecode::Unparseable { reason } => {
                tracing::warn!(reason = %reason, "Director reply was not valid JSON; using defaults");
            }
            DirectionDecode::Unavailable(e) => {
                tracing::warn!(error = %e, "Director LLM call failed; using defaults");
            }
        }

        let directive = resolve_directive(decoded.into_raw(), context);

        tracing::info!(
            speaker = %directive.next_speaker,
            narrated = directive.has_narration(),
            scene_complete = directive.scene_complete,
            "Scene directed"
        );

        directive
    }

    /// Ask the LLM for a short scene premise for two characters.
    pub async fn suggest_scene(&self, cast: &SceneCast) -> Result<String, LlmError> {
        let (a, b) = (cast.first(), cast.second());
        let system_prompt = format!(
            r#"You are a creative director for character interactions.
Suggest an interesting, engaging scene for these two characters to act out together.
Keep the suggestion brief (2-3 sentences) and focus on the setup and situation.

Character 1: {}
{}

Character 2: {}
{}"#,
            a.name, a.description, b.name, b.description
        );

        let request = LlmRequest::new(vec![ChatMessage::user(
            "Suggest an interesting scene for these characters.",
        )])
        .with_system_prompt(system_prompt)
        .with_temperature(self.creativity.value());

        let response = self.llm.generate(request).await?;
        let suggestion = response.content.trim().to_string();
        if suggestion.is_empty() {
            return Err(LlmError::InvalidResponse(
                "Empty scene suggestion".to_string(),
            ));
        }
        Ok(suggestion)
    }

    fn build_system_prompt(&self, context: &DirectionContext, render_narration: bool) -> String {
        let forced = context.forced_speaker();
        let other = context.responding_to();

        let previous = if context.previous_narrations.is_empty() {
            String::new()
        } else {
            format!(
                "PREVIOUS NARRATIONS (DO NOT REPEAT THESE):\n- {}\n\n",
                context.previous_narrations.join("\n- ")
            )
        };

        let dialogue = if context.dialogue.trim().is_empty() {
            "The scene begins..."
        } else {
            context.dialogue.trim_end()
        };

        let narration_instruction = if render_narration {
            "Write a storyteller-style narration that advances the emotional beat of the scene. \
             Focus on something NEW - a gesture, a feeling, a shift in energy."
        } else {
            "No narration this turn - let the dialogue breathe. Set narration to an empty string."
        };

        format!(
            r#"You are a STORYTELLER narrating an unfolding tale between two characters.

Narration style:
- Tell it to an audience: "And so...", "In that moment...", "The tension between them..."
- Focus on emotion, tension and the relationship between the characters
- Describe what passes BETWEEN them: glances, unspoken feelings, the air in the room
- Vary the focus from beat to beat; keep it to 1-2 sentences
- Never reuse imagery or phrases from earlier narration

{previous}Scene premise: {instruction}

Dialogue so far:
{dialogue}

{narration_instruction}

Now cue {forced} to respond to {other}.

Return ONLY valid JSON:
{{"narration": "storyteller narration", "next_character": "{forced}", "prompt_for_character": "emotional cue for {forced}", "scene_complete": false}}
Set "scene_complete" to true only when the scene has reached a natural conclusion."#,
            previous = previous,
            instruction = context.instruction,
            dialogue = dialogue,
            narration_instruction = narration_instruction,
            forced = forced,
            other = other,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolecast_domain::{Participant, TranscriptEntry};

    use crate::infrastructure::ports::ScriptedLlm;

    fn name(s: &str) -> CharacterName {
        CharacterName::new(s).unwrap()
    }

    fn cast() -> SceneCast {
        SceneCast::new(
            Participant::new(name("Aria"), "A wandering cartographer."),
            Participant::new(name("Bram"), "A retired stationmaster."),
        )
        .unwrap()
    }

    fn running_state() -> SceneState {
        let mut state = SceneState::new();
        state.start("They meet at a train station.");
        state
    }

    /// State with `count` alternating utterances, Aria first.
    fn state_with_exchanges(count: usize) -> SceneState {
        let mut state = running_state();
        for i in 0..count {
            let speaker = if i % 2 == 0 { "Aria" } else { "Bram" };
            state.record(TranscriptEntry::utterance(name(speaker), format!("line {i}")));
        }
        state
    }

    fn context(state: &SceneState) -> DirectionContext {
        DirectionContext::from_state(&cast(), state)
    }

    const FULL_REPLY: &str = r#"{"narration": "The whistle screams.", "next_character": "Aria", "prompt_for_character": "Be wary", "scene_complete": true}"#;

    #[tokio::test]
    async fn forced_speaker_overrides_generator() {
        // Aria spoke last, generator insists on Aria again
        let director = SceneDirector::new(Arc::new(ScriptedLlm::always(FULL_REPLY)));
        let directive = director.direct(&context(&state_with_exchanges(1))).await;
        assert_eq!(directive.next_speaker, name("Bram"));
        assert_eq!(directive.cue_for_speaker, "Be wary");
    }

    #[tokio::test]
    async fn narration_suppressed_off_beat() {
        let director = SceneDirector::new(Arc::new(ScriptedLlm::always(FULL_REPLY)));
        for count in [1, 2, 4, 5] {
            let directive = director.direct(&context(&state_with_exchanges(count))).await;
            assert!(directive.narration.is_empty(), "count {count} narrated");
        }
    }

    #[tokio::test]
    async fn narration_kept_on_beat() {
        let director = SceneDirector::new(Arc::new(ScriptedLlm::always(FULL_REPLY)));
        for count in [0, 3, 6] {
            let directive = director.direct(&context(&state_with_exchanges(count))).await;
            assert_eq!(directive.narration, "The whistle screams.");
        }
    }

    #[tokio::test]
    async fn completion_denied_before_minimum() {
        let director = SceneDirector::new(Arc::new(ScriptedLlm::always(FULL_REPLY)));
        for count in 0..6 {
            let directive = director.direct(&context(&state_with_exchanges(count))).await;
            assert!(!directive.scene_complete, "completed at {count}");
        }
        let directive = director.direct(&context(&state_with_exchanges(6))).await;
        assert!(directive.scene_complete);
    }

    #[tokio::test]
    async fn completion_denied_when_one_participant_silent() {
        let mut state = running_state();
        for i in 0..8 {
            state.record(TranscriptEntry::utterance(name("Aria"), format!("monologue {i}")));
        }
        let director = SceneDirector::new(Arc::new(ScriptedLlm::always(FULL_REPLY)));
        let directive = director.direct(&context(&state)).await;
        assert!(!directive.scene_complete);
        assert_eq!(directive.next_speaker, name("Bram"));
    }

    #[tokio::test]
    async fn code_fenced_reply_is_parsed() {
        let reply = "Here you go:\n```json\n{\"narration\": \"Rain on glass.\", \"next_character\": \"Aria\", \"prompt_for_character\": \"Hesitate\"}\n```";
        let director = SceneDirector::new(Arc::new(ScriptedLlm::always(reply)));
        let directive = director.direct(&context(&running_state())).await;
        assert_eq!(directive.narration, "Rain on glass.");
        assert_eq!(directive.cue_for_speaker, "Hesitate");
        assert!(!directive.scene_complete);
    }

    #[tokio::test]
    async fn unparseable_reply_degrades_to_defaults() {
        let director = SceneDirector::new(Arc::new(ScriptedLlm::always("I refuse to answer in JSON.")));
        let directive = director.direct(&context(&running_state())).await;
        assert_eq!(directive.narration, "");
        assert_eq!(directive.next_speaker, name("Aria"));
        assert_eq!(directive.cue_for_speaker, "Respond to Bram with emotion.");
        assert!(!directive.scene_complete);
    }

    #[tokio::test]
    async fn generator_failure_degrades_to_defaults() {
        let director = SceneDirector::new(Arc::new(ScriptedLlm::failing(
            LlmError::RequestFailed("connection refused".to_string()),
        )));
        let directive = director.direct(&context(&state_with_exchanges(6))).await;
        assert_eq!(directive.narration, "");
        assert_eq!(directive.next_speaker, name("Aria"));
        assert_eq!(directive.cue_for_speaker, "Respond to Bram with emotion.");
        assert!(!directive.scene_complete);
    }

    #[tokio::test]
    async fn prompt_carries_scene_context() {
        let llm = Arc::new(ScriptedLlm::always(FULL_REPLY));
        let director = SceneDirector::new(llm.clone()).with_creativity(Creativity::new(0.8));

        let mut state = running_state();
        for i in 1..=4 {
            state.record(TranscriptEntry::narration(format!("narration {i}")));
        }
        state.record(TranscriptEntry::utterance(name("Aria"), "Is this seat taken?"));
        state.record(TranscriptEntry::interjection("Bram is hiding something"));

        director.direct(&context(&state)).await;

        let request = &llm.requests()[0];
        let system = request.system_prompt.as_deref().unwrap();
        assert!(system.contains("Scene premise: They meet at a train station."));
        assert!(system.contains("Aria: \"Is this seat taken?\""));
        assert!(system.contains("[Direction: Bram is hiding something]"));
        assert!(system.contains("- narration 2\n- narration 3\n- narration 4"));
        assert!(!system.contains("narration 1"));
        assert!(system.contains("Now cue Bram to respond to Aria."));
        assert!(system.contains("No narration this turn"));
        assert_eq!(
            request.messages[0].content,
            "Continue the story - what happens as Bram responds?"
        );
        assert_eq!(request.temperature, Some(0.8));
    }

    #[tokio::test]
    async fn opening_prompt_asks_for_narration() {
        let llm = Arc::new(ScriptedLlm::always(FULL_REPLY));
        let director = SceneDirector::new(llm.clone());
        director.direct(&context(&running_state())).await;

        let system = llm.requests()[0].system_prompt.clone().unwrap();
        assert!(system.contains("The scene begins..."));
        assert!(system.contains("Write a storyteller-style narration"));
        assert!(!system.contains("PREVIOUS NARRATIONS"));
    }

    #[tokio::test]
    async fn suggest_scene_returns_trimmed_premise() {
        let llm = Arc::new(ScriptedLlm::always("  A storm strands them overnight.  \n"));
        let director = SceneDirector::new(llm.clone());
        let premise = director.suggest_scene(&cast()).await.unwrap();
        assert_eq!(premise, "A storm strands them overnight.");

        let system = llm.requests()[0].system_prompt.clone().unwrap();
        assert!(system.contains("Character 1: Aria"));
        assert!(system.contains("A retired stationmaster."));
    }

    #[tokio::test]
    async fn suggest_scene_propagates_failure() {
        let director = SceneDirector::new(Arc::new(ScriptedLlm::failing(
            LlmError::RequestFailed("503".to_string()),
        )));
        assert!(director.suggest_scene(&cast()).await.is_err());
    }

    #[test]
    fn decode_missing_fields_is_parsed_not_failed() {
        let decoded = decode_direction(r#"{"narration": "Only this."}"#);
        assert_eq!(
            decoded,
            DirectionDecode::Parsed(RawDirection {
                narration: Some("Only this.".to_string()),
                ..RawDirection::default()
            })
        );
    }

    #[test]
    fn decode_rejects_non_objects() {
        assert!(matches!(
            decode_direction("[1, 2, 3]"),
            DirectionDecode::Unparseable { .. }
        ));
        assert!(matches!(
            decode_direction(""),
            DirectionDecode::Unparseable { .. }
        ));
    }

    #[test]
    fn decode_accepts_stringly_completion_flag() {
        let DirectionDecode::Parsed(raw) = decode_direction(r#"{"scene_complete": "true"}"#) else {
            panic!("expected parsed");
        };
        assert_eq!(raw.scene_complete, Some(true));
    }

    #[test]
    fn extract_json_from_plain_fence_with_language() {
        let reply = "```\njson\n{\"narration\": \"x\"}\n```";
        assert_eq!(extract_json(reply), "{\"narration\": \"x\"}");
    }

    #[test]
    fn missing_cue_falls_back_to_default() {
        let raw = RawDirection {
            prompt_for_character: None,
            ..RawDirection::default()
        };
        let directive = resolve_directive(raw, &context(&state_with_exchanges(1)));
        assert_eq!(directive.cue_for_speaker, "Respond to Aria with emotion.");
        assert_eq!(directive.next_speaker, name("Bram"));
    }

    #[test]
    fn blank_cue_falls_back_to_default() {
        let DirectionDecode::Parsed(raw) =
            decode_direction(r#"{"next_character": "Bram", "prompt_for_character": "   "}"#)
        else {
            panic!("expected a parsed direction");
        };
        assert_eq!(raw.prompt_for_character, None);

        let directive = resolve_directive(raw, &context(&state_with_exchanges(1)));
        assert_eq!(directive.cue_for_speaker, "Respond to Aria with emotion.");
        assert_eq!(directive.next_speaker, name("Bram"));
    }
}
