//! Application state and composition.

use std::sync::Arc;

use rolecast_domain::{CharacterProfile, Creativity, DomainError, SceneCast, SceneId};

use crate::infrastructure::{
    config::EngineConfig,
    holara::HolaraClient,
    openai::OpenAiClient,
    ports::{ImageGenPort, LlmPort},
};
use crate::use_cases::{
    character::{CastPerformer, CharacterAgent, DraftCharacter, RenderPortrait, WriteBackstory},
    scene::{AutoPlayConfig, SceneDirector, SceneSessions},
    CharacterUseCases, SceneUseCases,
};

/// Main application state.
///
/// Holds the generator ports and all use cases.
pub struct App {
    pub use_cases: UseCases,
    pub llm: Arc<dyn LlmPort>,
    pub image_gen: Arc<dyn ImageGenPort>,
    creativity: Creativity,
}

/// Container for all use cases.
pub struct UseCases {
    pub character: CharacterUseCases,
    pub scene: SceneUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        llm: Arc<dyn LlmPort>,
        image_gen: Arc<dyn ImageGenPort>,
        creativity: Creativity,
        max_tokens: u32,
        auto_play: AutoPlayConfig,
    ) -> Self {
        let director = Arc::new(SceneDirector::new(llm.clone()).with_creativity(creativity));
        let sessions = Arc::new(SceneSessions::new(director.clone(), auto_play));

        let character = CharacterUseCases::new(
            Arc::new(DraftCharacter::new(llm.clone()).with_max_tokens(max_tokens)),
            Arc::new(WriteBackstory::new(llm.clone()).with_max_tokens(max_tokens)),
            Arc::new(RenderPortrait::new(image_gen.clone())),
        );

        Self {
            use_cases: UseCases {
                character,
                scene: SceneUseCases::new(director, sessions),
            },
            llm,
            image_gen,
            creativity,
        }
    }

    /// Wire the OpenAI and Holara adapters from configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        let llm: Arc<dyn LlmPort> = Arc::new(
            OpenAiClient::new(
                &config.openai_base_url,
                &config.openai_api_key,
                &config.openai_model,
            )
            .with_default_max_tokens(config.max_completion_tokens),
        );
        let image_gen: Arc<dyn ImageGenPort> = Arc::new(HolaraClient::new(
            &config.holara_api_url,
            &config.holara_api_key,
            config.holara.clone(),
        ));

        tracing::info!(
            model = %config.openai_model,
            image_model = %config.holara.model,
            "Engine wired"
        );

        Self::new(
            llm,
            image_gen,
            config.default_creativity,
            config.max_completion_tokens,
            AutoPlayConfig {
                turn_delay: config.scene_turn_delay,
                max_turns: None,
            },
        )
    }

    /// A roleplay agent for a character, using the default creativity.
    pub fn character_agent(&self, profile: &CharacterProfile) -> Arc<CharacterAgent> {
        Arc::new(
            CharacterAgent::from_profile(profile, self.llm.clone())
                .with_creativity(self.creativity),
        )
    }

    /// Open a scene session for two characters, each played by a fresh agent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Constraint` if both profiles share a name.
    pub fn open_scene(
        &self,
        first: &CharacterProfile,
        second: &CharacterProfile,
    ) -> Result<SceneId, DomainError> {
        let cast = SceneCast::new(first.to_participant(), second.to_participant())?;
        let performer = CastPerformer::new(self.character_agent(first), self.character_agent(second))?;
        Ok(self
            .use_cases
            .scene
            .sessions
            .open(cast, Arc::new(performer)))
    }
}
