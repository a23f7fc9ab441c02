//! Engine configuration loaded from the environment.
//!
//! `.env` is loaded first (if present), then variables are read with defaults.
//! Only malformed numbers are errors; missing keys fall back to defaults so a
//! local setup without credentials still starts (generation calls will fail and
//! degrade instead).

use std::time::Duration;

use rolecast_domain::Creativity;

use super::holara::{HolaraSettings, DEFAULT_HOLARA_API_URL};
use super::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub max_completion_tokens: u32,
    pub holara_api_key: String,
    pub holara_api_url: String,
    pub holara: HolaraSettings,
    pub default_creativity: Creativity,
    /// Pause between auto-played scene turns.
    pub scene_turn_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            max_completion_tokens: 1000,
            holara_api_key: String::new(),
            holara_api_url: DEFAULT_HOLARA_API_URL.to_string(),
            holara: HolaraSettings::default(),
            default_creativity: Creativity::default(),
            scene_turn_delay: Duration::from_millis(500),
        }
    }
}

impl EngineConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Failed to load .env"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        let holara = HolaraSettings {
            model: string("HOLARA_MODEL", defaults.holara.model.clone()),
            steps: parse(&lookup, "HOLARA_STEPS", defaults.holara.steps)?,
            cfg_scale: parse(&lookup, "HOLARA_CFG_SCALE", defaults.holara.cfg_scale)?,
            ..defaults.holara.clone()
        };

        let default_creativity = match lookup("DEFAULT_CREATIVITY") {
            Some(raw) => raw
                .parse::<Creativity>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "DEFAULT_CREATIVITY",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => defaults.default_creativity,
        };

        let delay_ms = parse(
            &lookup,
            "SCENE_TURN_DELAY_MS",
            defaults.scene_turn_delay.as_millis() as u64,
        )?;

        Ok(Self {
            openai_api_key: string("OPENAI_API_KEY", defaults.openai_api_key),
            openai_base_url: string("OPENAI_BASE_URL", defaults.openai_base_url),
            openai_model: string("OPENAI_MODEL", defaults.openai_model),
            max_completion_tokens: parse(
                &lookup,
                "MAX_COMPLETION_TOKENS",
                defaults.max_completion_tokens,
            )?,
            holara_api_key: string("HOLARA_API_KEY", defaults.holara_api_key),
            holara_api_url: string("HOLARA_API_URL", defaults.holara_api_url),
            holara,
            default_creativity,
            scene_turn_delay: Duration::from_millis(delay_ms),
        })
    }
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
