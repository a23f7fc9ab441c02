//! The seam through which a scene obtains a participant's spoken line.

use async_trait::async_trait;

use rolecast_domain::CharacterName;

use crate::infrastructure::ports::LlmError;

/// What a participant is asked to perform this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformerCue {
    pub speaker: CharacterName,
    /// The participant being responded to
    pub counterpart: CharacterName,
    /// The director's emotional cue
    pub cue: String,
    /// Rendered dialogue so far
    pub scene_context: String,
}

/// Produces spoken lines for scene participants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScenePerformer: Send + Sync {
    async fn perform(&self, cue: &PerformerCue) -> Result<String, LlmError>;
}

/// Line recorded when a participant produces nothing usable.
pub fn fallback_line(speaker: &CharacterName) -> String {
    format!("*{} seems distracted and didn't respond*", speaker)
}
