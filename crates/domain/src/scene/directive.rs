use serde::{Deserialize, Serialize};

use crate::value_objects::CharacterName;

/// The director's decision for one advance of a scene.
///
/// Produced once per turn and consumed immediately by the control loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Storyteller exposition for this turn; empty when pacing skips it.
    pub narration: String,
    /// The participant who speaks this turn.
    pub next_speaker: CharacterName,
    /// Emotional cue handed to the speaker.
    pub cue_for_speaker: String,
    /// Whether the scene has reached its natural conclusion.
    pub scene_complete: bool,
}

impl Directive {
    pub fn has_narration(&self) -> bool {
        !self.narration.trim().is_empty()
    }
}
