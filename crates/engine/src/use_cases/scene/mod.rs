//! Scene use cases: direction, the control loop, auto-play and sessions.

use std::sync::Arc;

pub mod autoplay;
pub mod control;
pub mod director;
pub mod performer;
pub mod sessions;

pub use autoplay::{
    AutoPlay, AutoPlayConfig, AutoPlayHandle, AutoPlayReport, AutoPlayStop, SharedScene,
};
pub use control::{AdvanceOutcome, ResolvedTurn, SceneControl, TurnTicket, CLOSING_NARRATION};
pub use director::{
    decode_direction, resolve_directive, DirectionContext, DirectionDecode, RawDirection,
    SceneDirector,
};
pub use performer::{fallback_line, PerformerCue, ScenePerformer};
pub use sessions::SceneSessions;

/// Container for scene use cases.
pub struct SceneUseCases {
    pub director: Arc<SceneDirector>,
    pub sessions: Arc<SceneSessions>,
}

impl SceneUseCases {
    pub fn new(director: Arc<SceneDirector>, sessions: Arc<SceneSessions>) -> Self {
        Self { director, sessions }
    }
}
