//! Rolecast domain.
//!
//! Characters, scene participants, the scene transcript, and the policies
//! that direct a two-character scene. Pure data and functions only; the
//! engine crate supplies generators and orchestration.

pub mod entities;
pub mod error;
pub mod ids;
pub mod scene;
pub mod value_objects;

pub use entities::{CharacterProfile, Participant, SceneCast};
pub use error::DomainError;
pub use ids::SceneId;
pub use scene::{
    Directive, ScenePhase, SceneState, SceneTranscript, TranscriptEntry,
};
pub use value_objects::{CharacterName, Creativity};
