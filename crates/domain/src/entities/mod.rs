//! Domain entities.

mod character;
mod participant;

pub use character::CharacterProfile;
pub use participant::{Participant, SceneCast};
