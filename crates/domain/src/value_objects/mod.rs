//! Value objects - validated, immutable domain values.

mod creativity;
mod names;

pub use creativity::{Creativity, DEFAULT_CREATIVITY, MAX_CREATIVITY, MIN_CREATIVITY};
pub use names::CharacterName;
