//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific area. Use cases talk to the
//! outside world only through the ports in `infrastructure::ports`.

pub mod character;
pub mod scene;

pub use character::CharacterUseCases;
pub use scene::SceneUseCases;
