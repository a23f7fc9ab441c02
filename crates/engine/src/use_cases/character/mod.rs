//! Character use cases: drafting, backstory, portraits and roleplay agents.

use std::sync::Arc;

mod agent;
mod backstory;
mod draft;
mod portrait;

pub use agent::{CastPerformer, CharacterAgent};
pub use backstory::WriteBackstory;
pub use draft::{CharacterDraft, DraftCharacter, UNNAMED_CHARACTER};
pub use portrait::RenderPortrait;

/// Container for character use cases.
pub struct CharacterUseCases {
    pub draft: Arc<DraftCharacter>,
    pub backstory: Arc<WriteBackstory>,
    pub portrait: Arc<RenderPortrait>,
}

impl CharacterUseCases {
    pub fn new(
        draft: Arc<DraftCharacter>,
        backstory: Arc<WriteBackstory>,
        portrait: Arc<RenderPortrait>,
    ) -> Self {
        Self {
            draft,
            backstory,
            portrait,
        }
    }
}
