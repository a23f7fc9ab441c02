//! Scene direction domain.
//!
//! The pure policies that keep a two-character scene well formed (turn order,
//! narration pacing, completion gating) together with the transcript and the
//! scene state aggregate they operate on. Nothing here talks to a generator.

pub mod completion;
pub mod directive;
pub mod pacing;
pub mod state;
pub mod transcript;
pub mod turn;

pub use completion::{may_complete, MIN_EXCHANGES_FOR_COMPLETION};
pub use directive::Directive;
pub use pacing::{needs_narration, NARRATION_INTERVAL};
pub use state::{ScenePhase, SceneState};
pub use transcript::{SceneTranscript, TranscriptEntry};
pub use turn::{counterpart, select_next};
