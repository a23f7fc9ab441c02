//! Scene state aggregate - premise, transcript and lifecycle of one scene.
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: the transcript and phase only change through methods
//! - **Derived counters**: exchange count, last speaker and who has spoken are
//!   computed from the transcript, never stored next to it
//! - **Safe transitions**: every transition is callable in any phase; calls
//!   that do not apply leave the state untouched and report `false`

use serde::{Deserialize, Serialize};
use std::fmt;

use super::transcript::{SceneTranscript, TranscriptEntry};
use crate::value_objects::CharacterName;

/// Lifecycle phase of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenePhase {
    /// No premise yet.
    #[default]
    Setup,
    /// Turns may be advanced.
    Running,
    /// Held for review or adjustment.
    Paused,
    /// Ended; the transcript stays readable until the next start.
    Stopped,
}

impl fmt::Display for ScenePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenePhase::Setup => write!(f, "setup"),
            ScenePhase::Running => write!(f, "running"),
            ScenePhase::Paused => write!(f, "paused"),
            ScenePhase::Stopped => write!(f, "stopped"),
        }
    }
}

/// The state of one scene.
///
/// # Invariants
///
/// - `instruction` only grows while a scene lives; it is replaced on `start`
///   and cleared on `reset`
/// - `epoch` increases on every change to the scene, so a turn prepared
///   against an older epoch is stale
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneState {
    instruction: String,
    transcript: SceneTranscript,
    phase: ScenePhase,
    epoch: u64,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    #[inline]
    pub fn transcript(&self) -> &SceneTranscript {
        &self.transcript
    }

    #[inline]
    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    /// Change counter used to recognise stale turn results.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_running(&self) -> bool {
        self.phase == ScenePhase::Running
    }

    pub fn exchange_count(&self) -> usize {
        self.transcript.exchange_count()
    }

    pub fn last_speaker(&self) -> Option<&CharacterName> {
        self.transcript.last_speaker()
    }

    pub fn has_spoken(&self, name: &CharacterName) -> bool {
        self.transcript.has_spoken(name)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Setup/Stopped -> Running with a fresh transcript.
    ///
    /// Ignored while a scene is live or when the premise is blank.
    pub fn start(&mut self, instruction: &str) -> bool {
        let instruction = instruction.trim();
        if instruction.is_empty()
            || matches!(self.phase, ScenePhase::Running | ScenePhase::Paused)
        {
            return false;
        }
        self.transcript.clear();
        self.instruction = instruction.to_string();
        self.enter(ScenePhase::Running);
        true
    }

    /// Running -> Paused. Already paused is a no-op.
    pub fn pause(&mut self) -> bool {
        if self.phase != ScenePhase::Running {
            return false;
        }
        self.enter(ScenePhase::Paused);
        true
    }

    /// Paused -> Running.
    pub fn resume(&mut self) -> bool {
        if self.phase != ScenePhase::Paused {
            return false;
        }
        self.enter(ScenePhase::Running);
        true
    }

    /// Any phase -> Stopped. The transcript is kept.
    pub fn end(&mut self) -> bool {
        if self.phase == ScenePhase::Stopped {
            return false;
        }
        self.enter(ScenePhase::Stopped);
        true
    }

    /// Any phase -> Setup with nothing left of the previous scene.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.instruction.clear();
        self.enter(ScenePhase::Setup);
    }

    /// Remove the most recent turn. Only while paused.
    ///
    /// Returns the number of transcript entries removed.
    pub fn redo_last(&mut self) -> usize {
        if self.phase != ScenePhase::Paused {
            return 0;
        }
        let removed = self.transcript.truncate_last_pair();
        if removed > 0 {
            self.epoch += 1;
        }
        removed
    }

    // =========================================================================
    // Transcript mutation
    // =========================================================================

    /// Append labelled text onto the premise, e.g. `"Adjustment"` or `"New direction"`.
    pub fn extend_instruction(&mut self, label: &str, text: &str) {
        self.instruction
            .push_str(&format!("\n\n{}: {}", label, text.trim()));
        self.epoch += 1;
    }

    pub fn record(&mut self, entry: TranscriptEntry) {
        self.transcript.append(entry);
        self.epoch += 1;
    }

    fn enter(&mut self, phase: ScenePhase) {
        self.phase = phase;
        self.epoch += 1;
    }
}
