//! Scene control loop.
//!
//! Owns one scene's state and drives it turn by turn. All user operations are
//! total: calls that do not apply in the current phase change nothing and say
//! so through their return value.
//!
//! An advance is split into three steps so auto-play can generate without
//! holding the scene:
//!
//! 1. `prepare_turn` snapshots the scene and its epoch
//! 2. `TurnTicket::resolve` runs the director and performer against the snapshot
//! 3. `commit_turn` records the result, unless the scene changed meanwhile

use std::sync::Arc;

use rolecast_domain::{
    CharacterName, Directive, SceneCast, ScenePhase, SceneState, SceneTranscript, TranscriptEntry,
};

use super::director::{DirectionContext, SceneDirector};
use super::performer::{fallback_line, PerformerCue, ScenePerformer};

/// Narration recorded when a scene reaches its conclusion.
pub const CLOSING_NARRATION: &str = "The scene reaches its natural conclusion.";

/// What an advance did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A turn was recorded.
    Advanced {
        speaker: CharacterName,
        narrated: bool,
        scene_complete: bool,
    },
    /// The scene was not running; nothing happened.
    Skipped,
    /// The scene changed while the turn was generated; the result was dropped.
    Discarded,
}

impl AdvanceOutcome {
    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

/// A scene snapshot from which one turn can be generated.
pub struct TurnTicket {
    epoch: u64,
    context: DirectionContext,
    director: Arc<SceneDirector>,
    performer: Arc<dyn ScenePerformer>,
}

impl TurnTicket {
    pub fn context(&self) -> &DirectionContext {
        &self.context
    }

    /// Generate the turn. Touches no scene state and never fails.
    pub async fn resolve(self) -> ResolvedTurn {
        let directive = self.director.direct(&self.context).await;

        let cue = PerformerCue {
            speaker: directive.next_speaker.clone(),
            counterpart: self.context.responding_to().clone(),
            cue: directive.cue_for_speaker.clone(),
            scene_context: self.context.dialogue.clone(),
        };

        let line = match self.performer.perform(&cue).await {
            Ok(line) if !line.trim().is_empty() => line.trim().to_string(),
            Ok(_) => {
                tracing::warn!(speaker = %cue.speaker, "Performer returned an empty line");
                fallback_line(&cue.speaker)
            }
            Err(e) => {
                tracing::warn!(speaker = %cue.speaker, error = %e, "Performer failed");
                fallback_line(&cue.speaker)
            }
        };

        ResolvedTurn {
            epoch: self.epoch,
            directive,
            line,
        }
    }
}

/// A generated turn waiting to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTurn {
    epoch: u64,
    pub directive: Directive,
    pub line: String,
}

/// Drives one two-character scene.
pub struct SceneControl {
    cast: SceneCast,
    state: SceneState,
    director: Arc<SceneDirector>,
    performer: Arc<dyn ScenePerformer>,
    auto_run: bool,
}

impl SceneControl {
    pub fn new(
        cast: SceneCast,
        director: Arc<SceneDirector>,
        performer: Arc<dyn ScenePerformer>,
    ) -> Self {
        Self {
            cast,
            state: SceneState::new(),
            director,
            performer,
            auto_run: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn cast(&self) -> &SceneCast {
        &self.cast
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn phase(&self) -> ScenePhase {
        self.state.phase()
    }

    pub fn transcript(&self) -> &SceneTranscript {
        self.state.transcript()
    }

    pub fn instruction(&self) -> &str {
        self.state.instruction()
    }

    /// Whether auto-play should keep advancing this scene.
    pub fn is_auto_running(&self) -> bool {
        self.auto_run && self.state.is_running()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Begin a scene from a premise. Auto-run is switched on.
    pub fn start(&mut self, instruction: &str) -> bool {
        if !self.state.start(instruction) {
            tracing::debug!(phase = %self.state.phase(), "Start ignored");
            return false;
        }
        self.auto_run = true;
        tracing::info!(
            first = %self.cast.first().name,
            second = %self.cast.second().name,
            "Scene started"
        );
        true
    }

    pub fn pause(&mut self) -> bool {
        self.auto_run = false;
        self.state.pause()
    }

    /// Resume a paused scene, optionally folding an adjustment into the premise.
    pub fn resume(&mut self, adjustment: Option<&str>) -> bool {
        if self.state.phase() != ScenePhase::Paused {
            return false;
        }
        if let Some(text) = adjustment.map(str::trim).filter(|t| !t.is_empty()) {
            self.state.extend_instruction("Adjustment", text);
            self.state
                .record(TranscriptEntry::interjection(format!("[Adjustment] {}", text)));
        }
        self.state.resume();
        self.auto_run = true;
        true
    }

    /// Inject a new direction into a running scene and play one turn with it.
    pub async fn interject(&mut self, text: &str) -> AdvanceOutcome {
        let text = text.trim();
        if !self.state.is_running() || text.is_empty() {
            return AdvanceOutcome::Skipped;
        }

        // Pausing invalidates any turn generated against the old premise
        self.state.pause();
        self.state.extend_instruction("New direction", text);
        self.state.record(TranscriptEntry::interjection(text));
        self.state.resume();

        tracing::info!(direction = %text, "Scene interjection");

        let outcome = self.advance().await;
        if self.state.is_running() {
            self.auto_run = true;
        }
        outcome
    }

    /// Remove the most recent turn. Only while paused.
    pub fn redo_last(&mut self) -> usize {
        let removed = self.state.redo_last();
        if removed > 0 {
            tracing::info!(removed, "Last turn removed");
        }
        removed
    }

    pub fn end(&mut self) -> bool {
        self.auto_run = false;
        let ended = self.state.end();
        if ended {
            tracing::info!(
                exchanges = self.state.exchange_count(),
                "Scene ended"
            );
        }
        ended
    }

    /// Forget the current scene entirely and return to setup.
    pub fn new_scene(&mut self) {
        self.auto_run = false;
        self.state.reset();
    }

    // =========================================================================
    // Turns
    // =========================================================================

    /// Advance exactly one turn, switching auto-run off.
    pub async fn step(&mut self) -> AdvanceOutcome {
        self.auto_run = false;
        self.advance().await
    }

    /// Play one turn. Only while running.
    pub async fn advance(&mut self) -> AdvanceOutcome {
        let Some(ticket) = self.prepare_turn() else {
            return AdvanceOutcome::Skipped;
        };
        let turn = ticket.resolve().await;
        self.commit_turn(turn)
    }

    /// Snapshot the scene for generation. `None` unless running.
    pub fn prepare_turn(&self) -> Option<TurnTicket> {
        if !self.state.is_running() {
            return None;
        }
        Some(TurnTicket {
            epoch: self.state.epoch(),
            context: DirectionContext::from_state(&self.cast, &self.state),
            director: Arc::clone(&self.director),
            performer: Arc::clone(&self.performer),
        })
    }

    /// Record a generated turn if the scene is still where it was when the
    /// turn was prepared.
    pub fn commit_turn(&mut self, turn: ResolvedTurn) -> AdvanceOutcome {
        if !self.state.is_running() || turn.epoch != self.state.epoch() {
            tracing::debug!(
                ticket_epoch = turn.epoch,
                scene_epoch = self.state.epoch(),
                phase = %self.state.phase(),
                "Discarding stale turn"
            );
            return AdvanceOutcome::Discarded;
        }

        let ResolvedTurn {
            directive, line, ..
        } = turn;

        let narrated = directive.has_narration();
        if narrated {
            self.state
                .record(TranscriptEntry::narration(directive.narration.trim()));
        }
        self.state
            .record(TranscriptEntry::utterance(directive.next_speaker.clone(), line));

        if directive.scene_complete {
            self.state.record(TranscriptEntry::narration(CLOSING_NARRATION));
            self.state.pause();
            self.auto_run = false;
            tracing::info!(
                exchanges = self.state.exchange_count(),
                "Scene reached its conclusion"
            );
        }

        AdvanceOutcome::Advanced {
            speaker: directive.next_speaker,
            narrated,
            scene_complete: directive.scene_complete,
        }
    }
}
