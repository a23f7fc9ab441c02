//! Auto-play worker for a scene.
//!
//! Repeatedly advances a shared scene while auto-run is on, pausing between
//! turns. The scene lock is held only to prepare and to commit a turn, never
//! while generating, so user operations stay responsive. Anything the user
//! does in the meantime (pause, end, redo, interject) makes the in-flight turn
//! stale and it is dropped at commit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::control::{AdvanceOutcome, SceneControl};

pub type SharedScene = Arc<Mutex<SceneControl>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPlayConfig {
    /// Pause between turns.
    pub turn_delay: Duration,
    /// Stop after this many recorded turns.
    pub max_turns: Option<usize>,
}

impl Default for AutoPlayConfig {
    fn default() -> Self {
        Self {
            turn_delay: Duration::from_millis(500),
            max_turns: None,
        }
    }
}

/// Why auto-play stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPlayStop {
    Cancelled,
    /// Paused, ended, stepped or reset by the user.
    SceneNotRunning,
    SceneComplete,
    TurnLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPlayReport {
    pub turns_played: usize,
    pub discarded: usize,
    pub stopped_by: AutoPlayStop,
}

/// Handle to a running auto-play task.
pub struct AutoPlayHandle {
    cancel_token: CancellationToken,
    task: JoinHandle<AutoPlayReport>,
}

impl AutoPlayHandle {
    /// Request a stop. A turn being generated is abandoned.
    pub fn stop(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task to finish.
    pub async fn join(self) -> AutoPlayReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Auto-play task failed");
                AutoPlayReport {
                    turns_played: 0,
                    discarded: 0,
                    stopped_by: AutoPlayStop::Cancelled,
                }
            }
        }
    }
}

pub struct AutoPlay;

impl AutoPlay {
    pub fn spawn(scene: SharedScene, config: AutoPlayConfig) -> AutoPlayHandle {
        let cancel_token = CancellationToken::new();
        let task = tokio::spawn(run(scene, config, cancel_token.clone()));
        AutoPlayHandle { cancel_token, task }
    }
}

async fn run(
    scene: SharedScene,
    config: AutoPlayConfig,
    cancel_token: CancellationToken,
) -> AutoPlayReport {
    tracing::info!(turn_delay_ms = config.turn_delay.as_millis() as u64, "Starting auto-play");

    let mut turns_played = 0;
    let mut discarded = 0;
    let report = |turns_played: usize, discarded: usize, stopped_by: AutoPlayStop| {
        tracing::info!(turns_played, discarded, stopped_by = ?stopped_by, "Auto-play stopped");
        AutoPlayReport {
            turns_played,
            discarded,
            stopped_by,
        }
    };

    loop {
        if cancel_token.is_cancelled() {
            return report(turns_played, discarded, AutoPlayStop::Cancelled);
        }
        if config.max_turns.is_some_and(|max| turns_played >= max) {
            return report(turns_played, discarded, AutoPlayStop::TurnLimit);
        }

        let ticket = {
            let control = scene.lock().await;
            if !control.is_auto_running() {
                return report(turns_played, discarded, AutoPlayStop::SceneNotRunning);
            }
            match control.prepare_turn() {
                Some(ticket) => ticket,
                None => return report(turns_played, discarded, AutoPlayStop::SceneNotRunning),
            }
        };

        let turn = tokio::select! {
            _ = cancel_token.cancelled() => {
                return report(turns_played, discarded, AutoPlayStop::Cancelled);
            }
            turn = ticket.resolve() => turn,
        };

        let outcome = scene.lock().await.commit_turn(turn);
        match outcome {
            AdvanceOutcome::Advanced { scene_complete, .. } => {
                turns_played += 1;
                if scene_complete {
                    return report(turns_played, discarded, AutoPlayStop::SceneComplete);
                }
            }
            AdvanceOutcome::Discarded => {
                discarded += 1;
                tracing::debug!("Auto-play turn discarded");
                continue;
            }
            AdvanceOutcome::Skipped => {
                return report(turns_played, discarded, AutoPlayStop::SceneNotRunning);
            }
        }

        tokio::select! {
            _ = cancel_token.cancelled() => {
                return report(turns_played, discarded, AutoPlayStop::Cancelled);
            }
            _ = tokio::time::sleep(config.turn_delay) => {}
        }
    }
}
