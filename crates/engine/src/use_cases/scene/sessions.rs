//! Live scene sessions.
//!
//! Each session owns its own `SceneControl`; sessions never share state. At
//! most one auto-play task runs per session.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use rolecast_domain::{SceneCast, SceneId};

use super::autoplay::{AutoPlay, AutoPlayConfig, AutoPlayHandle, SharedScene};
use super::control::SceneControl;
use super::director::SceneDirector;
use super::performer::ScenePerformer;

pub struct SceneSessions {
    director: Arc<SceneDirector>,
    scenes: DashMap<SceneId, SharedScene>,
    auto_play: DashMap<SceneId, AutoPlayHandle>,
    auto_play_config: AutoPlayConfig,
}

impl SceneSessions {
    pub fn new(director: Arc<SceneDirector>, auto_play_config: AutoPlayConfig) -> Self {
        Self {
            director,
            scenes: DashMap::new(),
            auto_play: DashMap::new(),
            auto_play_config,
        }
    }

    /// Open a new scene session in setup.
    pub fn open(&self, cast: SceneCast, performer: Arc<dyn ScenePerformer>) -> SceneId {
        let id = SceneId::new();
        let control = SceneControl::new(cast, Arc::clone(&self.director), performer);
        self.scenes.insert(id, Arc::new(Mutex::new(control)));
        tracing::info!(scene_id = %id, "Scene session opened");
        id
    }

    pub fn get(&self, id: &SceneId) -> Option<SharedScene> {
        self.scenes.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Close a session, stopping its auto-play. Returns whether it existed.
    pub fn close(&self, id: &SceneId) -> bool {
        if let Some((_, handle)) = self.auto_play.remove(id) {
            handle.stop();
        }
        let removed = self.scenes.remove(id).is_some();
        if removed {
            tracing::info!(scene_id = %id, "Scene session closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Start auto-playing a session, replacing any previous auto-play task.
    /// Handles of tasks that have already finished are dropped.
    ///
    /// Returns `false` if the session does not exist.
    pub fn start_auto_play(&self, id: &SceneId) -> bool {
        let Some(scene) = self.get(id) else {
            return false;
        };
        self.auto_play.retain(|_, handle| !handle.is_finished());
        let handle = AutoPlay::spawn(scene, self.auto_play_config);
        if let Some(previous) = self.auto_play.insert(*id, handle) {
            previous.stop();
        }
        true
    }

    /// Stop auto-playing a session. Returns whether a task was running.
    pub fn stop_auto_play(&self, id: &SceneId) -> bool {
        match self.auto_play.remove(id) {
            Some((_, handle)) => {
                let running = !handle.is_finished();
                handle.stop();
                running
            }
            None => false,
        }
    }
}
