//! Scripted collaborators for deterministic testing.

use async_trait::async_trait;
use mw_core::assets::{AssetHandle, ItemStageLoader, LoadError};
use mw_core::playback::{completion_pair, AnimationPlayback, ClipCompletion, ClipFinisher, PlaybackDirection};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One `play` call seen by [`ScriptedPlayback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    pub clip: String,
    pub direction: PlaybackDirection,
}

/// Playback that either finishes clips after a fixed delay or waits for
/// the test to finish them by hand.
pub struct ScriptedPlayback {
    auto_finish: Option<Duration>,
    requests: Mutex<Vec<PlayRequest>>,
    stopped: Mutex<Vec<String>>,
    pending: Mutex<HashMap<String, ClipFinisher>>,
}

#[allow(dead_code)]
impl ScriptedPlayback {
    /// Every clip finishes `delay` after it was requested.
    pub fn auto(delay: Duration) -> Self {
        Self {
            auto_finish: Some(delay),
            requests: Mutex::new(Vec::new()),
            stopped: Mutex::new(Vec::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Clips only finish when [`finish`](Self::finish) is called.
    pub fn manual() -> Self {
        Self {
            auto_finish: None,
            ..Self::auto(Duration::ZERO)
        }
    }

    /// Report completion of the latest request for `clip`.
    ///
    /// Returns false if no request was waiting.
    pub fn finish(&self, clip: &str) -> bool {
        match self.pending.lock().unwrap().remove(clip) {
            Some(finisher) => {
                finisher.finish();
                true
            }
            None => false,
        }
    }

    pub fn requests(&self) -> Vec<PlayRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests for one clip, in order.
    pub fn directions(&self, clip: &str) -> Vec<PlaybackDirection> {
        self.requests()
            .into_iter()
            .filter(|request| request.clip == clip)
            .map(|request| request.direction)
            .collect()
    }

    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }
}

impl AnimationPlayback for ScriptedPlayback {
    fn play(&self, clip: &str, direction: PlaybackDirection) -> ClipCompletion {
        self.requests.lock().unwrap().push(PlayRequest {
            clip: clip.to_string(),
            direction,
        });

        let (finisher, completion) = completion_pair(clip);
        match self.auto_finish {
            Some(delay) => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    finisher.finish();
                });
            }
            None => {
                self.pending
                    .lock()
                    .unwrap()
                    .insert(clip.to_string(), finisher);
            }
        }
        completion
    }

    fn stop(&self, clip: &str) {
        self.stopped.lock().unwrap().push(clip.to_string());
        self.pending.lock().unwrap().remove(clip);
    }
}

/// One call seen by [`MockLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderCall {
    Load { item_type: String, stage: u8 },
    Unload(AssetHandle),
}

/// In-memory loader that records calls and fails on request.
#[derive(Default)]
pub struct MockLoader {
    next_handle: AtomicU64,
    calls: Mutex<Vec<LoaderCall>>,
    live: Mutex<HashMap<AssetHandle, (String, u8)>>,
    failing: Mutex<HashSet<(String, u8)>>,
    yield_on_load: AtomicBool,
}

#[allow(dead_code)]
impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make loading `item_type` at `stage` fail from now on.
    pub fn fail_on(&self, item_type: &str, stage: u8) {
        self.failing
            .lock()
            .unwrap()
            .insert((item_type.to_string(), stage));
    }

    /// Make every load suspend once before it completes, like a load that
    /// touches the filesystem.
    pub fn yield_on_load(&self) {
        self.yield_on_load.store(true, Ordering::Relaxed);
    }

    pub fn calls(&self) -> Vec<LoaderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Item stages currently loaded, sorted.
    pub fn live(&self) -> Vec<(String, u8)> {
        let mut live: Vec<_> = self.live.lock().unwrap().values().cloned().collect();
        live.sort();
        live
    }
}

#[async_trait]
impl ItemStageLoader for MockLoader {
    async fn load(&self, item_type: &str, stage: u8) -> Result<AssetHandle, LoadError> {
        self.calls.lock().unwrap().push(LoaderCall::Load {
            item_type: item_type.to_string(),
            stage,
        });

        if self.yield_on_load.load(Ordering::Relaxed) {
            tokio::task::yield_now().await;
        }

        if self
            .failing
            .lock()
            .unwrap()
            .contains(&(item_type.to_string(), stage))
        {
            return Err(LoadError::Backend {
                item_type: item_type.to_string(),
                stage,
                reason: "scripted failure".to_string(),
            });
        }

        let handle = AssetHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
        self.live
            .lock()
            .unwrap()
            .insert(handle, (item_type.to_string(), stage));
        Ok(handle)
    }

    async fn unload(&self, handle: AssetHandle) {
        self.calls.lock().unwrap().push(LoaderCall::Unload(handle));
        self.live.lock().unwrap().remove(&handle);
    }
}
