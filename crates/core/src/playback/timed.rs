//! Timer-driven playback backend.
//!
//! Stands in for a real animation mixer: every known clip "plays" for its
//! configured duration and then reports completion.

use super::base::{completion_pair, AnimationPlayback, ClipCompletion, PlaybackDirection};
use mw_protocol::config_models::ClipSettings;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Plays clips by sleeping for their configured duration.
pub struct TimedPlayback {
    durations: HashMap<String, Duration>,

    /// Playback task per clip. Aborting a task drops its finisher, which
    /// resolves the completion as abandoned.
    active: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TimedPlayback {
    /// Create a backend knowing the given clips.
    pub fn new<I, S>(clips: I) -> Self
    where
        I: IntoIterator<Item = (S, Duration)>,
        S: Into<String>,
    {
        Self {
            durations: clips
                .into_iter()
                .map(|(name, duration)| (name.into(), duration))
                .collect(),
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Create a backend for the door and timer clips from configuration.
    pub fn from_settings(clips: &ClipSettings) -> Self {
        Self::new([
            (
                clips.door.name.clone(),
                Duration::from_millis(clips.door.duration_ms),
            ),
            (
                clips.timer.name.clone(),
                Duration::from_millis(clips.timer.duration_ms),
            ),
        ])
    }

    /// Whether `clip` is currently playing.
    pub fn is_playing(&self, clip: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(clip)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl AnimationPlayback for TimedPlayback {
    fn play(&self, clip: &str, direction: PlaybackDirection) -> ClipCompletion {
        let Some(duration) = self.durations.get(clip).copied() else {
            warn!(clip, "Animation clip not found, skipping");
            return ClipCompletion::finished(clip);
        };

        let Ok(runtime) = Handle::try_current() else {
            warn!(clip, "No runtime to play clip on, skipping");
            return ClipCompletion::finished(clip);
        };

        let (finisher, completion) = completion_pair(clip);
        debug!(clip, ?direction, ?duration, "Playing clip");

        let handle = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            finisher.finish();
        });

        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(clip.to_string(), handle);
        if let Some(previous) = previous {
            previous.abort();
        }

        completion
    }

    fn stop(&self, clip: &str) {
        let handle = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(clip);
        if let Some(handle) = handle {
            debug!(clip, "Stopping clip");
            handle.abort();
        }
    }
}
