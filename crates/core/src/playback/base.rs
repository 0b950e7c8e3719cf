//! Base AnimationPlayback trait and completion signalling.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::oneshot;

/// Direction a clip is played in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackDirection {
    /// Start to end, e.g. opening the door.
    Forward,
    /// End to start, e.g. closing the door.
    Reverse,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// The backend dropped the playback without reporting that it finished.
    ///
    /// Happens when a clip is stopped or superseded by a newer request.
    #[error("Playback of clip '{0}' was abandoned before it finished")]
    Abandoned(String),
}

/// Future resolving when a requested clip has finished playing.
///
/// Dropping it is fine: the backend keeps playing, nobody is told.
#[derive(Debug)]
#[must_use = "a completion does nothing unless awaited"]
pub struct ClipCompletion {
    clip: String,
    rx: oneshot::Receiver<()>,
}

impl ClipCompletion {
    /// A completion that is already resolved.
    pub fn finished(clip: impl Into<String>) -> Self {
        let (finisher, completion) = completion_pair(clip);
        finisher.finish();
        completion
    }

    /// Name of the clip this completion belongs to.
    pub fn clip(&self) -> &str {
        &self.clip
    }
}

impl Future for ClipCompletion {
    type Output = Result<(), PlaybackError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        Pin::new(&mut this.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| PlaybackError::Abandoned(this.clip.clone())))
    }
}

/// Backend side of a [`ClipCompletion`].
#[derive(Debug)]
pub struct ClipFinisher {
    tx: oneshot::Sender<()>,
}

impl ClipFinisher {
    /// Report that the clip finished. Consumes the finisher.
    pub fn finish(self) {
        let _ = self.tx.send(());
    }

    /// Whether the waiting side has gone away.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a linked finisher/completion pair for one playback request.
pub fn completion_pair(clip: impl Into<String>) -> (ClipFinisher, ClipCompletion) {
    let (tx, rx) = oneshot::channel();
    (
        ClipFinisher { tx },
        ClipCompletion {
            clip: clip.into(),
            rx,
        },
    )
}

/// Plays named animation clips.
///
/// Implementations must not call back into the controller. Progress is
/// reported only through the returned [`ClipCompletion`].
pub trait AnimationPlayback: Send + Sync {
    /// Start playing `clip` in `direction`.
    ///
    /// Requesting a clip that is already playing supersedes the earlier
    /// request; its completion resolves with [`PlaybackError::Abandoned`].
    fn play(&self, clip: &str, direction: PlaybackDirection) -> ClipCompletion;

    /// Halt `clip` and reset it. Unknown or idle clips are ignored.
    fn stop(&self, clip: &str);

    fn play_forward(&self, clip: &str) -> ClipCompletion {
        self.play(clip, PlaybackDirection::Forward)
    }

    fn play_reverse(&self, clip: &str) -> ClipCompletion {
        self.play(clip, PlaybackDirection::Reverse)
    }
}
