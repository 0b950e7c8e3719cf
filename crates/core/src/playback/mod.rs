//! Animation playback collaborator.
//!
//! The controller never drives frames itself. It asks an [`AnimationPlayback`]
//! backend to play a named clip and receives a [`ClipCompletion`] future
//! that resolves once the clip has finished.
//!
//! ## Backends
//!
//! - [`TimedPlayback`]: simulates clips with configured durations on the tokio timer

pub mod base;
pub mod timed;

pub use base::{
    completion_pair, AnimationPlayback, ClipCompletion, ClipFinisher, PlaybackDirection,
    PlaybackError,
};
pub use timed::TimedPlayback;
