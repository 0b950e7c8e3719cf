//! Item stage loading collaborator.
//!
//! Every item exists as one asset per cook stage. The controller asks an
//! [`ItemStageLoader`] to load `(item_type, stage)` and keeps the returned
//! [`AssetHandle`] until it unloads it again.

pub mod base;
pub mod model_dir;

pub use base::{AssetHandle, ItemStageLoader, LoadError};
pub use model_dir::ModelDirLoader;
