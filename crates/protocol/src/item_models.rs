//! Item catalog models for `.microwave/items/*.yaml`.
//!
//! Each file describes one item the user can place in the appliance.
//! The `name` doubles as the model file prefix: stage `n` of `popcorn`
//! is loaded from `popcorn_v{n}.glb`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A selectable item.
///
/// # Example
///
/// ```yaml
/// # .microwave/items/popcorn.yaml
/// name: popcorn
/// label: Popcorn
/// description: Kernels that pop after one cycle and burn after two.
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ItemDefinition {
    /// Identifier used for model lookup and item selection.
    pub name: String,

    /// Human-readable button label. Falls back to `name` when empty.
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub description: String,
}

impl ItemDefinition {
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}
