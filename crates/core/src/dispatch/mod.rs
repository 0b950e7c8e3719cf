//! Input dispatch from named interactive regions.
//!
//! Front ends hit-test pointer input against the appliance model and report
//! the name of the mesh that was hit. A [`RegionMap`] turns that name into
//! the controller operation bound to it; anything else is ignored.

use mw_protocol::config_models::RegionNames;
use mw_protocol::ipc::Op;
use std::collections::HashMap;

/// Interactive regions of the appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Door,
    Start,
    Stop,
    Reset,
}

impl Region {
    /// The operation a hit on this region requests.
    ///
    /// `Start` uses the configured default cook duration.
    pub fn op(self) -> Op {
        match self {
            Region::Door => Op::ToggleDoor,
            Region::Start => Op::Start {
                cook_duration_secs: None,
            },
            Region::Stop => Op::Stop,
            Region::Reset => Op::ResetItem,
        }
    }
}

/// Maps region (mesh) names to regions.
#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    regions: HashMap<String, Region>,
}

impl RegionMap {
    /// Build the map from configured region names.
    pub fn from_names(names: &RegionNames) -> Self {
        let regions = [
            (names.door.clone(), Region::Door),
            (names.start.clone(), Region::Start),
            (names.stop.clone(), Region::Stop),
            (names.reset.clone(), Region::Reset),
        ]
        .into_iter()
        .collect();

        Self { regions }
    }

    /// Region hit by `name`, or `None` for unmatched hits.
    pub fn resolve(&self, name: &str) -> Option<Region> {
        self.regions.get(name).copied()
    }

    /// Operation requested by a hit on `name`.
    pub fn op_for(&self, name: &str) -> Option<Op> {
        self.resolve(name).map(Region::op)
    }

    /// Configured name of `region`.
    pub fn name_of(&self, region: Region) -> Option<&str> {
        self.regions
            .iter()
            .find(|(_, candidate)| **candidate == region)
            .map(|(name, _)| name.as_str())
    }
}
