//! Test fixtures for wiring controllers and creating sample projects.

use super::mock_collaborators::{MockLoader, ScriptedPlayback};
use mw_core::state::{ApplianceController, ClipNames};
use mw_protocol::appliance_models::DoorState;
use mw_protocol::ipc::Event;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Door clip duration used by timed fixtures.
#[allow(dead_code)]
pub const DOOR_CLIP: Duration = Duration::from_secs(1);

/// A controller with scripted collaborators and its event stream.
pub struct Fixture {
    pub controller: ApplianceController,
    pub playback: Arc<ScriptedPlayback>,
    pub loader: Arc<MockLoader>,
    pub events_rx: mpsc::UnboundedReceiver<Event>,
}

#[allow(dead_code)]
impl Fixture {
    /// Clips finish [`DOOR_CLIP`] after they are requested.
    pub fn timed() -> Self {
        Self::with_playback(ScriptedPlayback::auto(DOOR_CLIP))
    }

    /// Clips finish only when the test says so.
    pub fn manual() -> Self {
        Self::with_playback(ScriptedPlayback::manual())
    }

    fn with_playback(playback: ScriptedPlayback) -> Self {
        let playback = Arc::new(playback);
        let loader = Arc::new(MockLoader::new());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let controller = ApplianceController::new(
            playback.clone(),
            loader.clone(),
            ClipNames::default(),
            events_tx,
        );

        Self {
            controller,
            playback,
            loader,
            events_rx,
        }
    }

    /// Name of the door clip.
    pub fn door_clip(&self) -> String {
        ClipNames::default().door
    }

    /// Name of the timer clip.
    pub fn timer_clip(&self) -> String {
        ClipNames::default().timer
    }

    /// Open the door and wait for it to settle. Timed fixtures only.
    pub async fn open_door(&self) {
        self.controller
            .toggle_door()
            .expect("Door should toggle from rest");
        assert_eq!(self.controller.door_settled().await, DoorState::Open);
    }

    /// Open the door and place `item_type` at stage 1. Timed fixtures only.
    pub async fn open_with_item(&self, item_type: &str) {
        self.open_door().await;
        self.controller
            .select_item(item_type)
            .await
            .expect("Item should load");
    }

    /// Yield until the door reaches `door`.
    ///
    /// For states the door passes through without settling, where
    /// `door_settled` cannot be used.
    pub async fn wait_for_door(&self, door: DoorState) {
        for _ in 0..100 {
            if self.controller.state().door == door {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!(
            "Door never reached {door:?}, stuck at {:?}",
            self.controller.state().door
        );
    }

    /// Every event published so far.
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Create a temporary project with a `.microwave/` directory and model files.
///
/// The project knows `popcorn` (stages 1-3) and `pizza` (stage 1 only), cooks
/// for 2 seconds and plays each clip for 500 ms.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join(".microwave/items"))?;
    std::fs::create_dir_all(root.join("models"))?;

    let config_toml = r#"
cook-duration-secs = 2
models-dir = "models"

[clips.door]
name = "DoorOpenCloseAnimation"
duration-ms = 500

[clips.timer]
name = "timer_animation"
duration-ms = 500
"#;
    std::fs::write(root.join(".microwave/config.toml"), config_toml)?;

    std::fs::write(
        root.join(".microwave/items/popcorn.yaml"),
        "name: popcorn\nlabel: Popcorn\n",
    )?;
    std::fs::write(
        root.join(".microwave/items/pizza.yaml"),
        "name: pizza\nlabel: Pizza\n",
    )?;

    for stage in 1..=3 {
        std::fs::write(root.join(format!("models/popcorn_v{stage}.glb")), b"glTF")?;
    }
    std::fs::write(root.join("models/pizza_v1.glb"), b"glTF")?;

    Ok(temp_dir)
}
