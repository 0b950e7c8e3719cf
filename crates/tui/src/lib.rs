//! # mw-tui
//!
//! Terminal User Interface for microwave-kit.
//!
//! This crate provides the interactive TUI for operating the appliance. It
//! communicates with `mw-core`'s session via channels using the `Op` and
//! `Event` protocol defined in `mw-protocol`: key presses and slash
//! commands become `Op`s, and the panels are redrawn from `Event`s.

pub mod app;
pub mod event;
pub mod event_handler;
pub mod tui;
pub mod widgets;

pub use app::App;
pub use tui::Tui;

use anyhow::Result;
use mw_core::config::models::AppConfig;
use mw_core::session::ApplianceSession;
use mw_protocol::Op;
use tokio::sync::mpsc;
use tracing::info;

/// Ops that can be queued before the session falls behind.
const OP_QUEUE_DEPTH: usize = 64;

/// Run the terminal UI against a fresh session built from `config`.
///
/// Returns once the user quits and the session has shut down, so any
/// running cycle has been cancelled and cleaned up.
pub async fn run_app(config: AppConfig) -> Result<()> {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (op_tx, op_rx) = mpsc::channel(OP_QUEUE_DEPTH);

    let session = ApplianceSession::from_config(&config, events_tx);
    let session = tokio::spawn(session.run(op_rx));

    // The first snapshot fills the status panel.
    op_tx.send(Op::GetSnapshot).await?;

    let mut app = App::new(op_tx.clone(), events_rx, config.items.clone());
    let mut tui = Tui::init()?;
    let result = app.run(&mut tui).await;
    let restored = tui.restore();
    drop(app);

    // Already gone if the user quit with /quit.
    let _ = op_tx.send(Op::Shutdown).await;
    drop(op_tx);
    let session_result = session.await?;
    info!("TUI exited");

    result.and(restored).and(session_result)
}
