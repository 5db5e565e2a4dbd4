//! Observers receive each tick's reports for display or recording.
//!
//! Observers are display-only: nothing they do affects the outcome.

use crate::outcome::TestOutcome;
use crossbeam::channel::Sender;
use fieldtest_core::{ValidationFrame, ValidationReport};
use fieldtest_env::WorldSnapshot;
use std::time::Duration;

/// Hook called by the orchestrator after every validation pass.
pub trait ReportObserver: Send {
    /// Called once per tick, before the always check.
    fn on_tick(
        &mut self,
        elapsed: Duration,
        world: &WorldSnapshot,
        eventually: &ValidationReport,
        always: &ValidationReport,
    );

    /// Called once when the run ends.
    fn on_finish(&mut self, _outcome: &TestOutcome) {}
}

/// Forwards frames to a display over a channel.
///
/// Once the display is gone frames are silently dropped.
pub struct ChannelObserver {
    tx: Sender<ValidationFrame>,
    connected: bool,
}

impl ChannelObserver {
    pub fn new(tx: Sender<ValidationFrame>) -> Self {
        Self { tx, connected: true }
    }
}

impl ReportObserver for ChannelObserver {
    fn on_tick(
        &mut self,
        elapsed: Duration,
        world: &WorldSnapshot,
        eventually: &ValidationReport,
        always: &ValidationReport,
    ) {
        if !self.connected {
            return;
        }
        let frame = ValidationFrame {
            elapsed_s: elapsed.as_secs_f64(),
            world: world.clone(),
            eventually: eventually.clone(),
            always: always.clone(),
        };
        if self.tx.send(frame).is_err() {
            tracing::debug!("Display disconnected, no longer forwarding frames");
            self.connected = false;
        }
    }
}
