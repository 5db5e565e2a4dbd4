//! SimWorld - serves the simulated field over the tick transport.
//!
//! The field runs on its own thread. For every tick it receives it steps
//! physics by the tick's duration and sends back exactly one snapshot.

use crate::error::TestError;
use crate::field::SimulatedField;

use fieldtest_env::{tick_channel, world_channel, ChannelTickPublisher, ChannelWorldSource};
use std::thread::{self, JoinHandle};

/// Faults injected into the field server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultPlan {
    /// Stop serving after this many ticks, closing the world channel
    pub drop_after: Option<u64>,
}

impl FaultPlan {
    /// No faults.
    pub fn none() -> Self {
        Self::default()
    }

    /// Closes the transport after `ticks` snapshots have been served.
    pub fn drop_after(ticks: u64) -> Self {
        Self {
            drop_after: Some(ticks),
        }
    }

    fn should_drop(&self, served: u64) -> bool {
        self.drop_after.is_some_and(|limit| served >= limit)
    }
}

/// Summary returned by the field server thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServerReport {
    pub ticks_served: u64,
    pub final_time_s: f64,
}

/// Handle to the running field server.
pub struct FieldServerHandle {
    handle: JoinHandle<ServerReport>,
}

impl FieldServerHandle {
    /// Waits for the server to stop.
    ///
    /// The server stops once the tick publisher is dropped or its fault
    /// plan fires. Returns `None` if the server thread panicked.
    pub fn join(self) -> Option<ServerReport> {
        match self.handle.join() {
            Ok(report) => Some(report),
            Err(_) => {
                tracing::error!("Field server thread panicked");
                None
            }
        }
    }
}

/// A launched simulated world: the orchestrator's end of the transport plus
/// the server handle.
pub struct SimWorld {
    publisher: ChannelTickPublisher,
    source: ChannelWorldSource,
    server: FieldServerHandle,
}

impl SimWorld {
    /// Starts serving `field` on a background thread.
    pub fn launch(mut field: SimulatedField, faults: FaultPlan, world_buffer: usize) -> Result<Self, TestError> {
        let (publisher, ticks) = tick_channel();
        let (sink, source) = world_channel(world_buffer);
        let seed = field.seed();

        let handle = thread::Builder::new()
            .name("fieldtest-field".to_string())
            .spawn(move || {
                let mut served = 0u64;

                for tick in ticks.iter() {
                    if faults.should_drop(served) {
                        tracing::warn!("✗ Field server dropping transport after {} ticks", served);
                        break;
                    }

                    field.step(tick.seconds());
                    served += 1;

                    if sink.send(field.snapshot(served)).is_err() {
                        tracing::debug!("Orchestrator gone, field server stopping");
                        break;
                    }
                }

                ServerReport {
                    ticks_served: served,
                    final_time_s: field.time(),
                }
            })
            .map_err(|e| TestError::Spawn(e.to_string()))?;

        tracing::debug!("Field server started (seed {})", seed);

        Ok(Self {
            publisher,
            source,
            server: FieldServerHandle { handle },
        })
    }

    /// Splits into the transport ends and the server handle.
    pub fn into_parts(self) -> (ChannelTickPublisher, ChannelWorldSource, FieldServerHandle) {
        (self.publisher, self.source, self.server)
    }
}
