//! Transport abstraction between the orchestrator and the system under test.

use crate::error::EnvError;
use crate::types::{SimulationTick, WorldSnapshot};

/// Fire-and-forget publication of tick commands.
///
/// # Implementations
///
/// - **In-process**: `ChannelTickPublisher` (crossbeam)
/// - **Out-of-process**: any bridge to a simulator binary
///
/// # Packet Flow
///
/// ```text
/// Orchestrator              Publisher              Simulator
///   |-- publish(tick) ------->|                        |
///   |                         |-- deliver ------------>|
///   |<- Ok(()) (no ack) ------|                        |
/// ```
pub trait TickPublisher: Send + 'static {
    /// Sends a tick to the system under test.
    ///
    /// # Returns
    /// * `Ok(())` - Tick handed to the transport (delivery is not acknowledged)
    /// * `Err(EnvError::ChannelClosed)` - The receiving side has gone away
    fn publish(&mut self, tick: SimulationTick) -> Result<(), EnvError>;
}

/// Bounded, single-consumer hand-off of world snapshots.
pub trait WorldSource: Send + 'static {
    /// Blocks until the next snapshot is available.
    ///
    /// There is no timeout at this layer; timeout policy belongs to the
    /// orchestrator's simulated-time accounting.
    ///
    /// # Returns
    /// * `Err(EnvError::ChannelClosed)` - The producer has shut down
    fn get(&mut self) -> Result<WorldSnapshot, EnvError>;
}

impl<T: TickPublisher + ?Sized> TickPublisher for Box<T> {
    fn publish(&mut self, tick: SimulationTick) -> Result<(), EnvError> {
        (**self).publish(tick)
    }
}

impl<T: WorldSource + ?Sized> WorldSource for Box<T> {
    fn get(&mut self) -> Result<WorldSnapshot, EnvError> {
        (**self).get()
    }
}
