//! fieldtest Environment Contracts
//!
//! This crate describes everything the test orchestrator consumes from the
//! outside world, without depending on any particular simulator:
//! - **Ticks**: `SimulationTick` commands published to the system under test
//! - **World**: one `WorldSnapshot` handed back per tick
//! - **Display**: a blocking render loop that can be closed from another thread
//!
//! The crossbeam-backed implementations in [`channel_impl`] are what the
//! in-process simulated field and the tests use. A real simulator bridge only
//! has to implement [`TickPublisher`] and [`WorldSource`].
//!
//! # Flow
//!
//! ```text
//! Orchestrator                    System under test
//!   |-- publish(SimulationTick) ------->|
//!   |                                   |-- step physics
//!   |<------------- WorldSnapshot ------|   (bounded hand-off)
//! ```

mod types;
mod transport;
mod display;
mod error;
pub mod channel_impl;

pub use types::{BallState, RobotState, SimulationTick, Team, WorldSnapshot};
pub use transport::{TickPublisher, WorldSource};
pub use display::{CloseSignal, Display, SignalDisplay};
pub use error::EnvError;
pub use channel_impl::{tick_channel, world_channel, ChannelTickPublisher, ChannelWorldSource, TickReceiver, WorldSink};
