//! In-process transport built on crossbeam channels.
//!
//! Used by the simulated field server and by tests. The world channel is
//! bounded so a producer can never run ahead of the orchestrator by more than
//! its capacity.

use crate::error::EnvError;
use crate::transport::{TickPublisher, WorldSource};
use crate::types::{SimulationTick, WorldSnapshot};
use crossbeam::channel::{self, Receiver, Sender};

/// Orchestrator side of the tick channel.
#[derive(Debug)]
pub struct ChannelTickPublisher {
    tx: Sender<SimulationTick>,
}

/// System-under-test side of the tick channel.
#[derive(Debug)]
pub struct TickReceiver {
    rx: Receiver<SimulationTick>,
}

impl TickReceiver {
    /// Blocks for the next tick; `None` once the publisher is dropped.
    pub fn recv(&self) -> Option<SimulationTick> {
        self.rx.recv().ok()
    }

    /// Iterates over ticks until the publisher is dropped.
    pub fn iter(&self) -> impl Iterator<Item = SimulationTick> + '_ {
        self.rx.iter()
    }
}

/// Creates a tick channel.
///
/// Publication is fire-and-forget, so the channel is unbounded.
pub fn tick_channel() -> (ChannelTickPublisher, TickReceiver) {
    let (tx, rx) = channel::unbounded();
    (ChannelTickPublisher { tx }, TickReceiver { rx })
}

impl TickPublisher for ChannelTickPublisher {
    fn publish(&mut self, tick: SimulationTick) -> Result<(), EnvError> {
        self.tx
            .send(tick)
            .map_err(|_| EnvError::closed("tick receiver dropped"))
    }
}

/// Producer side of the world hand-off.
#[derive(Debug, Clone)]
pub struct WorldSink {
    tx: Sender<WorldSnapshot>,
}

impl WorldSink {
    /// Hands a snapshot to the orchestrator, blocking while the buffer is full.
    pub fn send(&self, world: WorldSnapshot) -> Result<(), EnvError> {
        self.tx
            .send(world)
            .map_err(|_| EnvError::closed("world source dropped"))
    }
}

/// Consumer side of the world hand-off.
#[derive(Debug)]
pub struct ChannelWorldSource {
    rx: Receiver<WorldSnapshot>,
}

/// Creates a bounded world hand-off channel.
///
/// A capacity of zero is raised to one.
pub fn world_channel(capacity: usize) -> (WorldSink, ChannelWorldSource) {
    let (tx, rx) = channel::bounded(capacity.max(1));
    (WorldSink { tx }, ChannelWorldSource { rx })
}

impl WorldSource for ChannelWorldSource {
    fn get(&mut self) -> Result<WorldSnapshot, EnvError> {
        self.rx
            .recv()
            .map_err(|_| EnvError::closed("world producer disconnected"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_tick_channel_delivers_in_order() {
        let (mut publisher, receiver) = tick_channel();

        publisher.publish(SimulationTick::new(Duration::from_millis(10))).unwrap();
        publisher.publish(SimulationTick::new(Duration::from_millis(20))).unwrap();

        assert_eq!(receiver.recv().unwrap().duration(), Duration::from_millis(10));
        assert_eq!(receiver.recv().unwrap().duration(), Duration::from_millis(20));
    }

    #[test]
    fn test_publish_after_receiver_dropped() {
        let (mut publisher, receiver) = tick_channel();
        drop(receiver);

        let err = publisher
            .publish(SimulationTick::new(Duration::from_millis(10)))
            .unwrap_err();
        assert!(matches!(err, EnvError::ChannelClosed(_)));
    }

    #[test]
    fn test_world_source_reports_closed_producer() {
        let (sink, mut source) = world_channel(1);

        sink.send(WorldSnapshot::empty(1, 0.0)).unwrap();
        drop(sink);

        assert_eq!(source.get().unwrap().tick, 1);
        assert!(matches!(source.get(), Err(EnvError::ChannelClosed(_))));
    }
}
