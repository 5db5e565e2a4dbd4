//! Tick driver - advances simulated time one step at a time.

use crate::clock::SimClock;
use fieldtest_env::{EnvError, SimulationTick, TickPublisher, WorldSnapshot, WorldSource};
use std::time::Duration;

/// Publishes ticks and collects the matching world snapshot.
///
/// Every `advance` issues exactly one tick and consumes exactly one
/// snapshot; the snapshot's tick number must match the number of ticks
/// issued so far.
pub struct TickDriver<P, W> {
    publisher: P,
    source: W,
    clock: SimClock,

    /// Ticks issued so far
    ticks: u64,

    /// Sleep each tick's duration in wall-clock time
    realtime_pacing: bool,
}

impl<P: TickPublisher, W: WorldSource> TickDriver<P, W> {
    /// Creates a driver over the given transport.
    pub fn new(publisher: P, source: W) -> Self {
        Self {
            publisher,
            source,
            clock: SimClock::new(),
            ticks: 0,
            realtime_pacing: false,
        }
    }

    /// Enables wall-clock pacing.
    pub fn with_realtime_pacing(mut self, enabled: bool) -> Self {
        self.realtime_pacing = enabled;
        self
    }

    /// Uses an existing clock (e.g. one shared with observers).
    pub fn with_clock(mut self, clock: SimClock) -> Self {
        self.clock = clock;
        self
    }

    /// Advances simulated time by `duration` and returns the next snapshot.
    ///
    /// Blocks until the snapshot arrives; there is no timeout here. Elapsed
    /// simulated time grows by exactly `duration` once the tick is published.
    pub fn advance(&mut self, duration: Duration) -> Result<WorldSnapshot, EnvError> {
        self.publisher.publish(SimulationTick::new(duration))?;
        self.ticks += 1;
        self.clock.advance(duration);

        if self.realtime_pacing {
            std::thread::sleep(duration);
        }

        let world = self.source.get()?;
        if world.tick != self.ticks {
            return Err(EnvError::OutOfOrder {
                expected: self.ticks,
                received: world.tick,
            });
        }

        Ok(world)
    }

    /// Ticks issued so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Elapsed simulated time.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Returns the driver's clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldtest_env::{tick_channel, world_channel};
    use std::thread;

    #[test]
    fn test_advance_round_trip() {
        let (publisher, ticks) = tick_channel();
        let (sink, source) = world_channel(1);

        let producer = thread::spawn(move || {
            let mut served = 0;
            for tick in ticks.iter() {
                served += 1;
                let world = WorldSnapshot::empty(served, served as f64 * tick.seconds());
                if sink.send(world).is_err() {
                    break;
                }
            }
            served
        });

        let mut driver = TickDriver::new(publisher, source);
        for expected in 1..=3 {
            let world = driver.advance(Duration::from_millis(20)).unwrap();
            assert_eq!(world.tick, expected);
        }

        assert_eq!(driver.ticks(), 3);
        assert_eq!(driver.elapsed(), Duration::from_millis(60));

        drop(driver);
        assert_eq!(producer.join().unwrap(), 3);
    }

    #[test]
    fn test_out_of_order_snapshot() {
        let (publisher, _ticks) = tick_channel();
        let (sink, source) = world_channel(2);

        // Producer skips tick 1
        sink.send(WorldSnapshot::empty(2, 0.0)).unwrap();

        let mut driver = TickDriver::new(publisher, source);
        let err = driver.advance(Duration::from_millis(10)).unwrap_err();
        assert_eq!(err, EnvError::OutOfOrder { expected: 1, received: 2 });
    }

    #[test]
    fn test_closed_source() {
        let (publisher, _ticks) = tick_channel();
        let (sink, source) = world_channel(1);
        drop(sink);

        let mut driver = TickDriver::new(publisher, source);
        assert!(matches!(
            driver.advance(Duration::from_millis(10)),
            Err(EnvError::ChannelClosed(_))
        ));
        // The tick was published, so simulated time still moved
        assert_eq!(driver.elapsed(), Duration::from_millis(10));
    }
}
