//! Simulated clock tracking elapsed test time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Virtual clock advanced only by issued ticks.
///
/// Simulated time is decoupled from wall-clock time: a tick advances the
/// clock by exactly its duration however long the snapshot took to arrive.
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    /// Elapsed simulated time in nanoseconds
    elapsed_ns: Arc<AtomicU64>,
}

impl SimClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances simulated time by the given duration.
    pub fn advance(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.elapsed_ns.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Returns the elapsed simulated time.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns.load(Ordering::SeqCst))
    }

    /// Resets the clock to zero.
    pub fn reset(&self) {
        self.elapsed_ns.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advance() {
        let clock = SimClock::new();
        assert_eq!(clock.elapsed(), Duration::ZERO);

        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.elapsed(), Duration::from_secs(1));

        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn test_clock_clone_shares_time() {
        let clock1 = SimClock::new();
        let clock2 = clock1.clone();

        clock1.advance(Duration::from_secs(5));

        assert_eq!(clock1.elapsed(), clock2.elapsed());

        clock2.reset();
        assert_eq!(clock1.elapsed(), Duration::ZERO);
    }
}
