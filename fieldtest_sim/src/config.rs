//! Test run configuration.

use crate::error::TestError;
use std::time::Duration;

/// Default test timeout in seconds.
pub const DEFAULT_TIMEOUT_S: f64 = 3.0;

/// Default tick rate (steps per simulated second).
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Pause before closing the display after a normal finish, lets buffered
/// display writes flush.
pub const PROCESS_BUFFER_DELAY: Duration = Duration::from_millis(10);

/// Pause before closing the display after a failure, keeps diagnostics on
/// screen.
pub const PAUSE_AFTER_FAIL_DELAY: Duration = Duration::from_secs(3);

/// Configuration for a simulated test run.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Simulated time after which eventually-sequences are judged
    pub timeout: Duration,

    /// Simulated duration of one tick
    pub tick_duration: Duration,

    /// Run with a live display (threaded mode)
    pub visualization_enabled: bool,

    /// Opaque display layout id, ignored without visualization
    pub layout: Option<String>,

    /// Stop as soon as every eventually-sequence has passed
    pub exit_on_eventually_passed: bool,

    /// Sleep each tick's duration in wall-clock time
    pub realtime_pacing: bool,

    /// Display close delay on success
    pub close_delay: Duration,

    /// Display close delay on failure
    pub failure_close_delay: Duration,

    /// Capacity of the world hand-off channel
    pub world_buffer: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_S),
            tick_duration: Duration::from_secs_f64(1.0 / DEFAULT_TICK_RATE_HZ as f64),
            visualization_enabled: false,
            layout: None,
            exit_on_eventually_passed: false,
            realtime_pacing: false,
            close_delay: PROCESS_BUFFER_DELAY,
            failure_close_delay: PAUSE_AFTER_FAIL_DELAY,
            world_buffer: 1,
        }
    }
}

impl TestConfig {
    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the tick duration.
    pub fn with_tick_duration(mut self, tick_duration: Duration) -> Self {
        self.tick_duration = tick_duration;
        self
    }

    /// Enables the live display. Also turns on real-time pacing so the run
    /// can be followed by eye.
    pub fn with_visualization(mut self, layout: Option<String>) -> Self {
        self.visualization_enabled = true;
        self.realtime_pacing = true;
        self.layout = layout;
        self
    }

    /// Sets real-time pacing explicitly.
    pub fn with_realtime_pacing(mut self, enabled: bool) -> Self {
        self.realtime_pacing = enabled;
        self
    }

    /// Enables early exit once all eventually-sequences pass.
    pub fn with_early_exit(mut self, enabled: bool) -> Self {
        self.exit_on_eventually_passed = enabled;
        self
    }

    /// Sets both display close delays.
    pub fn with_close_delays(mut self, success: Duration, failure: Duration) -> Self {
        self.close_delay = success;
        self.failure_close_delay = failure;
        self
    }

    /// Returns the layout id if visualization is enabled.
    pub fn effective_layout(&self) -> Option<&str> {
        if self.visualization_enabled {
            self.layout.as_deref()
        } else {
            None
        }
    }

    /// Number of ticks a full-length run issues.
    pub fn expected_ticks(&self) -> u64 {
        expected_ticks(self.timeout, self.tick_duration)
    }

    /// Validates the timing parameters.
    pub fn validate(&self) -> Result<(), TestError> {
        validate_timing(self.timeout, self.tick_duration)
    }
}

/// Checks that `0 < tick_duration <= timeout`.
pub fn validate_timing(timeout: Duration, tick_duration: Duration) -> Result<(), TestError> {
    if tick_duration.is_zero() {
        return Err(TestError::config("tick duration must be greater than zero"));
    }
    if tick_duration > timeout {
        return Err(TestError::config(format!(
            "tick duration {:?} exceeds timeout {:?}",
            tick_duration, timeout
        )));
    }
    Ok(())
}

/// Ticks issued while `elapsed < timeout`, i.e. `ceil(timeout / tick)`.
pub fn expected_ticks(timeout: Duration, tick_duration: Duration) -> u64 {
    if tick_duration.is_zero() {
        return 0;
    }
    let timeout_ns = timeout.as_nanos();
    let tick_ns = tick_duration.as_nanos();
    u64::try_from(timeout_ns.div_ceil(tick_ns)).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TestConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(!config.visualization_enabled);
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_layout(), None);
    }

    #[test]
    fn test_visualization_enables_pacing() {
        let config = TestConfig::default().with_visualization(Some("compact".to_string()));
        assert!(config.realtime_pacing);
        assert_eq!(config.effective_layout(), Some("compact"));
    }

    #[test]
    fn test_invalid_timing() {
        assert!(validate_timing(Duration::from_secs(1), Duration::ZERO).is_err());
        assert!(validate_timing(Duration::from_secs(1), Duration::from_secs(2)).is_err());
        assert!(validate_timing(Duration::from_secs(1), Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_expected_ticks() {
        assert_eq!(expected_ticks(Duration::from_secs(3), Duration::from_millis(50)), 60);
        assert_eq!(expected_ticks(Duration::from_millis(100), Duration::from_millis(30)), 4);
        assert_eq!(expected_ticks(Duration::from_secs(1), Duration::from_secs(1)), 1);
    }
}
