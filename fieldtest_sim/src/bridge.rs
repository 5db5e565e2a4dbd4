//! Concurrency bridge - runs the orchestrator next to a live display.
//!
//! # Threading
//!
//! ```text
//! caller thread                       fieldtest-orchestrator thread
//!   |-- spawn ------------------------->| run loop (ticks, validation)
//!   |-- display.show() (blocks)         |
//!   |                                   |-- outcome (or caught panic)
//!   |                                   |-- sleep(grace delay)
//!   |<------------- close signal -------|
//!   |-- join() <------------------------| return outcome
//!   v
//! TestOutcome
//! ```
//!
//! The background thread always closes the display before it finishes, so
//! the caller's render loop unblocks and the join cannot hang. Failures come
//! back through the join handle, never through a process-wide hook.

use crate::config::TestConfig;
use crate::error::TestError;
use crate::outcome::TestOutcome;

use fieldtest_env::Display;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;
use tracing::{error, warn};

const ORCHESTRATOR_THREAD_NAME: &str = "fieldtest-orchestrator";

/// Chooses where the orchestrator runs and relays its outcome.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyBridge {
    /// Delay before closing the display after a pass
    close_delay: Duration,

    /// Delay before closing the display after a failure
    failure_close_delay: Duration,
}

impl ConcurrencyBridge {
    pub fn new(close_delay: Duration, failure_close_delay: Duration) -> Self {
        Self {
            close_delay,
            failure_close_delay,
        }
    }

    pub fn from_config(config: &TestConfig) -> Self {
        Self::new(config.close_delay, config.failure_close_delay)
    }

    /// Runs the call on the current thread.
    ///
    /// Panics are converted exactly as on the threaded path, so both modes
    /// report the same outcome for the same run.
    pub fn run_headless<F>(&self, call: F) -> TestOutcome
    where
        F: FnOnce() -> TestOutcome,
    {
        catch_outcome(call)
    }

    /// Runs the call on a background thread while `display` owns this one.
    ///
    /// Returns once the display has closed and the background thread has
    /// been joined. If the user closes the display early, the join still
    /// waits for the run to finish.
    pub fn run_with_visualization<F, D>(&self, call: F, display: &mut D) -> TestOutcome
    where
        F: FnOnce() -> TestOutcome + Send + 'static,
        D: Display + ?Sized,
    {
        let signal = display.close_signal();
        let close_delay = self.close_delay;
        let failure_close_delay = self.failure_close_delay;

        let spawned = thread::Builder::new()
            .name(ORCHESTRATOR_THREAD_NAME.to_string())
            .spawn(move || {
                let outcome = catch_outcome(call);

                let delay = if outcome.is_passed() {
                    close_delay
                } else {
                    warn!("Run failed, closing display in {:.1}s", failure_close_delay.as_secs_f64());
                    failure_close_delay
                };
                thread::sleep(delay);
                signal.close();

                outcome
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => return TestError::Spawn(err.to_string()).into(),
        };

        if let Err(err) = display.show() {
            warn!("Display exited with error: {}", err);
        }

        match handle.join() {
            Ok(outcome) => outcome,
            Err(payload) => {
                let err = TestError::from_panic(payload.as_ref());
                error!("{}", err);
                err.into()
            }
        }
    }
}

impl Default for ConcurrencyBridge {
    fn default() -> Self {
        Self::from_config(&TestConfig::default())
    }
}

/// Runs the call, turning a panic into `FailedException(BackgroundPanic)`.
fn catch_outcome<F>(call: F) -> TestOutcome
where
    F: FnOnce() -> TestOutcome,
{
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let err = TestError::from_panic(payload.as_ref());
            error!("{}", err);
            err.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldtest_env::{CloseSignal, EnvError, SignalDisplay};
    use std::time::Instant;

    fn quick_bridge() -> ConcurrencyBridge {
        ConcurrencyBridge::new(Duration::from_millis(1), Duration::from_millis(30))
    }

    /// Display whose render loop fails immediately.
    struct BrokenDisplay {
        signal: CloseSignal,
    }

    impl Display for BrokenDisplay {
        fn close_signal(&self) -> CloseSignal {
            self.signal.clone()
        }

        fn show(&mut self) -> Result<(), EnvError> {
            Err(EnvError::display("no terminal"))
        }
    }

    #[test]
    fn test_headless_returns_outcome() {
        let outcome = quick_bridge().run_headless(|| TestOutcome::Passed);
        assert_eq!(outcome, TestOutcome::Passed);
    }

    #[test]
    fn test_headless_converts_panic() {
        let outcome = quick_bridge().run_headless(|| panic!("boom"));
        assert_eq!(
            outcome,
            TestOutcome::FailedException(TestError::BackgroundPanic("boom".to_string()))
        );
    }

    #[test]
    fn test_visualization_returns_outcome_and_closes_display() {
        let mut display = SignalDisplay::new();
        let signal = display.close_signal();

        let outcome = quick_bridge().run_with_visualization(|| TestOutcome::Passed, &mut display);

        assert_eq!(outcome, TestOutcome::Passed);
        assert!(display.was_shown());
        assert!(signal.is_closed());
    }

    #[test]
    fn test_background_panic_is_relayed() {
        let mut display = SignalDisplay::new();

        let start = Instant::now();
        let outcome = quick_bridge().run_with_visualization(
            || -> TestOutcome { panic!("orchestrator exploded") },
            &mut display,
        );

        assert_eq!(
            outcome,
            TestOutcome::FailedException(TestError::BackgroundPanic("orchestrator exploded".to_string()))
        );
        // Failure path waits the longer grace delay before closing
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_user_close_still_joins_run() {
        let mut display = SignalDisplay::new();
        // User closes the window before the run finishes
        display.close();

        let outcome = quick_bridge().run_with_visualization(
            || {
                thread::sleep(Duration::from_millis(20));
                TestOutcome::Passed
            },
            &mut display,
        );

        assert_eq!(outcome, TestOutcome::Passed);
    }

    #[test]
    fn test_display_error_still_joins_run() {
        let mut display = BrokenDisplay { signal: CloseSignal::new() };

        let outcome = quick_bridge().run_with_visualization(|| TestOutcome::Passed, &mut display);

        assert_eq!(outcome, TestOutcome::Passed);
        assert!(display.signal.is_closed());
    }

    #[test]
    fn test_headless_and_threaded_agree() {
        let make = || {
            || TestOutcome::FailedException(TestError::config("bad timing"))
        };

        let headless = quick_bridge().run_headless(make());
        let mut display = SignalDisplay::new();
        let threaded = quick_bridge().run_with_visualization(make(), &mut display);

        assert_eq!(headless.kind(), threaded.kind());
        assert_eq!(headless, threaded);
    }
}
