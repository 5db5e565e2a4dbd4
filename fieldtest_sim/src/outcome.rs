//! Terminal result of a simulated test run.

use crate::error::TestError;
use fieldtest_core::FailureDetail;
use serde::{Deserialize, Serialize};

/// How a run ended. Created once, at loop termination or from a caught
/// background failure.
#[derive(Debug, Clone, PartialEq)]
pub enum TestOutcome {
    /// Timeout elapsed with every always-sequence unviolated and every
    /// eventually-sequence passed
    Passed,

    /// An always-sequence failed; carries the tick and offending sequences
    FailedAlways(FailureDetail),

    /// Timeout elapsed with eventually-sequences not passed
    FailedEventuallyTimeout(FailureDetail),

    /// Configuration, transport or panic failure
    FailedException(TestError),
}

/// Variant tag of a [`TestOutcome`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Passed,
    FailedAlways,
    FailedEventuallyTimeout,
    FailedException,
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            TestOutcome::Passed => OutcomeKind::Passed,
            TestOutcome::FailedAlways(_) => OutcomeKind::FailedAlways,
            TestOutcome::FailedEventuallyTimeout(_) => OutcomeKind::FailedEventuallyTimeout,
            TestOutcome::FailedException(_) => OutcomeKind::FailedException,
        }
    }

    /// Returns the failure message, if any.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            TestOutcome::Passed => None,
            TestOutcome::FailedAlways(detail) | TestOutcome::FailedEventuallyTimeout(detail) => {
                Some(detail.to_string())
            }
            TestOutcome::FailedException(err) => Some(err.to_string()),
        }
    }

    /// Tick at which a validation failure was decided.
    pub fn failure_tick(&self) -> Option<u64> {
        match self {
            TestOutcome::FailedAlways(detail) | TestOutcome::FailedEventuallyTimeout(detail) => Some(detail.tick),
            _ => None,
        }
    }

    /// Returns the transport error behind a transport failure.
    pub fn transport_error(&self) -> Option<&fieldtest_env::EnvError> {
        match self {
            TestOutcome::FailedException(TestError::Transport(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<TestError> for TestOutcome {
    fn from(err: TestError) -> Self {
        TestOutcome::FailedException(err)
    }
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestOutcome::Passed => write!(f, "passed"),
            TestOutcome::FailedAlways(detail) => write!(f, "failed (always): {}", detail),
            TestOutcome::FailedEventuallyTimeout(detail) => write!(f, "failed (eventually timeout): {}", detail),
            TestOutcome::FailedException(err) => write!(f, "failed (exception): {}", err),
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutcomeKind::Passed => "passed",
            OutcomeKind::FailedAlways => "failed_always",
            OutcomeKind::FailedEventuallyTimeout => "failed_eventually_timeout",
            OutcomeKind::FailedException => "failed_exception",
        };
        write!(f, "{}", name)
    }
}
