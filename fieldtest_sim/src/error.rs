//! Error types for test orchestration.

use fieldtest_env::EnvError;
use thiserror::Error;

/// Failures that end a run without a validation verdict.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TestError {
    /// Invalid timeout/tick-duration combination, raised before any tick
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Tick publication or world hand-off failed; never retried
    #[error("Transport failure: {0}")]
    Transport(#[from] EnvError),

    /// The orchestrator panicked
    #[error("Orchestrator panicked: {0}")]
    BackgroundPanic(String),

    /// A background thread could not be started
    #[error("Failed to spawn thread: {0}")]
    Spawn(String),
}

impl TestError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Builds a panic error from a caught panic payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::BackgroundPanic(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_messages() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(
            TestError::from_panic(boxed.as_ref()),
            TestError::BackgroundPanic("static message".to_string())
        );

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(
            TestError::from_panic(boxed.as_ref()),
            TestError::BackgroundPanic("owned".to_string())
        );

        let boxed: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert!(matches!(TestError::from_panic(boxed.as_ref()), TestError::BackgroundPanic(_)));
    }

    #[test]
    fn test_transport_from_env_error() {
        let err: TestError = EnvError::closed("gone").into();
        assert!(err.to_string().contains("Transport failure"));
    }
}
