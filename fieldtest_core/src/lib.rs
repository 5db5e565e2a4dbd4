//! fieldtest Core - Temporal Validation for Simulated Robot Tests
//!
//! This library decides whether a simulated run behaved:
//! 1. **Sequences**: ordered predicates that advance one step per passing tick
//! 2. **Sets**: "always" and "eventually" collections evaluated every tick
//! 3. **Reports**: per-tick verdicts, checked against the set's temporal rule
//!
//! The optional `dashboard` feature adds a terminal display that renders
//! reports live while a test runs.

pub mod region;
pub mod validation;
pub mod engine;
pub mod validations;

#[cfg(feature = "dashboard")]
pub mod dashboard;

// Re-export key types for convenience
pub use region::Region;
pub use validation::{
    frame_channel, FailureDetail, FnValidation, SequenceReport, Validation, ValidationFrame,
    ValidationReport, ValidationSequence, ValidationSequenceSet, ValidationStatus, ValidationType,
    ValidationVerdict,
};
pub use engine::{SequenceEngine, ValidationEngine};
pub use validations::{BallEntersRegion, RobotEntersRegion, RobotStaysInRegion};
