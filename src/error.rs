//! Error types
//!
//! Almost every runtime anomaly in the simulation is recovered locally
//! (substitute normal, skip missing collaborator, ignore duplicate hit).
//! Only contract violations and bad configuration surface here.

use thiserror::Error;

/// Contract violations detected by the simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The ball direction stopped being a finite unit vector
    #[error("ball direction is corrupt: ({x}, {y})")]
    CorruptDirection {
        /// Offending x component
        x: f32,
        /// Offending y component
        y: f32,
    },
}

/// Errors raised while loading or validating tuning.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field is out of its legal range
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
    /// JSON could not be parsed
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    /// Tuning file could not be read
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
}
