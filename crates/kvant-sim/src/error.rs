//! Error types for the simulation engine.

use thiserror::Error;

/// Errors produced while configuring or running a simulation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// The program failed build-time validation.
    #[error("Program validation failed: {0}")]
    Validation(#[from] kvant_ir::IrError),

    /// Collapse onto a branch with numerically zero probability.
    #[error("Cannot collapse qubit {qubit} onto |{value}⟩: branch probability {probability:e} is numerically zero")]
    DegenerateState {
        /// The measured qubit.
        qubit: u32,
        /// The requested outcome, 0 or 1.
        value: u8,
        /// The branch probability that was found.
        probability: f64,
    },

    /// Internal consistency failure while executing an instruction.
    #[error("Execution error: {0}")]
    Execution(String),

    /// Invalid run configuration or resource request.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A shot failed; completed shots are reported and their counts discarded.
    #[error("Run aborted after {shots_done} completed shots: {source}")]
    RunAborted {
        /// Shots that finished before the failure.
        shots_done: u64,
        /// The failure inside the shot.
        #[source]
        source: Box<SimError>,
    },

    /// The run's cancellation flag was raised between shots.
    #[error("Run cancelled after {shots_done} completed shots")]
    Cancelled {
        /// Shots that finished before cancellation.
        shots_done: u64,
    },

    /// Reading a configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Result or program serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SimError {
    /// Number of shots completed before a run-level failure, if any.
    pub fn shots_done(&self) -> Option<u64> {
        match self {
            SimError::RunAborted { shots_done, .. } | SimError::Cancelled { shots_done } => {
                Some(*shots_done)
            }
            _ => None,
        }
    }
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
