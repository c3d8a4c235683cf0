/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use thiserror::Error;

// Re-export HeapError from memory module
pub use crate::memory::HeapError;

// Re-export ProcessError from process module
pub use crate::process::ProcessError;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum ConfigError {
    #[error("Heap layout is empty")]
    #[diagnostic(
        code(config::empty_layout),
        help("Provide at least one block size, e.g. SIM_BLOCK_SIZES=450,150,70")
    )]
    EmptyLayout,

    #[error("Block {index} has size 0")]
    #[diagnostic(
        code(config::zero_sized_block),
        help("Every configured block must be at least one unit.")
    )]
    ZeroSizedBlock { index: usize },

    #[error("Step interval must be positive")]
    #[diagnostic(
        code(config::zero_interval),
        help("Set step_interval_ms (or SIM_STEP_INTERVAL_MS) to a value above 0.")
    )]
    ZeroInterval,

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    #[diagnostic(
        code(config::invalid_value),
        help("Check the variable's expected format in the configuration docs.")
    )]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Malformed configuration document: {0}")]
    #[diagnostic(
        code(config::parse_error),
        help("The configuration must be a JSON object with snake_case keys.")
    )]
    Parse(String),

    #[error("Cannot read configuration file {path}: {message}")]
    #[diagnostic(code(config::io_error), help("Check the SIM_CONFIG path and permissions."))]
    Io { path: String, message: String },
}

impl ConfigError {
    pub fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Unified simulation error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum SimulationError {
    #[error("Heap error: {0}")]
    #[diagnostic(
        code(simulation::heap),
        help("The heap and the process table disagree; this is a driver bug.")
    )]
    Heap(#[from] HeapError),

    #[error("Process error: {0}")]
    #[diagnostic(
        code(simulation::process),
        help("Process size and lifetime must both be positive.")
    )]
    Process(#[from] ProcessError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

/// Common result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
