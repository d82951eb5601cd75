use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Returned by a queue operation that cannot proceed because the caller's
/// work flag is down or the queue was closed. This is the shutdown signal,
/// not a failure: work loops stop on it and never retry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("queue operation interrupted by stage shutdown")]
pub struct Interrupted;

/// Errors that can occur while building or driving a pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No stages in pipeline
    #[error("Cannot build a pipeline with no stages")]
    NoStages,

    /// Worker thread could not be spawned, or panicked
    #[error("Thread error: {0}")]
    ThreadError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A source item that could not be parsed. Recovered inside the source stage.
    #[error("Malformed input at argument {position}: {reason}")]
    MalformedInput { position: usize, reason: String },

    /// Sink I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
