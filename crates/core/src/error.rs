use thiserror::Error;

/// Top-level error type used across the workspace.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A required figure could not be read from the OS metrics provider.
    ///
    /// The message carries the underlying reason for logging only; callers
    /// treat every occurrence the same way.
    #[error("metrics unavailable: {0}")]
    MetricsUnavailable(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl NodeError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::MetricsUnavailable(reason.into())
    }
}

pub type Result<T, E = NodeError> = std::result::Result<T, E>;
