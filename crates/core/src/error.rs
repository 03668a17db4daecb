/// Result alias that carries the custom [`WaveScopeError`] type.
pub type Result<T> = std::result::Result<T, WaveScopeError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum WaveScopeError {
    /// Catch-all variant surfacing a readable message to embedders.
    #[error("{0}")]
    Message(String),
    /// The analyser rejected a snapshot size outside the supported set.
    #[error("unsupported analyser size {0}: expected a power of two between 32 and 32768")]
    UnsupportedSize(usize),
    /// The audio graph was asked to remove an edge that does not exist.
    #[error("source is not connected to this tap")]
    NotConnected,
    /// Wrapper around malformed JSON options documents.
    #[error("{0}")]
    Options(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl WaveScopeError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for WaveScopeError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for WaveScopeError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
