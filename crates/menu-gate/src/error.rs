/// Errors that can occur during feature evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// A feature source could not be read.
    #[error("feature source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    /// Plan definitions are invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A feature or plan key is malformed.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

impl GateError {
    /// Create a source error with a name and message.
    pub fn unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
