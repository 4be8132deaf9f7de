//! Mapping store error types

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// Mutation rejected: blank tag identifier
    #[error("tag id cannot be empty")]
    EmptyTag,

    /// Mutation rejected: blank target
    #[error("target cannot be empty")]
    EmptyTarget,

    /// Durable file exists but does not parse as a flat JSON object
    #[error("malformed mapping file '{path}': {message}")]
    Parse { path: String, message: String },

    /// Persist or read failure
    #[error("mapping file I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

pub type MappingResult<T> = Result<T, MappingError>;

impl crate::core::error_handling::ContextualError for MappingError {
    fn is_user_actionable(&self) -> bool {
        match self {
            MappingError::EmptyTag | MappingError::EmptyTarget => true,
            MappingError::Parse { .. } => true, // User can fix the file
            MappingError::Io(_) => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            MappingError::EmptyTag => Some("tag id cannot be empty"),
            MappingError::EmptyTarget => Some("target cannot be empty"),
            MappingError::Parse { message, .. } => Some(message),
            MappingError::Io(_) => None,
        }
    }
}
