use rampart_csrf::CsrfError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecurityError {
    /// Unreadable configuration or an unsupported filter setting
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    #[error(
        "Object of type \"{type_name}\" could not be converted to string or sanitized as a \
         container. Whitelist it in `whitelistedClasses` to allow it to be passed unchecked."
    )]
    Unsanitizable { type_name: String },

    /// An optional collaborator (such as the HTML cleaner) is not installed
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),

    #[error("Value nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },

    #[error("Invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Csrf(#[from] CsrfError),
}

pub type Result<T> = std::result::Result<T, SecurityError>;
