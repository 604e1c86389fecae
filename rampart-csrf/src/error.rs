use rampart_session::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsrfError {
    /// Missing or unknown driver, or a driver that needs a session was given none
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation the active driver does not implement
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

pub type Result<T> = std::result::Result<T, CsrfError>;
