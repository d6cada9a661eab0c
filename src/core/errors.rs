// src/core/errors.rs

//! Defines the primary error type for the entire application.

use std::num::ParseIntError;
use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing all possible failures within the server.
/// Using `thiserror` allows for clean error definitions and automatic `From`
/// trait implementations.
#[derive(Error, Debug, Clone)]
pub enum GameError {
    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("session is not active")]
    InactiveSession,

    #[error("operation not allowed in the current state: {0}")]
    InvalidState(String),

    #[error("component error: {0}")]
    Component(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for GameError {
    fn from(e: std::io::Error) -> Self {
        GameError::Io(Arc::new(e))
    }
}

impl From<ParseIntError> for GameError {
    fn from(_: ParseIntError) -> Self {
        GameError::InvalidParameter("value is not a valid integer".to_string())
    }
}

impl From<std::string::FromUtf8Error> for GameError {
    fn from(_: std::string::FromUtf8Error) -> Self {
        GameError::Protocol("text is not valid UTF-8".to_string())
    }
}
