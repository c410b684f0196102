//! Error types for unitgate
//!
//! Every failure reaches the caller as one status code plus one or more
//! human-readable messages, ready for the transport layer to serialize.

use serde::{Deserialize, Serialize};

/// Outcome classes surfaced to the transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
}

impl Status {
    /// Numeric status code for the transport layer
    pub fn code(self) -> u16 {
        match self {
            Status::BadRequest => 400,
            Status::Unauthorized => 401,
            Status::NotFound => 404,
            Status::Conflict => 409,
            Status::Internal => 500,
        }
    }
}

/// The main error type for unitgate operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub status: Status,
    pub messages: Vec<String>,
}

impl ApiError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        ApiError { status, messages: vec![message.into()] }
    }

    /// One error carrying every message a validator collected
    pub fn with_messages(status: Status, messages: Vec<String>) -> Self {
        ApiError { status, messages }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(Status::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(Status::Conflict, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Status::Internal, message)
    }

    pub fn code(&self) -> u16 {
        self.status.code()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status.code(), self.messages.join("; "))
    }
}

impl std::error::Error for ApiError {}

/// Result type alias for unitgate operations
pub type Result<T> = std::result::Result<T, ApiError>;
