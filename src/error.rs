//!
//! # Error Handling
//!
//! This module defines `AppError`, the single error type returned by every
//! fallible operation in the client: input validation, HTTP calls to the
//! TaskForge API, session storage and configuration.
//!
//! Non-2xx responses are carried as a [`RemoteError`]. The server controls the
//! body shape of those responses, so `RemoteError::message` normalizes whatever
//! arrived into one human-readable line. The order it tries is part of the
//! contract:
//!
//! 1. a JSON object with an `error` field (strings as-is, other values as JSON);
//! 2. a JSON string payload, or a non-empty plain-text body;
//! 3. any other non-null JSON payload, serialized compactly;
//! 4. `"Request failed with status code <status>"`.

use serde_json::Value;
use std::fmt;
use validator::ValidationErrors;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;

/// Represents all possible errors that can occur within the client.
#[derive(Debug)]
pub enum AppError {
    /// A client-side field check failed. The request never reached the network.
    Validation(String),
    /// The API answered with a non-2xx status.
    Remote(RemoteError),
    /// No response was received (connection refused, DNS failure, timeout).
    Transport(String),
    /// The API answered 2xx but the body was not what the endpoint promises.
    InvalidResponse(String),
    /// Reading or writing the persisted session failed.
    Storage(String),
    /// A configuration value could not be parsed.
    Config(String),
}

impl AppError {
    /// The text a view should show for this error.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Remote(remote) => remote.message(),
            AppError::Validation(msg)
            | AppError::Transport(msg)
            | AppError::InvalidResponse(msg)
            | AppError::Storage(msg)
            | AppError::Config(msg) => msg.clone(),
        }
    }

    /// HTTP status of a remote failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Remote(remote) => Some(remote.status),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Remote(remote) => write!(f, "Remote Error: {}", remote),
            AppError::Transport(msg) => write!(f, "Transport Error: {}", msg),
            AppError::InvalidResponse(msg) => write!(f, "Invalid Response: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Body of a non-2xx response, kept in the shape it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum RemotePayload {
    Json(Value),
    Text(String),
}

impl RemotePayload {
    /// Parses a response body: JSON when it parses, raw text otherwise.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => RemotePayload::Json(value),
            Err(_) => RemotePayload::Text(body.to_string()),
        }
    }
}

/// A failed HTTP exchange: the status code and whatever the server sent back.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
    pub status: u16,
    pub payload: RemotePayload,
}

impl RemoteError {
    pub fn new(status: u16, payload: RemotePayload) -> Self {
        Self { status, payload }
    }

    /// Best-effort human-readable message. See the module docs for the order.
    pub fn message(&self) -> String {
        if let RemotePayload::Json(Value::Object(map)) = &self.payload {
            match map.get("error") {
                Some(Value::String(msg)) if !msg.is_empty() => return msg.clone(),
                Some(Value::Null) | Some(Value::String(_)) | None => {}
                Some(other) => return other.to_string(),
            }
        }

        match &self.payload {
            RemotePayload::Json(Value::String(text)) | RemotePayload::Text(text)
                if !text.trim().is_empty() =>
            {
                return text.clone();
            }
            RemotePayload::Json(value) if !value.is_null() && !value.is_string() => {
                return value.to_string();
            }
            _ => {}
        }

        format!("Request failed with status code {}", self.status)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (status {})", self.message(), self.status)
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Converts `reqwest::Error` into `AppError`.
///
/// Body decoding failures mean the server answered, so they become
/// `InvalidResponse`; everything else means no usable response arrived.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> AppError {
        if error.is_decode() {
            AppError::InvalidResponse(error.to_string())
        } else {
            AppError::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> AppError {
        AppError::InvalidResponse(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> AppError {
        AppError::Storage(error.to_string())
    }
}
