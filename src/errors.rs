//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing, validation, or credential lookup failure.
    Config(String),
    /// Backend API transport failure or unexpected response status.
    Api(String),
    /// Backend rejected the credentials or the caller lacks permission.
    Unauthorized(String),
    /// An explicit app, user, permission, or request ID did not resolve.
    NotFound(String),
    /// Selection violates app/permission constraints.
    Validation(String),
    /// A request disappeared while it was being polled or inspected.
    RequestVanished(String),
    /// Operator input could not be read or was exhausted.
    Prompt(String),
    /// File-system or terminal I/O failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Api(msg) => write!(f, "api: {msg}"),
            Self::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::RequestVanished(msg) => write!(f, "request vanished: {msg}"),
            Self::Prompt(msg) => write!(f, "prompt: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Api(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Api(format!("unexpected response body: {err}"))
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
