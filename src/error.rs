// src/error.rs

//! Unified error handling for the watcher.
//!
//! Two layers live here: [`AppError`] for anything that can stop an operation
//! (I/O, HTTP, storage, configuration) and [`RowParseError`] for a single table
//! row that could not be understood. Row errors never abort a batch; they are
//! recorded in the batch report and the next row is processed.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Regular expression failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Durable seen-store or checkpoint store failed
    #[error("Store error: {0}")]
    Store(String),

    /// Diff source failed
    #[error("Source error for {context}: {message}")]
    Source { context: String, message: String },

    /// Delivery to a destination failed
    #[error("Delivery to {destination} failed: {message}")]
    Delivery {
        destination: String,
        message: String,
    },

    /// A single row could not be parsed
    #[error("Row error: {0}")]
    Row(#[from] RowParseError),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }

    /// Create a source error with context.
    pub fn source(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Source {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a delivery error for one destination.
    pub fn delivery(destination: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Delivery {
            destination: destination.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error came from the durable store.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// A table row that could not be turned into a candidate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowParseError {
    /// The row has fewer cells than its layout needs
    #[error("row has {found} cells, layout needs at least {required}")]
    TooFewCells { found: usize, required: usize },

    /// The status cell carries no apply link
    #[error("status cell has no apply link")]
    MissingLink,

    /// The posted-date cell is not a month/day pair
    #[error("unparseable posted date '{cell}'")]
    InvalidDate { cell: String },
}
