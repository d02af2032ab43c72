//! Error types and handling for `AqiMap`

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the `AqiMap` application
#[derive(Error, Debug)]
pub enum AqimapError {
    /// Transient network failure that survived the retry budget
    #[error("Network error: {message}")]
    Network { message: String },

    /// Non-transient HTTP failure reported by an upstream API
    #[error("Upstream error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    /// The geocoder returned no usable candidate
    #[error("Location not found: {query}")]
    NotFound { query: String },

    /// Coordinates outside the India bounding box
    #[error("Coordinates ({latitude}, {longitude}) are outside the India bounding box")]
    OutOfBounds { latitude: f64, longitude: f64 },

    /// A successful response was missing a required field
    #[error("Malformed response from {provider}: {message}")]
    MalformedResponse { provider: String, message: String },

    /// User input that cannot form a query
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Serializable discriminant of [`AqimapError`], handed to the presentation
/// layer alongside unavailable sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Upstream,
    NotFound,
    OutOfBounds,
    MalformedResponse,
    InvalidInput,
    Cache,
    Config,
}

impl AqimapError {
    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(query: S) -> Self {
        Self::NotFound {
            query: query.into(),
        }
    }

    #[must_use]
    pub fn out_of_bounds(latitude: f64, longitude: f64) -> Self {
        Self::OutOfBounds {
            latitude,
            longitude,
        }
    }

    /// Create a new malformed-response error
    pub fn malformed<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::MalformedResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid-input error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            AqimapError::Network { .. } => ErrorKind::Network,
            AqimapError::Upstream { .. } => ErrorKind::Upstream,
            AqimapError::NotFound { .. } => ErrorKind::NotFound,
            AqimapError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            AqimapError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            AqimapError::InvalidInput { .. } => ErrorKind::InvalidInput,
            AqimapError::Cache { .. } => ErrorKind::Cache,
            AqimapError::Config { .. } => ErrorKind::Config,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AqimapError::Network { .. } => {
                "Unable to reach the data provider. Please try again shortly.".to_string()
            }
            AqimapError::Upstream { status, .. } => {
                format!("The data provider rejected the request (HTTP {status}).")
            }
            AqimapError::NotFound { query } => {
                format!("No location in India matches '{query}'.")
            }
            AqimapError::OutOfBounds { .. } => {
                "Location is outside India (latitude 6-36, longitude 68-98).".to_string()
            }
            AqimapError::MalformedResponse { provider, .. } => {
                format!("The {provider} data could not be read.")
            }
            AqimapError::InvalidInput { message } => format!("Invalid input: {message}"),
            AqimapError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            AqimapError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
        }
    }
}
