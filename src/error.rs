//! Error types and handling for Ampswitch
//!
//! The decision logic itself never fails; errors only come out of
//! configuration loading and the hardware/presentation adapters.

use thiserror::Error;

/// Result type alias for Ampswitch operations
pub type Result<T> = std::result::Result<T, AmpswitchError>;

/// Main error type for Ampswitch
#[derive(Debug, Error)]
pub enum AmpswitchError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Charge-level or availability read failed
    #[error("Sensor error: {message}")]
    Sensor { message: String },

    /// Relay command could not be applied
    #[error("Actuator error: {message}")]
    Actuator { message: String },

    /// Presentation collaborator rejected a directive
    #[error("Display error: {message}")]
    Display { message: String },

    /// Event queue closed
    #[error("Channel error: {message}")]
    Channel { message: String },
}

impl AmpswitchError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create a new sensor error
    pub fn sensor<S: Into<String>>(message: S) -> Self {
        Self::Sensor {
            message: message.into(),
        }
    }

    /// Create a new actuator error
    pub fn actuator<S: Into<String>>(message: S) -> Self {
        Self::Actuator {
            message: message.into(),
        }
    }

    /// Create a new display error
    pub fn display<S: Into<String>>(message: S) -> Self {
        Self::Display {
            message: message.into(),
        }
    }

    /// Create a new channel error
    pub fn channel<S: Into<String>>(message: S) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for AmpswitchError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for AmpswitchError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AmpswitchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
