#![forbid(unsafe_code)]

//! Error types.
//!
//! Layer errors never escape as panics: they are reported through
//! [`LayerEvent::Error`](crate::host::LayerEvent::Error), the fallback
//! background is applied, and the value is returned to the caller for
//! inspection.

use core::fmt;

use crate::color::ColorParseError;

/// Why the motion layer could not be initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerError {
    /// No renderable surface: no document, window or viewport.
    EnvironmentUnavailable(&'static str),
    /// The surface exists but its 2D drawing context could not be obtained.
    ContextAcquisitionFailure(&'static str),
    /// The configuration cannot produce a particle field.
    InvalidConfig(&'static str),
}

impl LayerError {
    /// Stable identifier for host-side reporting.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EnvironmentUnavailable(_) => "environment_unavailable",
            Self::ContextAcquisitionFailure(_) => "context_acquisition_failure",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvironmentUnavailable(msg) => write!(f, "environment unavailable: {msg}"),
            Self::ContextAcquisitionFailure(msg) => {
                write!(f, "drawing context unavailable: {msg}")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for LayerError {}

/// Error loading a [`MotionConfig`](crate::config::MotionConfig) from JSON.
#[derive(Debug)]
pub enum ConfigError {
    /// Malformed JSON or a field of the wrong type.
    Json(serde_json::Error),
    /// A palette entry or fallback color is not a hex color.
    Color(ColorParseError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "config json: {e}"),
            Self::Color(e) => write!(f, "config color: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Color(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<ColorParseError> for ConfigError {
    fn from(e: ColorParseError) -> Self {
        Self::Color(e)
    }
}
