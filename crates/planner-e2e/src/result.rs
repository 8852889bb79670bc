//! Result and error types for planner-e2e.

use std::time::Duration;
use thiserror::Error;

/// Result type for planner-e2e operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors that can occur while driving the application under test
#[derive(Debug, Error)]
pub enum E2eError {
    /// A required element never appeared in the page
    #[error("Element {locator} not found within {}ms", timeout.as_millis())]
    NotFound {
        /// Locator that was being resolved
        locator: String,
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// A required element never became visible and enabled
    #[error("Element {locator} not interactable within {}ms", timeout.as_millis())]
    NotInteractable {
        /// Locator that was being resolved
        locator: String,
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// An element handle was used after the page re-rendered
    #[error("Stale element handle {handle}: the page re-rendered")]
    StaleElement {
        /// Opaque id of the stale handle
        handle: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Low-level driver error
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser executable could not be started
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Session acquisition or teardown failed
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// An observed outcome did not match the expected one
    #[error("Assertion failed: {message} (expected: {expected}, actual: {actual})")]
    AssertionFailed {
        /// What was being checked
        message: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    /// Configuration could not be loaded or is incomplete
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl E2eError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an assertion failure with expected/actual values
    #[must_use]
    pub fn assertion(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::AssertionFailed {
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether re-resolving the locator may clear this error
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::StaleElement { .. })
    }

    /// Whether this error came from a timed-out wait
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NotInteractable { .. })
    }
}
