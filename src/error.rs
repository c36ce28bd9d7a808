//! Error types for the h2o operator
//!
//! Errors are structured with fields to aid debugging in production.
//! Each variant carries contextual information such as the hook tool that
//! failed or whether the failure is worth redelivering the event for.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for operator operations
#[derive(Debug, Error)]
pub enum Error {
    /// Pebble API error (connectivity, bad response, rejected request)
    #[error("pebble error: {message}")]
    Pebble {
        /// Description of what failed
        message: String,
        /// Whether the failure is transient (connectivity, timeout)
        retryable: bool,
    },

    /// Hook-tool invocation error (spawn failure, nonzero exit)
    #[error("hook tool error [{tool}]: {message}")]
    Hook {
        /// The hook tool that failed (e.g. "config-get", "status-set")
        tool: String,
        /// Description of what failed
        message: String,
    },

    /// Ingress relation databag error
    #[error("relation error: {message}")]
    Relation {
        /// Description of what failed
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// What was being serialized (if known)
        what: Option<String>,
    },

    /// Remote fetch error for the pull-example-site action
    #[error("fetch error for {url}: {message}")]
    Fetch {
        /// The URL that was being fetched
        url: String,
        /// Description of what failed
        message: String,
    },

    /// Local filesystem I/O error
    #[error("io error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Context where the error occurred (e.g. "dispatch", "controller")
        context: String,
    },
}

impl Error {
    /// Create a retryable Pebble error
    pub fn pebble(msg: impl Into<String>) -> Self {
        Self::Pebble {
            message: msg.into(),
            retryable: true,
        }
    }

    /// Create a non-retryable Pebble error (e.g. a rejected request)
    pub fn pebble_permanent(msg: impl Into<String>) -> Self {
        Self::Pebble {
            message: msg.into(),
            retryable: false,
        }
    }

    /// Create a hook-tool error for the given tool
    pub fn hook(tool: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Hook {
            tool: tool.into(),
            message: msg.into(),
        }
    }

    /// Create a relation error with the given message
    pub fn relation(msg: impl Into<String>) -> Self {
        Self::Relation {
            message: msg.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            what: None,
        }
    }

    /// Create a serialization error naming what was being serialized
    pub fn serialization_of(what: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            what: Some(what.into()),
        }
    }

    /// Create a fetch error for the given URL
    pub fn fetch(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error with the given message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: UNKNOWN_CONTEXT.to_string(),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Check if this error is retryable
    ///
    /// Serialization errors are not retryable (they indicate a code or
    /// config-shape bug). Connectivity-class failures are: the platform
    /// redelivers the event and the full render is repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Pebble { retryable, .. } => *retryable,
            Error::Hook { .. } => true,
            Error::Relation { .. } => true,
            Error::Serialization { .. } => false,
            Error::Fetch { .. } => true,
            Error::Io { .. } => true,
            Error::Internal { .. } => true,
        }
    }

    /// Get the hook tool name if this error came from a hook tool
    pub fn tool(&self) -> Option<&str> {
        match self {
            Error::Hook { tool, .. } => Some(tool),
            _ => None,
        }
    }
}
