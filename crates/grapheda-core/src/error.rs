//! Centralized error types for GraphEDA.

use std::time::Duration;

use thiserror::Error;

/// Main error type for GraphEDA operations.
///
/// Every payload is owned so the error can be cloned: a failed computation
/// is reported to every caller that was waiting on the same cache key.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphEdaError {
    #[error("Connection config incomplete: missing {}", .missing.join(", "))]
    ConfigIncomplete { missing: Vec<String> },

    #[error("Connection refused by {uri}: {message}")]
    ConnectionRefused { uri: String, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not connected: call connect() first")]
    NotConnected,

    #[error("Connection has been closed")]
    ConnectionClosed,

    #[error("Unknown analysis: {0}")]
    UnknownAnalysis(String),

    #[error("Invalid parameters for '{analysis}': {message}")]
    InvalidParams { analysis: String, message: String },

    #[error("Query failed for '{analysis}': {message}")]
    Query { analysis: String, message: String },

    #[error("Query for '{analysis}' timed out after {timeout:?}")]
    QueryTimeout { analysis: String, timeout: Duration },

    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for GraphEDA operations.
pub type GraphEdaResult<T> = Result<T, GraphEdaError>;

impl GraphEdaError {
    /// Create a query error.
    pub fn query(analysis: impl Into<String>, message: impl ToString) -> Self {
        Self::Query {
            analysis: analysis.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid parameters error.
    pub fn invalid_params(analysis: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            analysis: analysis.into(),
            message: message.into(),
        }
    }

    /// Whether a caller retry may succeed. All analyses are read-only, so
    /// retrying is always safe; only transport trouble is worth it though.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionRefused { .. } | Self::Connection(_) | Self::QueryTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_incomplete_lists_fields() {
        let err = GraphEdaError::ConfigIncomplete {
            missing: vec!["uri".to_string(), "password".to_string()],
        };
        assert_eq!(err.to_string(), "Connection config incomplete: missing uri, password");
    }

    #[test]
    fn test_transient_classification() {
        assert!(GraphEdaError::Connection("reset".into()).is_transient());
        assert!(GraphEdaError::QueryTimeout {
            analysis: "node_count".into(),
            timeout: Duration::from_secs(1),
        }
        .is_transient());
        assert!(!GraphEdaError::UnknownAnalysis("x".into()).is_transient());
        assert!(!GraphEdaError::query("x", "syntax error").is_transient());
    }
}
