//! Errors raised while talking to the graph proxy

use std::fmt;

use thiserror::Error;

/// Result type for graph proxy operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Which half of a graph was missing from a strictly normalized result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyResultKind {
    /// No vertex-shaped record was found
    Vertices,
    /// No edge-shaped record was found
    Edges,
}

impl fmt::Display for EmptyResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyResultKind::Vertices => write!(f, "No vertices detected"),
            EmptyResultKind::Edges => write!(f, "No edges detected"),
        }
    }
}

/// Errors that can occur when interacting with the graph proxy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The proxy answered with a non-success HTTP status
    #[error("HTTP error status: {status}")]
    HttpStatus {
        /// Status code of the response
        status: u16,
        /// Response body, if any could be read
        body: String,
    },

    /// The response body carried a truthy `error` flag
    #[error("Graph database error: {0}")]
    Application(String),

    /// A strictly normalized query result was missing vertices or edges
    #[error("{0}")]
    EmptyResult(EmptyResultKind),

    /// The request never produced a response (timeout, refused connection)
    #[error("Communication error: {0}")]
    Communication(String),

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// A part of the response the operation depends on was absent
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GraphError {
    /// Whether this error came from a non-success HTTP status
    pub fn is_http_status(&self) -> bool {
        matches!(self, GraphError::HttpStatus { .. })
    }

    /// The HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GraphError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(error: serde_json::Error) -> Self {
        GraphError::Decode(error.to_string())
    }
}
