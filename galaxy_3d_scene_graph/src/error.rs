//! Error types for the Galaxy3D scene graph
//!
//! This module defines the error types used throughout the scene graph,
//! including lock cancellation, strategy restrictions and handle validation.

use std::fmt;

/// Result type for scene graph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Scene graph errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A blocked lock wait was interrupted. Nothing was acquired and the
    /// operation was not performed.
    Cancelled,

    /// The spatial strategy cannot perform the requested operation
    Unsupported(String),

    /// Missing, stale or foreign reference (node, member, graph)
    InvalidArgument(String),

    /// Lock discipline was broken (re-entrant mutation from a callback, poisoned lock)
    ConsistencyViolation(String),
}

impl Error {
    /// Whether the caller may retry the operation later.
    ///
    /// Cancellation and unsupported operations leave the graph untouched.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Cancelled | Error::Unsupported(_) | Error::InvalidArgument(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Cancelled => write!(f, "Lock acquisition cancelled"),
            Error::Unsupported(msg) => write!(f, "Unsupported for this strategy: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::ConsistencyViolation(msg) => write!(f, "Consistency violation: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Build an [`Error`], log it at ERROR severity with file:line, and evaluate to it.
///
/// # Example
///
/// ```ignore
/// return Err(graph_err!("galaxy3d::SpatialGraph", InvalidArgument, "node {:?} not found", key));
/// ```
#[macro_export]
macro_rules! graph_err {
    ($source:expr, Cancelled) => {{
        $crate::graph_warn!($source, "Lock acquisition cancelled");
        $crate::galaxy3d::Error::Cancelled
    }};
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::graph_error!($source, "{}", message);
        $crate::galaxy3d::Error::$variant(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
