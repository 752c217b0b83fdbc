//! Error types for configuration loading and event serialization.
//!
//! The timing pipeline itself never fails: malformed or missing data only
//! shrinks the assembled event. Errors surface at the edges, where patterns are
//! compiled and where events are serialized for the endpoint.

use thiserror::Error;

/// Errors that can occur around the timing pipeline.
#[derive(Debug, Error)]
pub enum TimingError {
    /// Failed to serialize an event payload
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A broken-browser user-agent pattern did not compile
    #[error("Invalid user-agent pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },
}

/// Result type for timing operations.
pub type TimingResult<T> = Result<T, TimingError>;

/// Failure raised by a vendor paint probe.
///
/// Hosts return this when reading a non-standard facility throws. It never
/// leaves [`crate::PaintSource::detect`].
#[derive(Debug, Error)]
#[error("Paint probe failed: {0}")]
pub struct ProbeError(pub String);
