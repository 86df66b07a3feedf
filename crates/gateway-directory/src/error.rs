//! Error types for gateway-directory.

use thiserror::Error;

/// Result type for directory operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while exchanging or applying gateway status.
///
/// Duplicate registrations and unknown peers are not errors: those surface as
/// `false` returns or empty query results.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// An encoded node status was truncated or internally inconsistent.
    #[error("malformed node status: {0}")]
    MalformedStatus(String),

    /// An encoded node status exceeded the configured size limit.
    #[error("node status of {size} bytes exceeds limit of {limit} bytes")]
    StatusTooLarge {
        /// Size of the rejected payload.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A status-sync packet could not be parsed.
    #[error("malformed status packet: {0}")]
    MalformedPacket(String),

    /// The transport failed to deliver a packet.
    #[error("transport error: {0}")]
    Transport(String),
}
