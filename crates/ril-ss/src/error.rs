//! Error types for the USSD transaction layer.

use ril_ss_protocol::ProtocolError;
use thiserror::Error;

/// Errors raised inside the layer.
///
/// None of these reach the caller of a request entry point; they are turned
/// into a failed completion there.
#[derive(Debug, Error)]
pub enum SsError {
    /// Frame could not be built or parsed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The transport refused the message.
    #[error("transport error: {0}")]
    Transport(String),

    /// A request is already pending on this sequence number.
    #[error("sequence number {seq} already has a pending request")]
    DuplicatePending {
        /// The sequence number in use.
        seq: u8,
    },

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// I/O error reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SsError {
    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        SsError::Transport(message.into())
    }
}

/// Result type alias for layer operations.
pub type SsResult<T> = Result<T, SsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SsError::DuplicatePending { seq: 12 };
        assert!(err.to_string().contains("12"));

        let err = SsError::transport("socket closed");
        assert_eq!(err.to_string(), "transport error: socket closed");

        let err: SsError = ProtocolError::PayloadTooLong { max: 189, actual: 200 }.into();
        assert!(matches!(err, SsError::Protocol(_)));
    }
}
