//! Errors raised while laying out or reading USSD frames.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer bytes than the fixed part of the structure.
    #[error("short frame: need {expected} bytes, have {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    /// Encoded payload does not fit in the frame.
    #[error("payload too long: maximum {max} bytes, got {actual}")]
    PayloadTooLong {
        /// Maximum payload the frame can carry.
        max: usize,
        /// Encoded payload length.
        actual: usize,
    },

    /// Input that is not a frame at all, e.g. malformed hex.
    #[error("invalid USSD data: {0}")]
    InvalidData(String),
}

impl ProtocolError {
    pub fn invalid_data(message: impl Into<String>) -> Self {
        ProtocolError::InvalidData(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ProtocolError::PayloadTooLong { max: 189, actual: 263 };
        assert_eq!(err.to_string(), "payload too long: maximum 189 bytes, got 263");

        let err = ProtocolError::FrameTooShort { expected: 3, actual: 1 };
        assert_eq!(err.to_string(), "short frame: need 3 bytes, have 1");

        let err = ProtocolError::invalid_data("bad header");
        assert!(err.to_string().contains("bad header"));
    }
}
