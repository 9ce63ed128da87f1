//! Error types for the protocol core.
//!
//! Only link-fatal conditions are represented here. Read timeouts, overlong
//! lines, and undecodable byte sequences are absorbed by the framer and never
//! surface as errors.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing. Fatal to the current link.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote peer closed the connection. Fatal to the current link.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// Failed to parse a received line.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The invalid message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing message lines.
///
/// A line that fails to parse is dropped by callers; these errors never
/// propagate past the dispatch loop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Command token was invalid or missing.
    #[error("invalid command")]
    InvalidCommand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::ConnectionClosed;
        assert_eq!(format!("{}", err), "connection closed by peer");

        let err = ProtocolError::InvalidMessage {
            string: ":prefix-only".to_string(),
            cause: MessageParseError::InvalidCommand,
        };
        assert_eq!(format!("{}", err), "invalid message: :prefix-only");
    }

    #[test]
    fn test_error_source_chaining() {
        let parse_err = MessageParseError::InvalidCommand;
        let protocol_err = ProtocolError::InvalidMessage {
            string: "???".to_string(),
            cause: parse_err.clone(),
        };

        let source = std::error::Error::source(&protocol_err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), parse_err.to_string());
    }

    #[test]
    fn test_error_conversion() {
        let io_err =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let protocol_err: ProtocolError = io_err.into();

        match protocol_err {
            ProtocolError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }
}
