//! Error types for codec operations.

use std::fmt;

use crate::protocol::ErrPacket;

/// The primary error type for all codec operations.
#[derive(Debug)]
pub enum Error {
    /// Wire-level protocol violations (unknown tags, truncated packets)
    Protocol(ProtocolError),
    /// Error reported by the server in an ERR packet
    Server(ErrPacket),
    /// Configuration errors
    Config(ConfigError),
    /// A caller-supplied value cannot be encoded or parsed
    InvalidValue(String),
}

/// A violation of the wire format detected while decoding or encoding.
///
/// The packet that raised it can no longer be trusted; the transport should
/// treat the connection as desynchronized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub kind: ProtocolErrorKind,
    /// Absolute byte offset in the backing buffer where the violation was found
    pub offset: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    /// A read would cross the end of the packet
    UnexpectedEof { needed: usize, available: usize },
    /// Length-coded integer tag outside 0x00-0xFE
    InvalidLengthTag(u8),
    /// WKB geometry type tag outside 1-7
    UnknownGeometryType(u32),
    /// Payload larger than a single packet can carry
    PacketTooLarge(usize),
    /// Structurally invalid data
    Malformed,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProtocolError {
    /// Create a protocol error with a message derived from its kind.
    pub fn new(kind: ProtocolErrorKind, offset: usize) -> Self {
        let message = match kind {
            ProtocolErrorKind::UnexpectedEof { needed, available } => {
                format!("unexpected end of packet: needed {needed} bytes, {available} available")
            }
            ProtocolErrorKind::InvalidLengthTag(tag) => {
                format!("invalid length-coded integer tag 0x{tag:02x}")
            }
            ProtocolErrorKind::UnknownGeometryType(tag) => {
                format!("unknown WKB geometry type {tag}")
            }
            ProtocolErrorKind::PacketTooLarge(len) => {
                format!("payload of {len} bytes exceeds the maximum packet size")
            }
            ProtocolErrorKind::Malformed => "malformed packet".to_string(),
        };
        Self::with_message(kind, offset, message)
    }

    /// Create a `Malformed` protocol error with a custom message.
    pub fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::with_message(ProtocolErrorKind::Malformed, offset, message.into())
    }

    fn with_message(kind: ProtocolErrorKind, offset: usize, message: String) -> Self {
        tracing::warn!(offset, kind = ?kind, %message, "protocol violation");
        Self {
            kind,
            offset,
            message,
        }
    }
}

impl Error {
    /// Is this a wire-level violation after which the packet stream is unreliable?
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Byte offset of a protocol violation, if this is one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Protocol(e) => Some(e.offset),
            _ => None,
        }
    }

    /// Get SQLSTATE if available (e.g., "28000" for access denied)
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Error::Server(e) => e.sql_state.as_deref(),
            _ => None,
        }
    }

    /// Server error code, if this error came from an ERR packet.
    pub fn error_code(&self) -> Option<u16> {
        match self {
            Error::Server(e) => Some(e.error_code),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Protocol(e) => write!(f, "Protocol error at offset {}: {}", e.offset, e.message),
            Error::Server(e) => write!(f, "Server error: {}", e),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ProtocolError> for Error {
    fn from(err: ProtocolError) -> Self {
        Error::Protocol(err)
    }
}

impl From<ErrPacket> for Error {
    fn from(err: ErrPacket) -> Self {
        Error::Server(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
