//! Error types for the protocol layer.
//!
//! Each crate in Waypoint defines its own error enum. A `ProtocolError`
//! always means the bytes (or an identifier string) were malformed; it never
//! says anything about players, servers, or connections.

/// Errors that can occur while decoding or encoding backend messages.
///
/// Every variant means the message is malformed. The message handler drops
/// it and moves on; none of these is ever fatal to the proxy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Segment 0 of the payload is not a decimal integer.
    ///
    /// Carries a lossy rendering of the offending segment for logs.
    #[error("message type is not a number: {0:?}")]
    NotANumber(String),

    /// A known message type arrived with fewer fields than it needs.
    #[error(
        "message type {msg_type} needs {expected} fields, got {actual}"
    )]
    MissingFields {
        msg_type: i32,
        expected: usize,
        actual: usize,
    },

    /// A string field of a known message type is not valid UTF-8.
    #[error("field {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },

    /// A field passed to the encoder contains the 0x00 delimiter, which
    /// would silently split it into two fields on the other side.
    #[error("field {index} contains the field delimiter")]
    DelimiterInField { index: usize },

    /// A channel identifier is not of the form `namespace:value`.
    #[error("invalid channel identifier: {0:?}")]
    InvalidChannel(String),
}
