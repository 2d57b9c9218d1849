//! The backend-to-proxy message format.
//!
//! Backend servers talk to the proxy with tiny NUL-delimited messages:
//!
//! ```text
//! "1" 00 "alice" 00 "survival" 00 ...
//!  │        │            │         └── ignored
//!  type  field 1      field 2
//! ```
//!
//! Segment 0 is the message type written as a decimal ASCII integer. The
//! remaining segments depend on the type. There is no length prefix, no
//! checksum and no version field: the plugin-message carrier already
//! delimits messages, and new behaviour gets a new type number.
//!
//! Decoding happens in two steps. [`decode`] only splits the payload and
//! reads the type tag, so it accepts any well-tagged message. Then
//! [`BackendMessage::from_raw`] checks the fields of the types we know and
//! passes unknown types through untouched. An unknown type is never an
//! error; a newer backend must not be able to wedge an older proxy.

use crate::{MigrationRequest, PlayerName, ProtocolError, ServerName};

/// Byte that separates segments.
pub const FIELD_DELIMITER: u8 = 0x00;

/// Message type: "switch player server".
pub const SWITCH_SERVER: i32 = 1;

/// Segment count required by [`SWITCH_SERVER`]: type, username, target.
const SWITCH_SERVER_SEGMENTS: usize = 3;

/// A split payload whose type tag parsed as a number.
///
/// `fields` borrows from the input and excludes segment 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage<'a> {
    pub msg_type: i32,
    pub fields: Vec<&'a [u8]>,
}

impl RawMessage<'_> {
    /// Number of segments in the original payload, type tag included.
    pub fn segment_count(&self) -> usize {
        self.fields.len() + 1
    }
}

/// Splits a raw payload on [`FIELD_DELIMITER`] and parses the type tag.
///
/// An empty payload is one empty segment, and two delimiters in a row give
/// an empty segment between them, so `decode` never loses positions.
///
/// # Errors
/// Returns [`ProtocolError::NotANumber`] if segment 0 is not a decimal
/// integer that fits in an `i32`.
pub fn decode(raw: &[u8]) -> Result<RawMessage<'_>, ProtocolError> {
    let mut segments = raw.split(|b| *b == FIELD_DELIMITER);

    // `split` always yields at least one item, even for an empty slice.
    let tag = segments.next().unwrap_or_default();
    let msg_type = std::str::from_utf8(tag)
        .ok()
        .and_then(|s| s.parse::<i32>().ok())
        .ok_or_else(|| {
            ProtocolError::NotANumber(String::from_utf8_lossy(tag).into_owned())
        })?;

    Ok(RawMessage {
        msg_type,
        fields: segments.collect(),
    })
}

/// Joins a type tag and fields into a payload.
///
/// # Errors
/// Returns [`ProtocolError::DelimiterInField`] if any field contains the
/// delimiter byte. `index` counts segments, so the first field is index 1.
pub fn encode_fields<F: AsRef<[u8]>>(
    msg_type: i32,
    fields: &[F],
) -> Result<Vec<u8>, ProtocolError> {
    let tag = msg_type.to_string();
    let body: usize = fields.iter().map(|f| f.as_ref().len() + 1).sum();
    let mut out = Vec::with_capacity(tag.len() + body);
    out.extend_from_slice(tag.as_bytes());

    for (i, field) in fields.iter().enumerate() {
        let field = field.as_ref();
        if field.contains(&FIELD_DELIMITER) {
            return Err(ProtocolError::DelimiterInField { index: i + 1 });
        }
        out.push(FIELD_DELIMITER);
        out.extend_from_slice(field);
    }

    Ok(out)
}

/// A backend message after type-specific validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMessage {
    /// Type 1: move `username` to the server named `target`.
    SwitchServer(MigrationRequest),

    /// Any type this proxy doesn't understand. Kept so it can be logged,
    /// never acted upon.
    Unknown { msg_type: i32, fields: Vec<Vec<u8>> },
}

impl BackendMessage {
    /// Convenience constructor for a type 1 message.
    pub fn switch_server(
        username: impl Into<PlayerName>,
        target: impl Into<ServerName>,
    ) -> Self {
        Self::SwitchServer(MigrationRequest {
            username: username.into(),
            target: target.into(),
        })
    }

    /// Decodes and validates a raw payload in one go.
    ///
    /// # Errors
    /// Any [`ProtocolError`] from [`decode`] or [`BackendMessage::from_raw`].
    pub fn decode(raw: &[u8]) -> Result<Self, ProtocolError> {
        decode(raw).and_then(Self::from_raw)
    }

    /// Validates the fields of a split payload.
    ///
    /// Extra trailing fields on a known type are ignored.
    ///
    /// # Errors
    /// - [`ProtocolError::MissingFields`] if a known type is too short
    /// - [`ProtocolError::InvalidUtf8`] if a string field isn't UTF-8
    pub fn from_raw(raw: RawMessage<'_>) -> Result<Self, ProtocolError> {
        match raw.msg_type {
            SWITCH_SERVER => {
                if raw.segment_count() < SWITCH_SERVER_SEGMENTS {
                    return Err(ProtocolError::MissingFields {
                        msg_type: SWITCH_SERVER,
                        expected: SWITCH_SERVER_SEGMENTS,
                        actual: raw.segment_count(),
                    });
                }
                let username = utf8_field(&raw, 1)?;
                let target = utf8_field(&raw, 2)?;
                Ok(Self::switch_server(username, target))
            }
            msg_type => Ok(Self::Unknown {
                msg_type,
                fields: raw.fields.iter().map(|f| f.to_vec()).collect(),
            }),
        }
    }

    /// The numeric type tag of this message.
    pub fn msg_type(&self) -> i32 {
        match self {
            Self::SwitchServer(_) => SWITCH_SERVER,
            Self::Unknown { msg_type, .. } => *msg_type,
        }
    }

    /// Encodes the message in the wire format backend servers send.
    ///
    /// # Errors
    /// Returns [`ProtocolError::DelimiterInField`] if a name or field
    /// contains a NUL byte.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        match self {
            Self::SwitchServer(request) => encode_fields(
                SWITCH_SERVER,
                &[request.username.as_str(), request.target.as_str()],
            ),
            Self::Unknown { msg_type, fields } => {
                encode_fields(*msg_type, fields.as_slice())
            }
        }
    }
}

/// Reads segment `index` (1-based, segment 0 is the tag) as UTF-8.
fn utf8_field(raw: &RawMessage<'_>, index: usize) -> Result<String, ProtocolError> {
    let bytes = raw.fields[index - 1];
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| ProtocolError::InvalidUtf8 { index })
}

// =========================================================================
// Tests
// =========================================================================
