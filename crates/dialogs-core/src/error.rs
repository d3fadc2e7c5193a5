//! Error types for the Dialogs codec.
//!
//! Every fallible codec operation returns [`CodecError`]. The variants keep
//! wire-level failures (a request that cannot be decoded) apart from
//! caller-usage failures (reading an entity with the wrong accessor, or a
//! value payload that does not fit the requested shape):
//!
//! | Variant | Raised by | Typical disposition |
//! |---|---|---|
//! | `UnknownTag` | closed-enum tag parsing | surfaced through `Decode` |
//! | `Decode` | [`InputData::from_slice`](crate::InputData::from_slice) | bad request |
//! | `TypeMismatch` | typed entity accessors | caller decides |
//! | `ValueShape` | typed entity accessors | caller decides |
//! | `UnknownZone` | [`ValueDateTime::resolve`](crate::ValueDateTime::resolve) | caller decides |
//! | `InvalidDateTime` | [`ValueDateTime::resolve`](crate::ValueDateTime::resolve) | caller decides |
//! | `Payload` | [`Request::decode_payload`](crate::Request::decode_payload) | caller decides |
//! | `Encode` | [`OutputData::to_vec`](crate::OutputData::to_vec) | internal failure |

use std::fmt;

use thiserror::Error;

use crate::entity::{EntityType, NumberKind, ValueKind};

/// Result type alias using [`CodecError`].
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors produced while decoding requests, reading entity values or
/// encoding responses.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A closed-enumeration wire tag carried an unrecognized literal.
    #[error("unsupported {field} value: {literal:?}")]
    UnknownTag {
        /// Wire field holding the tag (e.g. `request.type`).
        field: &'static str,
        /// The literal found on the wire.
        literal: String,
    },

    /// The request envelope is malformed or violates the wire schema.
    #[error("failed to decode request: {0}")]
    Decode(#[source] serde_json::Error),

    /// An entity accessor was used on an entity of a different type.
    #[error("cannot read {requested} value from entity of type {actual}{}", NumberSuffix(.number_kind))]
    TypeMismatch {
        /// The value kind the caller asked for.
        requested: ValueKind,
        /// The entity's actual type tag.
        actual: EntityType,
        /// The actual numeric sub-kind, when the entity is a number.
        number_kind: Option<NumberKind>,
    },

    /// The entity's value payload does not fit the requested shape.
    #[error("malformed {requested} value: {source}")]
    ValueShape {
        /// The value kind the caller asked for.
        requested: ValueKind,
        /// The underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// The time-zone identifier is not a known IANA zone.
    #[error("unknown time zone: {0}")]
    UnknownZone(String),

    /// The composed local date/time cannot be represented in the zone.
    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),

    /// The request payload could not be decoded into the requested type.
    #[error("unable to decode request payload: {0}")]
    Payload(#[source] serde_json::Error),

    /// The response envelope could not be serialized.
    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CodecError {
    /// Returns `true` for `TypeMismatch` errors.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Returns `true` for `ValueShape` errors.
    #[must_use]
    pub const fn is_value_shape(&self) -> bool {
        matches!(self, Self::ValueShape { .. })
    }
}

struct NumberSuffix<'a>(&'a Option<NumberKind>);

impl fmt::Display for NumberSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(kind) => write!(f, ", {kind}"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tag_display() {
        let err = CodecError::UnknownTag {
            field: "request.type",
            literal: "VoiceCommand".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported request.type value: \"VoiceCommand\""
        );
    }

    #[test]
    fn test_type_mismatch_display_plain() {
        let err = CodecError::TypeMismatch {
            requested: ValueKind::Geo,
            actual: EntityType::Fio,
            number_kind: None,
        };
        assert_eq!(
            err.to_string(),
            "cannot read geo value from entity of type YANDEX.FIO"
        );
        assert!(err.is_type_mismatch());
        assert!(!err.is_value_shape());
    }

    #[test]
    fn test_type_mismatch_display_names_number_kind() {
        let err = CodecError::TypeMismatch {
            requested: ValueKind::Float,
            actual: EntityType::Number,
            number_kind: Some(NumberKind::Integer),
        };
        assert_eq!(
            err.to_string(),
            "cannot read float value from entity of type YANDEX.NUMBER, integer"
        );
    }

    #[test]
    fn test_unknown_zone_display() {
        let err = CodecError::UnknownZone("Mars/Olympus".to_string());
        assert!(err.to_string().contains("Mars/Olympus"));
    }
}
