//! Named entities and their typed values.
//!
//! An [`Entity`] is decoded in two stages. The envelope decode reads the
//! span and the [`EntityType`] tag but keeps the `value` as its original JSON
//! text. A typed accessor then checks the tag and decodes that text into the
//! concrete shape for the variant:
//!
//! | Tag | Accessor | Value |
//! |---|---|---|
//! | `YANDEX.GEO` | [`Entity::geo_value`] | [`ValueGeo`] |
//! | `YANDEX.FIO` | [`Entity::fio_value`] | [`ValueFio`] |
//! | `YANDEX.NUMBER` | [`Entity::int_value`] / [`Entity::float_value`] | `i64` / `f64` |
//! | `YANDEX.DATETIME` | [`Entity::datetime_value`] | [`ValueDateTime`] |
//!
//! Numbers are classified from the literal text: a literal containing `.`
//! is a float (`16.0` included), anything else is an integer.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::datetime::ValueDateTime;
use crate::error::{CodecError, CodecResult};

/// Type tag of a named entity.
///
/// This is a closed enumeration: every member maps to exactly one wire
/// literal, and any other literal is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    /// `YANDEX.DATETIME`
    DateTime,
    /// `YANDEX.FIO` (first, patronymic and last name)
    Fio,
    /// `YANDEX.GEO`
    Geo,
    /// `YANDEX.NUMBER`
    Number,
}

impl EntityType {
    /// All entity types, in wire-table order.
    pub const ALL: [Self; 4] = [Self::DateTime, Self::Fio, Self::Geo, Self::Number];

    /// Returns the wire literal for this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DateTime => "YANDEX.DATETIME",
            Self::Fio => "YANDEX.FIO",
            Self::Geo => "YANDEX.GEO",
            Self::Number => "YANDEX.NUMBER",
        }
    }
}

impl FromStr for EntityType {
    type Err = CodecError;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        match literal {
            "YANDEX.DATETIME" => Ok(Self::DateTime),
            "YANDEX.FIO" => Ok(Self::Fio),
            "YANDEX.GEO" => Ok(Self::Geo),
            "YANDEX.NUMBER" => Ok(Self::Number),
            _ => Err(CodecError::UnknownTag {
                field: "entity.type",
                literal: literal.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(de::Error::custom)
    }
}

/// Numeric sub-kind of a `YANDEX.NUMBER` entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    /// The literal has no decimal point.
    Integer,
    /// The literal contains a decimal point.
    Float,
}

impl NumberKind {
    /// Classifies a JSON number literal by its text.
    #[must_use]
    pub fn of_literal(literal: &str) -> Self {
        if literal.contains('.') {
            Self::Float
        } else {
            Self::Integer
        }
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
        }
    }
}

/// The value shape a caller asks an entity for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`ValueGeo`]
    Geo,
    /// [`ValueFio`]
    Fio,
    /// Integer `YANDEX.NUMBER`
    Integer,
    /// Floating-point `YANDEX.NUMBER`
    Float,
    /// [`ValueDateTime`]
    DateTime,
}

impl ValueKind {
    /// Returns the entity type that carries this kind of value.
    #[must_use]
    pub const fn entity_type(self) -> EntityType {
        match self {
            Self::Geo => EntityType::Geo,
            Self::Fio => EntityType::Fio,
            Self::Integer | Self::Float => EntityType::Number,
            Self::DateTime => EntityType::DateTime,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Geo => "geo",
            Self::Fio => "fio",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::DateTime => "date/time",
        })
    }
}

/// Half-open token index span `[start, end)` of an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSpan {
    /// Index of the first token.
    #[serde(default)]
    pub start: usize,
    /// Index one past the last token.
    #[serde(default)]
    pub end: usize,
}

impl TokenSpan {
    /// Creates a span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the span as a range.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Value of a `YANDEX.GEO` entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueGeo {
    /// Country name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// City name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Street name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// House number, as spoken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    /// Airport name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport: Option<String>,
}

/// Value of a `YANDEX.FIO` entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueFio {
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Patronymic name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patronymic_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// A named entity recognized in the user's utterance.
///
/// The value is held as raw JSON until one of the typed accessors is
/// called. Accessors fail with [`CodecError::TypeMismatch`] when the tag
/// does not match and with [`CodecError::ValueShape`] when the payload does
/// not fit the requested shape.
///
/// # Example
///
/// ```
/// use dialogs_core::{Entity, EntityType, TokenSpan};
///
/// let entity = Entity::new(EntityType::Number, TokenSpan::new(0, 1), "5.5").unwrap();
/// assert!(entity.is_float());
/// assert_eq!(entity.float_value().unwrap(), 5.5);
///
/// let err = entity.int_value().unwrap_err();
/// assert!(err.to_string().ends_with("float"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Token span covered by the entity.
    #[serde(default)]
    pub tokens: TokenSpan,

    /// Entity type tag. Required: an entity without one has no readable value.
    #[serde(rename = "type")]
    pub kind: EntityType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Box<RawValue>>,
}

impl Entity {
    /// Creates an entity from a raw JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if `raw_value` is not valid JSON.
    pub fn new(
        kind: EntityType,
        tokens: TokenSpan,
        raw_value: impl Into<String>,
    ) -> CodecResult<Self> {
        let value = RawValue::from_string(raw_value.into()).map_err(CodecError::Decode)?;
        Ok(Self {
            tokens,
            kind,
            value: Some(value),
        })
    }

    /// Returns the undecoded value text (`null` when the value is absent).
    #[must_use]
    pub fn raw_value(&self) -> &str {
        self.value.as_deref().map_or("null", RawValue::get)
    }

    /// Returns the numeric sub-kind, or `None` for non-number entities.
    #[must_use]
    pub fn number_kind(&self) -> Option<NumberKind> {
        (self.kind == EntityType::Number).then(|| NumberKind::of_literal(self.raw_value()))
    }

    /// Returns `true` if the entity is `YANDEX.GEO`.
    #[must_use]
    pub fn is_geo(&self) -> bool {
        self.kind == EntityType::Geo
    }

    /// Returns `true` if the entity is `YANDEX.FIO`.
    #[must_use]
    pub fn is_fio(&self) -> bool {
        self.kind == EntityType::Fio
    }

    /// Returns `true` if the entity is an integer `YANDEX.NUMBER`.
    #[must_use]
    pub fn is_int(&self) -> bool {
        self.number_kind() == Some(NumberKind::Integer)
    }

    /// Returns `true` if the entity is a floating-point `YANDEX.NUMBER`.
    #[must_use]
    pub fn is_float(&self) -> bool {
        self.number_kind() == Some(NumberKind::Float)
    }

    /// Returns `true` if the entity is `YANDEX.DATETIME`.
    #[must_use]
    pub fn is_datetime(&self) -> bool {
        self.kind == EntityType::DateTime
    }

    /// Decodes the value of a `YANDEX.GEO` entity.
    pub fn geo_value(&self) -> CodecResult<ValueGeo> {
        self.typed_value(ValueKind::Geo)
    }

    /// Decodes the value of a `YANDEX.FIO` entity.
    pub fn fio_value(&self) -> CodecResult<ValueFio> {
        self.typed_value(ValueKind::Fio)
    }

    /// Decodes the value of an integer `YANDEX.NUMBER` entity.
    pub fn int_value(&self) -> CodecResult<i64> {
        self.typed_value(ValueKind::Integer)
    }

    /// Decodes the value of a floating-point `YANDEX.NUMBER` entity.
    pub fn float_value(&self) -> CodecResult<f64> {
        self.typed_value(ValueKind::Float)
    }

    /// Decodes the value of a `YANDEX.DATETIME` entity.
    pub fn datetime_value(&self) -> CodecResult<ValueDateTime> {
        self.typed_value(ValueKind::DateTime)
    }

    fn typed_value<T: DeserializeOwned>(&self, requested: ValueKind) -> CodecResult<T> {
        self.ensure_kind(requested)?;
        serde_json::from_str(self.raw_value())
            .map_err(|source| CodecError::ValueShape { requested, source })
    }

    fn ensure_kind(&self, requested: ValueKind) -> CodecResult<()> {
        let matches = match requested {
            ValueKind::Integer => self.is_int(),
            ValueKind::Float => self.is_float(),
            other => self.kind == other.entity_type(),
        };
        if matches {
            return Ok(());
        }

        // The sub-kind is only worth naming when a number accessor was used.
        let number_kind = match requested {
            ValueKind::Integer | ValueKind::Float => self.number_kind(),
            _ => None,
        };
        Err(CodecError::TypeMismatch {
            requested,
            actual: self.kind,
            number_kind,
        })
    }
}
