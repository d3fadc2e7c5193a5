//! Request envelope types.
//!
//! Every field of the envelope is optional on the wire and falls back to its
//! zero value, so `{}` decodes into an empty [`InputData`]. The two
//! closed-enumeration tags ([`RequestType`] and
//! [`EntityType`](crate::EntityType)) are the exception to leniency: an
//! unrecognized literal fails the whole decode.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::entity::Entity;
use crate::error::{CodecError, CodecResult};

/// Utterance the platform sends as a health check.
pub const PING_UTTERANCE: &str = "ping";

/// Decoded webhook request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputData {
    /// Protocol version.
    #[serde(default)]
    pub version: String,

    /// Device and locale metadata.
    #[serde(default)]
    pub meta: Meta,

    /// Session descriptor, echoed back in the response.
    #[serde(default)]
    pub session: Session,

    /// The user request.
    #[serde(default)]
    pub request: Request,
}

impl InputData {
    /// Decodes a request envelope from raw JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the body is not valid JSON, does not
    /// match the envelope schema, or carries an unknown tag literal.
    ///
    /// # Example
    ///
    /// ```
    /// use dialogs_core::{InputData, RequestType};
    ///
    /// let input = InputData::from_slice(br#"{"request": {"type": "ButtonPressed"}}"#).unwrap();
    /// assert_eq!(input.request.kind, RequestType::ButtonPressed);
    ///
    /// assert!(InputData::from_slice(br#"{"request": {"type": "Shout"}}"#).is_err());
    /// ```
    pub fn from_slice(body: &[u8]) -> CodecResult<Self> {
        serde_json::from_slice(body).map_err(CodecError::Decode)
    }
}

/// Request metadata. Carried through without interpretation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Locale, e.g. `ru-RU`.
    #[serde(default)]
    pub locale: String,
    /// IANA time zone of the user, e.g. `Europe/Moscow`.
    #[serde(default)]
    pub timezone: String,
    /// Client application identifier.
    #[serde(default)]
    pub client_id: String,
    /// Client interface capabilities.
    #[serde(default)]
    pub interfaces: Value,
}

/// Session identity and sequencing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Whether this message opens a new session.
    #[serde(default)]
    pub new: bool,
    /// Message sequence number within the session.
    #[serde(default)]
    pub message_id: u64,
    /// Session identifier.
    #[serde(default)]
    pub session_id: String,
    /// Skill identifier.
    #[serde(default)]
    pub skill_id: String,
    /// User identifier.
    #[serde(default)]
    pub user_id: String,
}

/// Kind of user request.
///
/// Closed enumeration; see [`EntityType`](crate::EntityType) for the same
/// treatment of entity tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// `SimpleUtterance`: free-form speech or text.
    #[default]
    SimpleUtterance,
    /// `ButtonPressed`: the user pressed a response button.
    ButtonPressed,
}

impl RequestType {
    /// Returns the wire literal for this request type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SimpleUtterance => "SimpleUtterance",
            Self::ButtonPressed => "ButtonPressed",
        }
    }
}

impl FromStr for RequestType {
    type Err = CodecError;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        match literal {
            "SimpleUtterance" => Ok(Self::SimpleUtterance),
            "ButtonPressed" => Ok(Self::ButtonPressed),
            _ => Err(CodecError::UnknownTag {
                field: "request.type",
                literal: literal.to_string(),
            }),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RequestType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RequestType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(de::Error::custom)
    }
}

/// Markup flags attached to a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    /// The platform flagged the utterance as touching a sensitive topic.
    #[serde(default)]
    pub dangerous_context: bool,
}

/// Tokens and named entities recognized in the utterance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nlu {
    /// Word tokens, in utterance order.
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Named entities, each referencing a span of `tokens`.
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl Nlu {
    /// Returns the tokens covered by `entity`, or `None` if its span does not
    /// fit the token list.
    ///
    /// Spans are not checked when the request is decoded.
    #[must_use]
    pub fn entity_tokens(&self, entity: &Entity) -> Option<&[String]> {
        self.tokens.get(entity.tokens.range())
    }
}

/// The user request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Request {
    /// Normalized command text.
    #[serde(default)]
    pub command: String,

    /// Raw utterance text.
    #[serde(default)]
    pub original_utterance: String,

    /// Request kind.
    #[serde(default, rename = "type")]
    pub kind: RequestType,

    /// Markup flags.
    #[serde(default)]
    pub markup: Markup,

    /// Handler-defined button payload (button presses only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// NLU result.
    #[serde(default)]
    pub nlu: Nlu,
}

impl Request {
    /// Returns `true` if this is the platform's health-check ping.
    #[must_use]
    pub fn is_ping(&self) -> bool {
        self.original_utterance == PING_UTTERANCE
    }

    /// Returns `true` if the platform flagged the content as dangerous.
    #[must_use]
    pub const fn is_dangerous(&self) -> bool {
        self.markup.dangerous_context
    }

    /// Decodes the button payload into `T`.
    ///
    /// An absent payload is decoded as JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Payload`] if the payload does not fit `T`.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> CodecResult<T> {
        let payload = self.payload.as_ref().unwrap_or(&Value::Null);
        T::deserialize(payload).map_err(CodecError::Payload)
    }
}
