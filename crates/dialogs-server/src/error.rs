//! Error types for the dispatch pipeline and the HTTP transport.
//!
//! Every failure the pipeline can observe is a [`DispatchError`]. Each
//! variant belongs to a [`FailureClass`], and the class alone decides the
//! status code written to the client:
//!
//! | Variant | Class | Status |
//! |---|---|---|
//! | `EmptyBody` | `BadRequest` | 400 |
//! | `BodyRead` | `BadRequest` | 400 |
//! | `Decode` | `BadRequest` | 400 |
//! | `Handler` | `Advisory` | 200 |
//! | `Serialization` | `Internal` | 500 |
//! | `Unexpected` | `Internal` | 500 |
//!
//! Advisory errors do not replace the handler's response; they are only
//! reported.

use dialogs_core::CodecError;
use http::StatusCode;
use thiserror::Error;

use crate::handler::BoxError;

/// Classification of a dispatch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    /// The client sent something the pipeline cannot process.
    BadRequest,
    /// The handler reported an error but still produced a response.
    Advisory,
    /// The pipeline itself failed.
    Internal,
}

impl FailureClass {
    /// Returns the HTTP status code written for this class.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Advisory => StatusCode::OK,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A failure observed while handling one webhook call.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The request body was empty.
    #[error("request body is empty")]
    EmptyBody,

    /// The transport failed to read the request body.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The request envelope could not be decoded.
    #[error(transparent)]
    Decode(CodecError),

    /// The skill handler returned an error alongside its response.
    #[error("{0}")]
    Handler(BoxError),

    /// The response envelope could not be serialized.
    #[error(transparent)]
    Serialization(CodecError),

    /// A panic escaped from decoding, the handler or serialization.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl DispatchError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn class(&self) -> FailureClass {
        match self {
            Self::EmptyBody | Self::BodyRead(_) | Self::Decode(_) => FailureClass::BadRequest,
            Self::Handler(_) => FailureClass::Advisory,
            Self::Serialization(_) | Self::Unexpected(_) => FailureClass::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.class().status_code()
    }

    /// Builds an `Unexpected` error from a caught panic payload.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        Self::Unexpected(message)
    }
}

/// Errors raised by the HTTP transport.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listen address is invalid or could not be bound.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_class_status_codes() {
        assert_eq!(FailureClass::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(FailureClass::Advisory.status_code(), StatusCode::OK);
        assert_eq!(
            FailureClass::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_dispatch_error_classes() {
        assert_eq!(DispatchError::EmptyBody.class(), FailureClass::BadRequest);
        assert_eq!(
            DispatchError::BodyRead("reset".to_string()).class(),
            FailureClass::BadRequest
        );
        assert_eq!(
            DispatchError::Handler("test".into()).class(),
            FailureClass::Advisory
        );
        assert_eq!(
            DispatchError::Unexpected("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_handler_error_displays_own_message() {
        let err = DispatchError::Handler("test".into());
        assert_eq!(err.to_string(), "test");
    }

    #[test]
    fn test_decode_error_is_transparent() {
        let codec = dialogs_core::InputData::from_slice(b"not json").unwrap_err();
        let expected = codec.to_string();
        let err = DispatchError::Decode(codec);
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_from_panic_payloads() {
        let err = DispatchError::from_panic(&"test");
        assert_eq!(err.to_string(), "Unexpected error: test");

        let err = DispatchError::from_panic(&String::from("owned"));
        assert_eq!(err.to_string(), "Unexpected error: owned");

        let err = DispatchError::from_panic(&42_u32);
        assert_eq!(err.to_string(), "Unexpected error: Unknown panic");
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError::Bind("address in use".to_string());
        assert!(err.to_string().contains("bind error"));

        let err = ServerError::from(std::io::Error::other("reset"));
        assert!(err.to_string().contains("I/O error"));
    }
}
