//! # Dialogs Core
//!
//! Wire types and the named-entity codec for the Dialogs webhook adapter.
//!
//! This crate provides the foundational types used throughout Dialogs:
//!
//! - [`InputData`] - Decoded request envelope (meta, session, user request, NLU)
//! - [`Entity`] - Named entity with a deferred, lazily decoded value
//! - [`ValueDateTime`] - Date/time entity value with relative-field resolution
//! - [`OutputData`] / [`Response`] / [`Button`] - Response envelope builders
//! - [`CodecError`] - Error type for every decode and accessor failure
//!
//! ## Example
//!
//! ```rust
//! use dialogs_core::InputData;
//!
//! let body = br#"{
//!     "version": "1.0",
//!     "request": {
//!         "original_utterance": "16",
//!         "type": "SimpleUtterance",
//!         "nlu": {
//!             "tokens": ["16"],
//!             "entities": [
//!                 {"tokens": {"start": 0, "end": 1}, "type": "YANDEX.NUMBER", "value": 16}
//!             ]
//!         }
//!     }
//! }"#;
//!
//! let input = InputData::from_slice(body).unwrap();
//! let entity = &input.request.nlu.entities[0];
//! assert_eq!(entity.int_value().unwrap(), 16);
//! assert!(entity.float_value().is_err());
//! ```

#![doc(html_root_url = "https://docs.rs/dialogs-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod datetime;
mod entity;
mod error;
mod request;
mod response;

pub use datetime::ValueDateTime;
pub use entity::{Entity, EntityType, NumberKind, TokenSpan, ValueFio, ValueGeo, ValueKind};
pub use error::{CodecError, CodecResult};
pub use request::{InputData, Markup, Meta, Nlu, Request, RequestType, Session};
pub use response::{Button, OutputData, Response};
