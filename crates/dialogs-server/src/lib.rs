//! # Dialogs Server
//!
//! Webhook dispatch pipeline and HTTP transport for the Dialogs adapter.
//!
//! - [`Dispatcher`] - Turns a raw request body into a response: decoding,
//!   ping and flagged-content interception, handler delegation, panic
//!   isolation and serialization
//! - [`Server`] - HTTP/1.1 transport over Hyper with graceful shutdown
//! - [`DispatchError`] / [`FailureClass`] - Failure taxonomy and status codes
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use dialogs_core::{Button, InputData, OutputData, Response};
//! use dialogs_server::Dispatcher;
//!
//! # tokio_test::block_on(async {
//! let dispatcher = Dispatcher::new(|input: InputData| async move {
//!     let response = Response::new("Pick one", "", false)
//!         .with_button(Button::new("Pizza").hide(true))
//!         .with_button(Button::new("Sushi").hide(true));
//!     OutputData::new(&input, response)
//! })
//! .error_sink(|error| eprintln!("skill error: {error}"));
//!
//! let ping = br#"{"request": {"original_utterance": "ping"}}"#;
//! let response = dispatcher.dispatch(Bytes::from_static(ping)).await;
//! assert_eq!(response.status(), 200);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/dialogs-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handler;
pub mod pipeline;
pub mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use error::{DispatchError, FailureClass, ServerError};
pub use handler::{skill_handler, BoxError, ErasedSkillHandler, HandlerOutput};
pub use pipeline::{
    DispatchOptions, Dispatcher, ErrorSink, HttpResponse, DANGEROUS_CONTEXT_TEXT, PONG_TEXT,
};
pub use server::Server;
pub use shutdown::{InFlight, InFlightGuard, ShutdownSignal};
