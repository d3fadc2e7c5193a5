//! Skill handler contract.
//!
//! A skill handler is an async function from a decoded [`InputData`] to a
//! response. It may also report an error alongside the response; the error is
//! logged and passed to the error sink, but the response is still delivered.
//!
//! Handlers can return any type convertible into [`HandlerOutput`]:
//!
//! - [`OutputData`] for a plain response
//! - `(OutputData, Option<BoxError>)` for a response with an optional error
//! - [`HandlerOutput`] itself
//!
//! # Example
//!
//! ```rust
//! use dialogs_core::{InputData, OutputData, Response};
//! use dialogs_server::handler::skill_handler;
//!
//! let handler = skill_handler(|input: InputData| async move {
//!     let text = format!("You said: {}", input.request.command);
//!     OutputData::new(&input, Response::new(text, "", false))
//! });
//! # let _ = handler;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dialogs_core::{InputData, OutputData};

/// Boxed error a handler can report alongside its response.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for a boxed handler future.
pub type BoxedHandlerFuture = Pin<Box<dyn Future<Output = HandlerOutput> + Send>>;

/// A type-erased skill handler.
pub type ErasedSkillHandler = Arc<dyn Fn(InputData) -> BoxedHandlerFuture + Send + Sync>;

/// What a skill handler produced for one call.
#[derive(Debug)]
pub struct HandlerOutput {
    /// The response to deliver. Always present, even with an error.
    pub output: OutputData,
    /// An optional error to report.
    pub error: Option<BoxError>,
}

impl HandlerOutput {
    /// A response with no error.
    #[must_use]
    pub fn ok(output: OutputData) -> Self {
        Self {
            output,
            error: None,
        }
    }

    /// A response accompanied by an error.
    #[must_use]
    pub fn with_error(output: OutputData, error: impl Into<BoxError>) -> Self {
        Self {
            output,
            error: Some(error.into()),
        }
    }
}

impl From<OutputData> for HandlerOutput {
    fn from(output: OutputData) -> Self {
        Self::ok(output)
    }
}

impl From<(OutputData, Option<BoxError>)> for HandlerOutput {
    fn from((output, error): (OutputData, Option<BoxError>)) -> Self {
        Self { output, error }
    }
}

/// Wraps an async function into an [`ErasedSkillHandler`].
pub fn skill_handler<F, Fut, R>(handler: F) -> ErasedSkillHandler
where
    F: Fn(InputData) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<HandlerOutput>,
{
    let handler = Arc::new(handler);
    Arc::new(move |input: InputData| {
        let handler = Arc::clone(&handler);
        let future: BoxedHandlerFuture =
            Box::pin(async move { Into::<HandlerOutput>::into(handler(input).await) });
        future
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogs_core::Response;

    fn output(text: &str) -> OutputData {
        OutputData::new(&InputData::default(), Response::new(text, "", false))
    }

    #[tokio::test]
    async fn test_plain_output_handler() {
        let handler = skill_handler(|input: InputData| async move {
            OutputData::new(&input, Response::new("hello", "", true))
        });

        let result = handler(InputData::default()).await;
        assert_eq!(result.output.response.text, "hello");
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_tuple_output_handler() {
        let handler = skill_handler(|_input: InputData| async move {
            let error: BoxError = "test".into();
            (output("partial"), Some(error))
        });

        let result = handler(InputData::default()).await;
        assert_eq!(result.output.response.text, "partial");
        assert_eq!(result.error.unwrap().to_string(), "test");
    }

    #[test]
    fn test_handler_output_constructors() {
        let ok = HandlerOutput::ok(output("a"));
        assert!(ok.error.is_none());

        let failed = HandlerOutput::with_error(output("b"), "broken");
        assert_eq!(failed.error.unwrap().to_string(), "broken");

        let converted: HandlerOutput = (output("c"), None).into();
        assert_eq!(converted.output.response.tts, "c");
    }
}
