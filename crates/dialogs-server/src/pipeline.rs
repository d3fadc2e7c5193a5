//! Webhook dispatch pipeline.
//!
//! [`Dispatcher::dispatch`] turns one raw request body into one HTTP
//! response. The steps run in a fixed order and every branch ends in a
//! response:
//!
//! 1. Reject an empty body (400) without decoding.
//! 2. Decode the envelope (400 on failure).
//! 3. Answer a health-check ping with `pong`, if enabled.
//! 4. Answer flagged content with a fixed rephrase prompt, if enabled.
//! 5. Otherwise invoke the skill handler once. An error it reports is
//!    logged and passed to the error sink, and its response is still sent.
//! 6. Serialize the response envelope (500 on failure).
//!
//! A panic anywhere in steps 2-6 is caught and answered with 500.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use dialogs_core::{InputData, OutputData, Response as SkillResponse};
use futures_util::FutureExt;
use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};
use http_body_util::Full;

use crate::error::{DispatchError, FailureClass};
use crate::handler::{skill_handler, ErasedSkillHandler, HandlerOutput};

/// Text of the automatic answer to a health-check ping.
pub const PONG_TEXT: &str = "pong";

/// Text of the automatic answer to flagged content.
pub const DANGEROUS_CONTEXT_TEXT: &str =
    "Не понимаю, о чем вы. Пожалуйста, переформулируйте вопрос.";

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Callback receiving every reported dispatch failure.
pub type ErrorSink = Arc<dyn Fn(&DispatchError) + Send + Sync>;

/// Interception switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Answer `ping` utterances without calling the handler.
    pub auto_ping: bool,
    /// Answer flagged content without calling the handler.
    pub auto_dangerous_context: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            auto_ping: true,
            auto_dangerous_context: true,
        }
    }
}

/// Routes decoded requests to interceptors or the skill handler.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use dialogs_core::{InputData, OutputData, Response};
/// use dialogs_server::Dispatcher;
///
/// # tokio_test::block_on(async {
/// let dispatcher = Dispatcher::new(|input: InputData| async move {
///     OutputData::new(&input, Response::new("hi", "", false))
/// });
///
/// let response = dispatcher.dispatch(Bytes::from_static(b"{}")).await;
/// assert_eq!(response.status(), 200);
/// # });
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    handler: ErasedSkillHandler,
    options: DispatchOptions,
    sink: Option<ErrorSink>,
}

impl Dispatcher {
    /// Creates a dispatcher around an async handler, with both interceptors
    /// enabled and no error sink.
    pub fn new<F, Fut, R>(handler: F) -> Self
    where
        F: Fn(InputData) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = R> + Send + 'static,
        R: Into<HandlerOutput>,
    {
        Self::from_erased(skill_handler(handler))
    }

    /// Creates a dispatcher around an already type-erased handler.
    #[must_use]
    pub fn from_erased(handler: ErasedSkillHandler) -> Self {
        Self {
            handler,
            options: DispatchOptions::default(),
            sink: None,
        }
    }

    /// Replaces the interception switches.
    #[must_use]
    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables or disables the automatic ping answer.
    #[must_use]
    pub fn auto_ping(mut self, enabled: bool) -> Self {
        self.options.auto_ping = enabled;
        self
    }

    /// Enables or disables the automatic flagged-content answer.
    #[must_use]
    pub fn auto_dangerous_context(mut self, enabled: bool) -> Self {
        self.options.auto_dangerous_context = enabled;
        self
    }

    /// Installs an error sink.
    #[must_use]
    pub fn error_sink<S>(mut self, sink: S) -> Self
    where
        S: Fn(&DispatchError) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Returns the interception switches.
    #[must_use]
    pub fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Handles one webhook call.
    pub async fn dispatch(&self, body: Bytes) -> HttpResponse {
        if body.is_empty() {
            let error = DispatchError::EmptyBody;
            self.report(&error);
            return empty_response(error.status_code());
        }

        let outcome = AssertUnwindSafe(self.process(&body)).catch_unwind().await;
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => Err(DispatchError::from_panic(payload.as_ref())),
        };

        match result {
            Ok(bytes) => json_response(bytes),
            Err(error) => {
                self.report(&error);
                empty_response(error.status_code())
            }
        }
    }

    /// Logs `error` and passes it to the error sink, if any. A panic in the
    /// sink is logged and swallowed.
    pub fn report(&self, error: &DispatchError) {
        match error.class() {
            FailureClass::Advisory => {
                tracing::warn!(error = %error, "Skill handler reported an error");
            }
            FailureClass::BadRequest | FailureClass::Internal => {
                tracing::error!(
                    error = %error,
                    status = error.status_code().as_u16(),
                    "Webhook call failed"
                );
            }
        }

        if let Some(sink) = &self.sink {
            if std::panic::catch_unwind(AssertUnwindSafe(|| sink(error))).is_err() {
                tracing::error!(error = %error, "Error sink panicked");
            }
        }
    }

    async fn process(&self, body: &[u8]) -> Result<Vec<u8>, DispatchError> {
        let input = InputData::from_slice(body).map_err(DispatchError::Decode)?;

        let output = match self.intercept(&input) {
            Some(output) => output,
            None => {
                let HandlerOutput { output, error } = (self.handler)(input).await;
                if let Some(error) = error {
                    self.report(&DispatchError::Handler(error));
                }
                output
            }
        };

        output.to_vec().map_err(DispatchError::Serialization)
    }

    fn intercept(&self, input: &InputData) -> Option<OutputData> {
        let request = &input.request;
        let text = if self.options.auto_ping && request.is_ping() {
            PONG_TEXT
        } else if self.options.auto_dangerous_context && request.is_dangerous() {
            DANGEROUS_CONTEXT_TEXT
        } else {
            return None;
        };

        tracing::debug!(
            session_id = %input.session.session_id,
            message_id = input.session.message_id,
            answer = text,
            "Intercepted request"
        );
        Some(OutputData::new(input, SkillResponse::new(text, text, false)))
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("options", &self.options)
            .field("sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

fn json_response(body: Vec<u8>) -> HttpResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Builds a bodiless response with the given status.
pub(crate) fn empty_response(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use http_body_util::BodyExt;

    async fn body_string(response: HttpResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn echo_dispatcher(calls: Arc<AtomicUsize>) -> Dispatcher {
        Dispatcher::new(move |input: InputData| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                OutputData::new(&input, SkillResponse::new("handled", "", false))
            }
        })
    }

    fn recording_sink() -> (Arc<Mutex<Vec<String>>>, impl Fn(&DispatchError) + Send + Sync) {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink_messages = Arc::clone(&messages);
        let sink = move |error: &DispatchError| {
            sink_messages.lock().unwrap().push(error.to_string());
        };
        (messages, sink)
    }

    #[tokio::test]
    async fn test_empty_body_is_bad_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (messages, sink) = recording_sink();
        let dispatcher = echo_dispatcher(Arc::clone(&calls)).error_sink(sink);

        let response = dispatcher.dispatch(Bytes::new()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(*messages.lock().unwrap(), vec!["request body is empty"]);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = echo_dispatcher(Arc::clone(&calls));

        let response = dispatcher.dispatch(Bytes::from_static(b"{not json")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_request_type_is_bad_request() {
        let dispatcher = echo_dispatcher(Arc::new(AtomicUsize::new(0)));
        let body = Bytes::from_static(br#"{"request": {"type": "Gesture"}}"#);

        let response = dispatcher.dispatch(body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ping_intercepted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = echo_dispatcher(Arc::clone(&calls));
        let body = Bytes::from_static(br#"{"request": {"original_utterance": "ping"}}"#);

        let response = dispatcher.dispatch(body).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["response"]["text"], "pong");
        assert_eq!(json["response"]["tts"], "pong");
        assert_eq!(json["response"]["end_session"], false);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ping_wins_over_flagged_content() {
        let dispatcher = echo_dispatcher(Arc::new(AtomicUsize::new(0)));
        let body = Bytes::from_static(
            br#"{"request": {"original_utterance": "ping", "markup": {"dangerous_context": true}}}"#,
        );

        let response = dispatcher.dispatch(body).await;
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["response"]["text"], PONG_TEXT);
    }

    #[tokio::test]
    async fn test_flagged_content_intercepted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = echo_dispatcher(Arc::clone(&calls));
        let body = Bytes::from_static(br#"{"request": {"markup": {"dangerous_context": true}}}"#);

        let response = dispatcher.dispatch(body).await;
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();

        assert_eq!(json["response"]["text"], DANGEROUS_CONTEXT_TEXT);
        assert_eq!(json["response"]["tts"], DANGEROUS_CONTEXT_TEXT);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disabled_interceptors_delegate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = echo_dispatcher(Arc::clone(&calls))
            .auto_ping(false)
            .auto_dangerous_context(false);
        let body = Bytes::from_static(
            br#"{"request": {"original_utterance": "ping", "markup": {"dangerous_context": true}}}"#,
        );

        let response = dispatcher.dispatch(body).await;
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();

        assert_eq!(json["response"]["text"], "handled");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_error_is_advisory() {
        let (messages, sink) = recording_sink();
        let dispatcher = Dispatcher::new(|input: InputData| async move {
            HandlerOutput::with_error(
                OutputData::new(&input, SkillResponse::new("still here", "", false)),
                "test",
            )
        })
        .error_sink(sink);

        let response = dispatcher.dispatch(Bytes::from_static(b"{}")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["response"]["text"], "still here");
        assert_eq!(*messages.lock().unwrap(), vec!["test"]);
    }

    #[tokio::test]
    async fn test_handler_panic_is_internal() {
        let (messages, sink) = recording_sink();
        let dispatcher = Dispatcher::new(|_input: InputData| async move {
            if true {
                panic!("test");
            }
            OutputData::default()
        })
        .error_sink(sink);

        let response = dispatcher.dispatch(Bytes::from_static(b"{}")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "");
        assert_eq!(*messages.lock().unwrap(), vec!["Unexpected error: test"]);
    }

    #[tokio::test]
    async fn test_formatted_panic_message() {
        let (messages, sink) = recording_sink();
        let dispatcher = Dispatcher::new(|input: InputData| async move {
            let index = input.request.nlu.tokens.len() + 3;
            if index > 0 {
                panic!("index {index} out of range");
            }
            OutputData::default()
        })
        .error_sink(sink);

        let response = dispatcher.dispatch(Bytes::from_static(b"{}")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            *messages.lock().unwrap(),
            vec!["Unexpected error: index 3 out of range"]
        );
    }

    #[tokio::test]
    async fn test_panicking_sink_keeps_status() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = echo_dispatcher(Arc::clone(&calls))
            .error_sink(|_error: &DispatchError| panic!("sink down"));

        let response = dispatcher.dispatch(Bytes::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = dispatcher.dispatch(Bytes::from_static(b"{broken")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panicking_sink_keeps_advisory_response() {
        let dispatcher = Dispatcher::new(|input: InputData| async move {
            HandlerOutput::with_error(
                OutputData::new(&input, SkillResponse::new("still here", "", false)),
                "test",
            )
        })
        .error_sink(|_error: &DispatchError| panic!("sink down"));

        let response = dispatcher.dispatch(Bytes::from_static(b"{}")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["response"]["text"], "still here");
    }

    #[tokio::test]
    async fn test_handler_invoked_once_per_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = echo_dispatcher(Arc::clone(&calls));

        for _ in 0..3 {
            let response = dispatcher.dispatch(Bytes::from_static(b"{}")).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_default_options() {
        let options = DispatchOptions::default();
        assert!(options.auto_ping);
        assert!(options.auto_dangerous_context);

        let dispatcher = echo_dispatcher(Arc::new(AtomicUsize::new(0))).with_options(
            DispatchOptions {
                auto_ping: false,
                auto_dangerous_context: true,
            },
        );
        assert!(!dispatcher.options().auto_ping);
        assert!(format!("{dispatcher:?}").contains("Dispatcher"));
    }
}
