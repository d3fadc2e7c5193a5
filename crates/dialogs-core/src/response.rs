//! Response envelope builders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CodecError, CodecResult};
use crate::request::{InputData, Session};

/// Response envelope written back to the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputData {
    /// Protocol version, echoed from the request.
    pub version: String,
    /// Session descriptor, echoed from the request.
    pub session: Session,
    /// Response body.
    pub response: Response,
}

impl OutputData {
    /// Wraps `response` in an envelope echoing the request's version and
    /// session.
    #[must_use]
    pub fn new(input: &InputData, response: Response) -> Self {
        Self {
            version: input.version.clone(),
            session: input.session.clone(),
            response,
        }
    }

    /// Serializes the envelope to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if serialization fails.
    pub fn to_vec(&self) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(CodecError::Encode)
    }
}

/// Response body.
///
/// # Example
///
/// ```
/// use dialogs_core::{Button, Response};
///
/// let response = Response::new("Hello", "", false)
///     .with_button(Button::new("Yes").hide(true))
///     .with_button(Button::new("No"));
///
/// assert_eq!(response.tts, "Hello");
/// assert_eq!(response.buttons.len(), 2);
/// assert_eq!(response.buttons[0].title, "Yes");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Text shown to the user.
    pub text: String,
    /// Text-to-speech string.
    pub tts: String,
    /// Buttons, in insertion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
    /// Whether the skill ends the session.
    pub end_session: bool,
}

impl Response {
    /// Creates a response. An empty `tts` falls back to `text`.
    #[must_use]
    pub fn new(text: impl Into<String>, tts: impl Into<String>, end_session: bool) -> Self {
        let text = text.into();
        let mut tts = tts.into();
        if tts.is_empty() {
            tts.clone_from(&text);
        }
        Self {
            text,
            tts,
            buttons: Vec::new(),
            end_session,
        }
    }

    /// Appends a button.
    pub fn add_button(&mut self, button: Button) -> &mut Self {
        self.buttons.push(button);
        self
    }

    /// Appends a button, builder style.
    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }
}

/// Response button.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Button {
    /// Button caption.
    pub title: String,
    /// `true` for a suggestion chip that disappears after the next reply.
    #[serde(default)]
    pub hide: bool,
    /// URL opened when the button is pressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Opaque payload sent back in the `ButtonPressed` request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Button {
    /// Creates a visible button with no URL and no payload.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the hide flag.
    #[must_use]
    pub const fn hide(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }

    /// Sets the URL. An empty string leaves the URL unset.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.url = (!url.is_empty()).then_some(url);
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> InputData {
        InputData::from_slice(
            br#"{
                "version": "1.0",
                "session": {
                    "new": true,
                    "message_id": 4,
                    "session_id": "2eac4854-fce721f3-b845abba-20d60",
                    "skill_id": "3ad36498-f5rd-4079-a14b-788652932056",
                    "user_id": "AC9WC3DF6FCE052E45A4566A48E6B7193774B84814CE49A922E163B8B29881DC"
                }
            }"#,
        )
        .unwrap()
    }

    const SESSION_JSON: &str = r#""session":{"new":true,"message_id":4,"session_id":"2eac4854-fce721f3-b845abba-20d60","skill_id":"3ad36498-f5rd-4079-a14b-788652932056","user_id":"AC9WC3DF6FCE052E45A4566A48E6B7193774B84814CE49A922E163B8B29881DC"}"#;

    #[test]
    fn test_tts_falls_back_to_text() {
        let response = Response::new("test", "", true);
        assert_eq!(response.tts, "test");

        let response = Response::new("test", "тест", true);
        assert_eq!(response.tts, "тест");
    }

    #[test]
    fn test_serialize_without_buttons() {
        let output = OutputData::new(&input(), Response::new("pong", "pong", false));
        let json = String::from_utf8(output.to_vec().unwrap()).unwrap();

        assert_eq!(
            json,
            format!(
                r#"{{"version":"1.0",{SESSION_JSON},"response":{{"text":"pong","tts":"pong","end_session":false}}}}"#
            )
        );
    }

    #[test]
    fn test_serialize_buttons_in_order() {
        let mut response = Response::new("test", "", true);
        response
            .add_button(Button::new("button 1").hide(true).url("https://ya.ru").payload(123))
            .add_button(Button::new("button 2").url(""));

        let output = OutputData::new(&input(), response);
        let json = String::from_utf8(output.to_vec().unwrap()).unwrap();

        assert_eq!(
            json,
            format!(
                r#"{{"version":"1.0",{SESSION_JSON},"response":{{"text":"test","tts":"test","buttons":[{{"title":"button 1","hide":true,"url":"https://ya.ru","payload":123}},{{"title":"button 2","hide":false}}],"end_session":true}}}}"#
            )
        );
    }

    #[test]
    fn test_button_structured_payload() {
        let button = Button::new("order").payload(json!({"pizza": [1, 2]}));
        assert_eq!(
            serde_json::to_string(&button).unwrap(),
            r#"{"title":"order","hide":false,"payload":{"pizza":[1,2]}}"#
        );
    }

    #[test]
    fn test_empty_input_echo() {
        let output = OutputData::new(&InputData::default(), Response::new("hi", "", false));
        let value: Value = serde_json::from_slice(&output.to_vec().unwrap()).unwrap();
        assert_eq!(value["version"], "");
        assert_eq!(value["session"]["message_id"], 0);
        assert!(value["response"].get("buttons").is_none());
    }
}
