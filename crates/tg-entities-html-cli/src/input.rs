use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;
use serde_json::Value;

/// The parts of a Bot API `Message` that carry formatted text.
#[derive(Debug, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<Value>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub caption_entities: Vec<Value>,
}

impl Message {
    /// Text with its entities, falling back to the caption of media messages.
    pub fn body(&self) -> (&str, &[Value]) {
        match (&self.text, &self.caption) {
            (Some(text), _) => (text.as_str(), self.entities.as_slice()),
            (None, Some(caption)) => (caption.as_str(), self.caption_entities.as_slice()),
            (None, None) => ("", &[] as &[Value]),
        }
    }
}

// Keys under which an `Update` carries a message.
const UPDATE_KEYS: [&str; 4] = [
    "message",
    "edited_message",
    "channel_post",
    "edited_channel_post",
];

/// Parses either a message object or an update wrapping one.
pub fn parse_message(raw: &[u8]) -> Result<Message> {
    let value: Value = serde_json::from_slice(raw)
        .into_diagnostic()
        .wrap_err("input is not valid JSON")?;

    let message = UPDATE_KEYS
        .iter()
        .find_map(|key| value.get(key).filter(|inner| inner.is_object()))
        .unwrap_or(&value);

    Message::deserialize(message)
        .into_diagnostic()
        .wrap_err("input is not a Telegram message")
}
