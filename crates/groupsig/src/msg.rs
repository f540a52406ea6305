//! Opaque message container.
//!
//! The core only ever sees byte strings; transport and framing are the
//! caller's concern. DL21-family schemes additionally expect the bytes to
//! be a JSON object with `scope` and `message` fields, extracted through
//! [`Message::json_field`].

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

const WRAP_COLS: usize = 72;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message(Vec<u8>);

impl Message {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Parses a standard-alphabet base64 string (newlines tolerated).
    pub fn from_base64(s: &str) -> Result<Self> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        Ok(Self(BASE64.decode(compact.as_bytes())?))
    }

    /// Standard-alphabet base64 of the bytes. With `wrap` set the output is
    /// broken into 72-column lines.
    pub fn to_base64(&self, wrap: bool) -> String {
        let encoded = BASE64.encode(&self.0);
        if !wrap {
            return encoded;
        }
        let mut out = String::with_capacity(encoded.len() + encoded.len() / WRAP_COLS + 1);
        for (i, c) in encoded.chars().enumerate() {
            if i > 0 && i % WRAP_COLS == 0 {
                out.push('\n');
            }
            out.push(c);
        }
        out
    }

    /// Extracts a string field from a JSON-composite message.
    pub fn json_field(&self, name: &'static str) -> Result<String> {
        let value: serde_json::Value =
            serde_json::from_slice(&self.0).map_err(|_| Error::JsonField(name))?;
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .ok_or(Error::JsonField(name))
    }
}

impl From<&[u8]> for Message {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Message {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_roundtrip() {
        let msg = Message::new(vec![7u8; 100]);
        let plain = msg.to_base64(false);
        assert!(!plain.contains('\n'));
        assert_eq!(Message::from_base64(&plain).unwrap(), msg);

        let wrapped = msg.to_base64(true);
        assert!(wrapped.lines().all(|l| l.len() <= 72));
        assert_eq!(Message::from_base64(&wrapped).unwrap(), msg);
    }

    #[test]
    fn json_fields() {
        let msg = Message::new(r#"{"scope":"svc-A","message":"m1"}"#);
        assert_eq!(msg.json_field("scope").unwrap(), "svc-A");
        assert_eq!(msg.json_field("message").unwrap(), "m1");
        assert!(msg.json_field("missing").is_err());

        let raw = Message::new(b"not json".to_vec());
        assert!(raw.json_field("scope").is_err());
    }
}
