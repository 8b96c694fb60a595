use bytes::Bytes;

/// One logical message: text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Message {
    /// Arbitrary text, including newlines and marker characters.
    Text(String),
    /// Arbitrary bytes, possibly empty.
    Binary(Bytes),
}

impl Message {
    /// Create a text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a binary message.
    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self::Binary(payload.into())
    }

    /// The text payload, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    /// The binary payload, if this is a binary message.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Text(_) => None,
            Self::Binary(payload) => Some(payload),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// `"text"` or `"binary"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
        }
    }

    /// Payload size in bytes (UTF-8 length for text).
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(payload) => payload.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for Message {
    fn from(payload: Vec<u8>) -> Self {
        Self::Binary(payload.into())
    }
}

impl From<Bytes> for Message {
    fn from(payload: Bytes) -> Self {
        Self::Binary(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        let text = Message::text("hi");
        assert_eq!(text.as_text(), Some("hi"));
        assert_eq!(text.as_binary(), None);
        assert!(text.is_text());
        assert_eq!(text.kind(), "text");

        let binary = Message::binary(vec![1u8, 2, 3]);
        assert_eq!(binary.as_binary(), Some(&[1u8, 2, 3][..]));
        assert_eq!(binary.as_text(), None);
        assert!(binary.is_binary());
        assert_eq!(binary.kind(), "binary");
        assert_eq!(binary.len(), 3);
    }

    #[test]
    fn conversions_pick_the_right_variant() {
        assert_eq!(Message::from("a"), Message::Text("a".to_string()));
        assert_eq!(Message::from(String::from("b")), Message::text("b"));
        assert_eq!(
            Message::from(vec![0u8]),
            Message::Binary(Bytes::from_static(&[0]))
        );
        assert!(Message::from(Bytes::new()).is_empty());
    }
}
