/// Discriminant of a [`ContentBox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Text,
    File,
}

/// A unit of converted output, ready to be sent as one Telegram message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBox {
    /// MarkdownV2 text that fits in a single message
    Text { content: String },
    /// A document upload, used for code that cannot fit in one message
    File {
        file_name: String,
        data: Vec<u8>,
        caption: String,
    },
}

impl ContentBox {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Text { .. } => ContentType::Text,
            Self::File { .. } => ContentType::File,
        }
    }

    /// The text payload, if this is a TEXT box
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            Self::File { .. } => None,
        }
    }
}
