//! Inbound messages and the replies the engine sends back.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Serialize, Serializer};

use crate::documents::UploadedDocument;
use crate::session::UserId;

/// One inbound chat message.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub user_id: UserId,
    pub content: InboundContent,
}

#[derive(Debug, Clone)]
pub enum InboundContent {
    Text(String),
    Document(UploadedDocument),
    /// Voice notes are acknowledged but not transcribed.
    Voice,
}

impl InboundContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            InboundContent::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InboundContent::Text(_) => "text",
            InboundContent::Document(_) => "document",
            InboundContent::Voice => "voice",
        }
    }
}

/// A click on one of the options of a selection reply.
#[derive(Debug, Clone)]
pub struct Selection {
    pub user_id: UserId,
    pub label: String,
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Text {
        text: String,
        /// Persistent keyboard button labels shown under the message.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        keyboard: Vec<String>,
    },
    Selection {
        text: String,
        options: Vec<String>,
    },
    Document {
        file_name: String,
        #[serde(serialize_with = "as_base64")]
        content: Vec<u8>,
    },
}

#[cfg(test)]
impl Reply {
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Text { text, .. } | Reply::Selection { text, .. } => Some(text.as_str()),
            Reply::Document { .. } => None,
        }
    }
}

fn as_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

/// Ordered outbound messages produced by one handler invocation.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Replies {
    pub replies: Vec<Reply>,
}

impl Replies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(&mut self, text: impl Into<String>) -> &mut Self {
        self.replies.push(Reply::Text {
            text: text.into(),
            keyboard: Vec::new(),
        });
        self
    }

    pub fn say_with_keyboard(&mut self, text: impl Into<String>, keyboard: Vec<String>) -> &mut Self {
        self.replies.push(Reply::Text {
            text: text.into(),
            keyboard,
        });
        self
    }

    pub fn choose(&mut self, text: impl Into<String>, options: Vec<String>) -> &mut Self {
        self.replies.push(Reply::Selection {
            text: text.into(),
            options,
        });
        self
    }

    pub fn attach(&mut self, file_name: impl Into<String>, content: Vec<u8>) -> &mut Self {
        self.replies.push(Reply::Document {
            file_name: file_name.into(),
            content,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }
}

#[cfg(test)]
impl Replies {
    pub fn last_text(&self) -> Option<&str> {
        self.replies.iter().rev().find_map(Reply::text)
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}
