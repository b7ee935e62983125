use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The author of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions, never stored in a transcript.
    System,
    /// Text typed by the user.
    User,
    /// Text generated by the model.
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of a conversation.
///
/// The content can't be changed once the message is created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Creates a message with the given role.
    #[inline]
    pub fn new<S: Into<String>>(role: Role, content: S) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    #[inline]
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Returns the author of this message.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the text of this message.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// An image encoded as text, ready to be embedded as a JSON string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Wraps an already encoded string.
    #[inline]
    pub fn from_encoded<S: Into<String>>(encoded: S) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which server endpoint a request is addressed to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Multi-turn chat, the whole history is sent along.
    #[default]
    Chat,
    /// Single prompt completion, optionally with images.
    Generate,
}

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// Name of the model to run.
    pub model: String,
    /// The endpoint to call.
    pub endpoint: Endpoint,
    /// Prior turns followed by the new user turn.
    ///
    /// For [`Endpoint::Generate`], only the last user message is used as
    /// the prompt.
    pub messages: Vec<Message>,
    /// Optional system instructions.
    pub system: Option<String>,
    /// Images attached to the prompt.
    pub images: Vec<EncodedImage>,
}

impl ModelRequest {
    /// Returns the content of the latest user message.
    pub fn prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|msg| msg.role() == Role::User)
            .map(Message::content)
    }
}
