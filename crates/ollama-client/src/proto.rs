use little_ollama_model::{
    EncodedImage, Message, ModelInfo, ModelRequest, Role,
};
use serde::{Deserialize, Serialize};

// ------------------------------
// Types received from the server
// ------------------------------

/// One line of a streamed `/api/generate` or `/api/chat` body. Fields the
/// client doesn't use are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct StreamRecord {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<RecordMessage>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct RecordMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl StreamRecord {
    /// Takes the generated text out of the record, whichever endpoint it
    /// came from.
    #[inline]
    pub fn into_text(self) -> Option<String> {
        self.response
            .or_else(|| self.message.and_then(|msg| msg.content))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<EncodedImage>,
    stream: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PullRequest<'a> {
    pub name: &'a str,
    pub stream: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct CreateRequest<'a> {
    pub name: &'a str,
    pub modelfile: &'a str,
    pub stream: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DeleteRequest<'a> {
    pub name: &'a str,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_generate_request(req: &ModelRequest) -> GenerateRequest {
    GenerateRequest {
        model: req.model.clone(),
        prompt: req.prompt().unwrap_or_default().to_owned(),
        system: req.system.clone(),
        images: req.images.clone(),
        stream: true,
    }
}

#[inline]
pub fn create_chat_request(req: &ModelRequest) -> ChatRequest {
    let system = req
        .system
        .as_ref()
        .map(|content| Message::new(Role::System, content.as_str()));
    ChatRequest {
        model: req.model.clone(),
        messages: system.into_iter().chain(req.messages.clone()).collect(),
        stream: true,
    }
}
