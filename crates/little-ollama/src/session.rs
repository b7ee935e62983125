use little_ollama_core::{ChatSession, ChatSessionBuilder, Transcript};
use little_ollama_model::{AggregationResult, EncodedImage, ModelProvider};

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    chat_builder: ChatSessionBuilder,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider and the
    /// model to talk to.
    pub fn with_model_provider<M, S>(provider: M, model: S) -> Self
    where
        M: ModelProvider + 'static,
        S: Into<String>,
    {
        let chat_builder =
            ChatSessionBuilder::with_model_provider(provider, model);
        Self { chat_builder }
    }

    /// Sets the system prompt for the model.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.chat_builder = self.chat_builder.with_system_prompt(prompt);
        self
    }

    /// Attaches a callback to be invoked when a piece of the answer
    /// arrives.
    #[inline]
    pub fn on_fragment(
        mut self,
        on_fragment: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.chat_builder = self.chat_builder.on_fragment(on_fragment);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        Session {
            chat: self.chat_builder.build(),
            image: None,
        }
    }
}

/// A chat session, like a window that displays messages and has an input
/// box, optionally next to an uploaded image.
///
/// It is basically a wrapper around [`ChatSession`]. While an image is
/// attached, every message is a question about that image.
pub struct Session {
    chat: ChatSession,
    image: Option<EncodedImage>,
}

impl Session {
    /// Attaches an image that the following messages refer to.
    #[inline]
    pub fn attach_image(&mut self, image: EncodedImage) {
        self.image = Some(image);
    }

    /// Returns `true` if an image is attached.
    #[inline]
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Sends a message to the session and waits for the whole answer.
    pub async fn send_message(&mut self, message: &str) -> AggregationResult {
        match &self.image {
            Some(image) => {
                self.chat.submit_with_image(message, image.clone()).await
            }
            None => self.chat.submit(message).await,
        }
    }

    /// Returns the messages exchanged so far.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        self.chat.transcript()
    }

    /// Returns the model of this session.
    #[inline]
    pub fn model(&self) -> &str {
        self.chat.model()
    }
}
