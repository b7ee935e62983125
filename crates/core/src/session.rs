use std::sync::Arc;

use little_ollama_model::{
    AggregationResult, EncodedImage, Endpoint, Message, ModelProvider,
    ModelRequest,
};

use crate::model_client::ModelClient;
use crate::transcript::Transcript;

type FragmentCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// [`ChatSession`] builder.
pub struct ChatSessionBuilder {
    model_client: ModelClient,
    model: String,
    system_prompt: Option<String>,
    on_fragment: Option<FragmentCallback>,
}

impl ChatSessionBuilder {
    /// Creates a new builder with the specified model provider and the name
    /// of the model to talk to.
    #[inline]
    pub fn with_model_provider<P, S>(provider: P, model: S) -> Self
    where
        P: ModelProvider + 'static,
        S: Into<String>,
    {
        Self {
            model_client: ModelClient::new(provider),
            model: model.into(),
            system_prompt: None,
            on_fragment: None,
        }
    }

    /// Sets the system prompt sent along with every request.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Attaches a callback to be invoked with each piece of text as it
    /// streams in.
    #[inline]
    pub fn on_fragment(
        mut self,
        on_fragment: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_fragment = Some(Arc::new(on_fragment));
        self
    }

    /// Builds the session.
    #[inline]
    pub fn build(self) -> ChatSession {
        ChatSession {
            model_client: self.model_client,
            transcript: Transcript::new(),
            model: self.model,
            system_prompt: self.system_prompt,
            on_fragment: self.on_fragment,
        }
    }
}

/// A conversation with one model.
///
/// The session owns its [`Transcript`]. Each submission appends the user
/// message, sends exactly one request and, if the transport succeeded,
/// appends the assistant answer. Only one request can be in flight, which
/// `&mut self` enforces.
pub struct ChatSession {
    model_client: ModelClient,
    transcript: Transcript,
    model: String,
    system_prompt: Option<String>,
    on_fragment: Option<FragmentCallback>,
}

impl ChatSession {
    /// Sends a chat message, replaying the transcript as context.
    pub async fn submit(&mut self, prompt: &str) -> AggregationResult {
        self.run(prompt, Endpoint::Chat, vec![]).await
    }

    /// Asks a question about an image through the generate endpoint.
    pub async fn submit_with_image(
        &mut self,
        prompt: &str,
        image: EncodedImage,
    ) -> AggregationResult {
        self.run(prompt, Endpoint::Generate, vec![image]).await
    }

    /// Returns the messages exchanged so far.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the name of the model this session talks to.
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn run(
        &mut self,
        prompt: &str,
        endpoint: Endpoint,
        images: Vec<EncodedImage>,
    ) -> AggregationResult {
        self.transcript.append(Message::user(prompt));

        let req = ModelRequest {
            model: self.model.clone(),
            endpoint,
            messages: self.transcript.all().to_vec(),
            system: self.system_prompt.clone(),
            images,
        };
        debug!(
            "sending {} messages to {} ({endpoint:?})",
            req.messages.len(),
            self.model
        );

        let on_fragment = self.on_fragment.clone();
        let result = self
            .model_client
            .send_request(req, move |text| {
                if let Some(on_fragment) = &on_fragment {
                    on_fragment(text);
                }
            })
            .await;

        if result.succeeded() {
            if result.full_text().is_empty() {
                warn!("{} returned an empty response", self.model);
            }
            self.transcript
                .append(Message::assistant(result.full_text()));
        }
        result
    }
}
