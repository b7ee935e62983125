//! A local fake model server for testing purpose.

mod directory;
mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use little_ollama_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
    ModelResponse, ResponseFragment, Role,
};
use tokio::time::{Sleep, sleep};

pub use directory::*;
pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    preset: PresetResponse,
    fragment_idx: usize,
    finished: bool,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ResponseFragment>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        if this.finished {
            // In case this method is called after completion.
            return Poll::Ready(Ok(None));
        }

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            if this.preset.failure_after == Some(this.fragment_idx) {
                this.finished = true;
                return Poll::Ready(Err(Error::new(
                    "connection reset",
                    ErrorKind::Transport,
                )));
            }

            let fragments = &this.preset.fragments;
            if this.fragment_idx < fragments.len() {
                let text = fragments[this.fragment_idx].clone();
                this.fragment_idx += 1;
                return Poll::Ready(Ok(Some(ResponseFragment::text(text))));
            }

            this.finished = true;
            if this.preset.final_marker {
                return Poll::Ready(Ok(Some(ResponseFragment::final_marker())));
            }
            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_fragment(cx)
    }
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each user turn. The response is selected by
/// the number of user messages in the request, so the first user turn
/// gets the first response, and so on. If there are no enough responses
/// in the script, an error will be returned.
///
/// Every request is recorded and can be inspected with
/// [`TestModelProvider::requests`].
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Vec<PresetResponse>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_response(&mut self, preset: PresetResponse) {
        self.script.push(preset);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the requests received so far, shared across clones.
    #[inline]
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(req.clone());
        }

        let user_turns = req
            .messages
            .iter()
            .filter(|msg| msg.role() == Role::User)
            .count();
        let result = match user_turns
            .checked_sub(1)
            .and_then(|idx| self.script.get(idx))
        {
            None => Err(Error::new("no enough steps", ErrorKind::Other)),
            Some(PresetResponse {
                rejection: Some(message),
                ..
            }) => Err(Error::new(message.clone(), ErrorKind::Transport)),
            Some(preset) => Ok(TestModelResponse {
                preset: preset.clone(),
                fragment_idx: 0,
                finished: false,
                delay: self.delay.unwrap_or(Duration::from_millis(1)),
                sleep: None,
            }),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use little_ollama_model::{Endpoint, Message};

    use super::*;

    async fn collect_response(
        resp: TestModelResponse,
    ) -> Result<Vec<ResponseFragment>, Error> {
        let mut resp = pin!(resp);
        let mut fragments = vec![];
        while let Some(fragment) =
            poll_fn(|cx| resp.as_mut().poll_next_fragment(cx)).await?
        {
            fragments.push(fragment);
        }
        Ok(fragments)
    }

    fn request(messages: Vec<Message>) -> ModelRequest {
        ModelRequest {
            model: "test".to_owned(),
            endpoint: Endpoint::Chat,
            messages,
            system: None,
            images: vec![],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut provider = TestModelProvider::default();
        provider.add_response(PresetResponse::with_fragments([
            "Hello, ", "world!",
        ]));
        provider.add_response(
            PresetResponse::with_fragments(["Sure."]).without_final_marker(),
        );

        let mut messages = vec![Message::user("Hi")];
        let resp = provider.send_request(&request(messages.clone())).await;
        let fragments = collect_response(resp.unwrap()).await.unwrap();
        assert_eq!(
            fragments,
            [
                ResponseFragment::text("Hello, "),
                ResponseFragment::text("world!"),
                ResponseFragment::final_marker(),
            ]
        );

        messages.push(Message::assistant("Hello, world!"));
        messages.push(Message::user("Check my todo"));
        let resp = provider.send_request(&request(messages.clone())).await;
        let fragments = collect_response(resp.unwrap()).await.unwrap();
        assert_eq!(fragments, [ResponseFragment::text("Sure.")]);

        messages.push(Message::user("Again"));
        let resp = provider.send_request(&request(messages)).await;
        assert_eq!(resp.err().unwrap().kind(), ErrorKind::Other);

        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_failures() {
        let mut provider = TestModelProvider::default();
        provider.add_response(
            PresetResponse::with_fragments(["a", "b"]).with_failure_after(1),
        );
        let resp = provider.send_request(&request(vec![Message::user("x")]));
        let err = collect_response(resp.await.unwrap()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let mut provider = TestModelProvider::default();
        provider.add_response(PresetResponse::rejected("404 Not Found"));
        let resp = provider.send_request(&request(vec![Message::user("x")]));
        let err = resp.await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "404 Not Found");
    }
}
