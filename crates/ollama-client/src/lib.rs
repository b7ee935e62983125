//! A model provider for a local Ollama server.

#[macro_use]
extern crate tracing;

pub mod aggregate;
mod config;
mod directory;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use little_ollama_model::{
    Endpoint, ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};
use mime::Mime;
use reqwest::{Client, Response, header};

pub use aggregate::{Fragments, aggregate, decode_line, fragments};
pub use config::{OllamaConfig, OllamaConfigBuilder};
pub use directory::OllamaDirectory;
use io::{Chunks, Lines};
use proto::ErrorResponse;
pub use response::OllamaResponse;

/// Error type for [`OllamaProvider`] and [`OllamaDirectory`].
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

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

/// Ollama model provider, streaming `/api/generate` and `/api/chat`.
#[derive(Clone, Debug)]
pub struct OllamaProvider {
    client: Client,
    config: Arc<OllamaConfig>,
}

impl OllamaProvider {
    /// Creates a new `OllamaProvider` with the given configuration.
    #[inline]
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns a directory client talking to the same server.
    #[inline]
    pub fn directory(&self) -> OllamaDirectory {
        OllamaDirectory::with_client(
            self.client.clone(),
            Arc::clone(&self.config),
        )
    }
}

impl ModelProvider for OllamaProvider {
    type Error = Error;
    type Response = OllamaResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let builder = match req.endpoint {
            Endpoint::Generate => self
                .client
                .post(self.config.endpoint("/api/generate"))
                .json(&proto::create_generate_request(req)),
            Endpoint::Chat => self
                .client
                .post(self.config.endpoint("/api/chat"))
                .json(&proto::create_chat_request(req)),
        };
        // `json` already sets the content type.
        let resp_fut =
            builder.header(header::ACCEPT, "application/json").send();

        async move {
            let resp = resp_fut.await.map_err(transport_error)?;
            let resp = check_status(resp).await?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_valid_content_type = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| {
                    matches!(m.subtype().as_str(), "json" | "x-ndjson")
                })
                .unwrap_or(false);
            if !is_valid_content_type {
                warn!("unexpected content type: {content_type:?}");
            }

            // Here we got a successful response.
            let lines = Lines::new(Chunks::from_response(resp));
            Ok(OllamaResponse::from_lines(lines))
        }
    }
}

#[inline]
fn transport_error(err: reqwest::Error) -> Error {
    Error::new(format!("{err}"), ErrorKind::Transport)
}

/// Turns a non-success status into an error, keeping the message the
/// server put in the body if there is one.
async fn check_status(resp: Response) -> Result<Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(ErrorResponse { error }) => format!("{status}: {error}"),
        Err(_) if body.trim().is_empty() => format!("{status}"),
        Err(_) => format!("{status}: {}", body.trim()),
    };
    debug!("server returned an error: {message}");
    Err(Error::new(message, ErrorKind::Transport))
}
