use std::pin::Pin;
use std::task::{Context, Poll, ready};

use little_ollama_model::{ErrorKind, ModelResponse, ResponseFragment};
use pin_project_lite::pin_project;

use crate::Error;
use crate::aggregate::decode_line;
use crate::io::Lines;

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextFragment = Result<(Option<ResponseFragment>, Lines), Error>;

pin_project! {
    /// A streamed response body, decoded line by line as chunks arrive.
    pub struct OllamaResponse {
        next_fragment_fut: Option<PinnedFuture<NextFragment>>,
    }
}

impl OllamaResponse {
    #[inline]
    pub(crate) fn from_lines(lines: Lines) -> Self {
        let next_fragment_fut = async move { next_fragment(lines).await };
        Self {
            next_fragment_fut: Some(Box::pin(next_fragment_fut)),
        }
    }
}

impl ModelResponse for OllamaResponse {
    type Error = crate::Error;

    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ResponseFragment>, Self::Error>> {
        let this = self.project();
        let Some(next_fragment_fut) = this.next_fragment_fut else {
            return Poll::Ready(Ok(None));
        };
        let (fragment, lines) =
            match ready!(next_fragment_fut.as_mut().poll(cx)) {
                Ok((Some(fragment), lines)) => (fragment, lines),
                Ok((None, _)) => {
                    *this.next_fragment_fut = None;
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_fragment_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        if fragment.is_final {
            // Whatever follows the final marker is never read.
            *this.next_fragment_fut = None;
        } else {
            let next_fragment_fut = async move { next_fragment(lines).await };
            *this.next_fragment_fut = Some(Box::pin(next_fragment_fut));
        }

        Poll::Ready(Ok(Some(fragment)))
    }
}

async fn next_fragment(mut lines: Lines) -> NextFragment {
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return Ok((None, lines)),
            Err(err) => {
                return Err(Error::new(err.0, ErrorKind::Transport));
            }
        };
        trace!("got a line: {line}");

        if let Some(fragment) = decode_line(&line) {
            return Ok((Some(fragment), lines));
        }
    }
}
