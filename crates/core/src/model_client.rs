use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;

use little_ollama_model::{
    AggregationResult, ModelProvider, ModelRequest, ModelResponse,
};
use tracing::Instrument;

type FragmentFn = Box<dyn Fn(&str) + Send + 'static>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = AggregationResult> + Send>>;
#[rustfmt::skip]
type HandlerFn = Arc<
    dyn Fn(ModelRequest, FragmentFn) -> BoxedSendRequestFuture + Send + Sync
>;

/// A wrapper around a model provider that drives a response to its end
/// and provides a type-erased interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req, on_fragment| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    let resp_or_err = fut.await;
                    handle_response::<P>(resp_or_err, on_fragment).await
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and folds the streamed fragments into one result.
    ///
    /// `on_fragment` is called with the text of every fragment as soon as
    /// it arrives. Transport failures, before or during the stream, are
    /// reported through [`AggregationResult::failure`].
    #[inline]
    pub async fn send_request(
        &self,
        req: ModelRequest,
        on_fragment: impl Fn(&str) + Send + 'static,
    ) -> AggregationResult {
        (self.handler_fn)(req, Box::new(on_fragment)).await
    }
}

async fn handle_response<P: ModelProvider + 'static>(
    resp_or_err: Result<P::Response, P::Error>,
    on_fragment: FragmentFn,
) -> AggregationResult {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            debug!("got an error: {err:?}");
            return AggregationResult::failed("", err.to_string());
        }
    };

    let mut full_text = String::new();

    trace!("start receiving fragments");

    let mut pinned_resp = pin!(resp);
    loop {
        let fragment_or_err =
            poll_fn(|cx| pinned_resp.as_mut().poll_next_fragment(cx)).await;
        let fragment = match fragment_or_err {
            Ok(Some(fragment)) => fragment,
            // Ran out of input without a final marker, which is fine.
            Ok(None) => break,
            Err(err) => {
                debug!("got an error: {err:?}");
                return AggregationResult::failed(full_text, err.to_string());
            }
        };
        trace!("got a fragment: {fragment:?}");

        if fragment.is_final {
            break;
        }
        full_text.push_str(&fragment.text);
        on_fragment(&fragment.text);
    }

    trace!("finished a request");

    AggregationResult::completed(full_text)
}
