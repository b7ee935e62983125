use std::pin::Pin;
use std::task::{self, Poll};

use crate::provider::ModelProviderError;

/// A streamed response from the model provider.
pub trait ModelResponse: Sized + Send + 'static {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Attempts to pull out the next fragment from the response.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct response state:
    ///
    /// - `Poll::Pending` means that this response is still waiting for
    ///   the next fragment. Implementations will ensure that the current
    ///   task will be notified when the next fragment may be ready.
    /// - `Poll::Ready(Ok(Some(fragment)))` means the response has a
    ///   fragment to deliver. A fragment with `is_final` set is the last
    ///   one the response ever produces.
    /// - `Poll::Ready(Ok(None))` means the response has completed.
    /// - `Poll::Ready(Err(error))` means the transport failed while
    ///   reading the response.
    ///
    /// Calling this method after completion should always return `None`.
    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ResponseFragment>, Self::Error>>;
}

/// One decoded increment of generated text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResponseFragment {
    /// A piece of the answer, possibly empty.
    pub text: String,
    /// Whether this fragment marks the end of generation.
    pub is_final: bool,
}

impl ResponseFragment {
    /// Creates a fragment carrying text.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    /// Creates the final marker.
    #[inline]
    pub fn final_marker() -> Self {
        Self {
            text: String::new(),
            is_final: true,
        }
    }
}

/// The outcome of processing one full response.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AggregationResult {
    full_text: String,
    failure: Option<String>,
}

impl AggregationResult {
    /// Creates a result for a response whose transport succeeded.
    #[inline]
    pub fn completed<S: Into<String>>(full_text: S) -> Self {
        Self {
            full_text: full_text.into(),
            failure: None,
        }
    }

    /// Creates a result for a transport failure. `partial_text` holds
    /// whatever was received before the failure.
    #[inline]
    pub fn failed<S: Into<String>, M: Into<String>>(
        partial_text: S,
        message: M,
    ) -> Self {
        Self {
            full_text: partial_text.into(),
            failure: Some(message.into()),
        }
    }

    /// Returns the concatenated text of all fragments.
    #[inline]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Returns `true` if the transport reported success, even when no
    /// text was produced.
    #[inline]
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Returns the transport error message, if any.
    #[inline]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_success_differs_from_failure() {
        let empty = AggregationResult::completed("");
        let failed = AggregationResult::failed("", "connection refused");
        assert!(empty.succeeded());
        assert!(!failed.succeeded());
        assert_eq!(empty.full_text(), failed.full_text());
        assert_ne!(empty, failed);
        assert_eq!(failed.failure(), Some("connection refused"));
    }
}
