use serde::{Deserialize, Serialize};

/// The preset response for one assistant turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Text fragments in this response.
    pub fragments: Vec<String>,
    /// Whether the response ends with a final marker. Without one, the
    /// response just runs out of fragments.
    pub final_marker: bool,
    /// If set, the stream breaks after this many fragments.
    pub failure_after: Option<usize>,
    /// If set, the request is refused with this message before any
    /// fragment is sent.
    pub rejection: Option<String>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified fragments.
    #[inline]
    pub fn with_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            final_marker: true,
            failure_after: None,
            rejection: None,
        }
    }

    /// Creates a `PresetResponse` whose request is refused.
    #[inline]
    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self {
            rejection: Some(message.into()),
            ..Self::with_fragments(Vec::<String>::new())
        }
    }

    /// Drops the final marker.
    #[inline]
    pub fn without_final_marker(mut self) -> Self {
        self.final_marker = false;
        self
    }

    /// Breaks the stream after `count` fragments.
    #[inline]
    pub fn with_failure_after(mut self, count: usize) -> Self {
        self.failure_after = Some(count);
        self
    }
}
