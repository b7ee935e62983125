//! Folding a newline-delimited JSON response body into text.
//!
//! Each line of a streamed `/api/generate` or `/api/chat` body is one JSON
//! record. Records carry a piece of the answer until one of them has
//! `done` set. Broken records are expected on flaky connections and are
//! skipped instead of failing the whole response.

use std::iter::FusedIterator;
use std::str;

use little_ollama_model::{AggregationResult, ResponseFragment};

use crate::proto::StreamRecord;

/// Decodes one line of a response body.
///
/// Returns `None` if the line should be skipped: blank lines, lines that
/// are not a JSON record, and records without text. A record with `done`
/// set yields the final marker; any text it carries is dropped.
pub fn decode_line(line: &str) -> Option<ResponseFragment> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let record = match serde_json::from_str::<StreamRecord>(line) {
        Ok(record) => record,
        Err(err) => {
            debug!("skipping malformed record: {err}");
            trace!("malformed record: {line}");
            return None;
        }
    };

    if record.done {
        return Some(ResponseFragment::final_marker());
    }
    record.into_text().map(ResponseFragment::text)
}

/// A lazy sequence of fragments decoded from a complete response body.
///
/// The sequence ends after the final marker or at the end of the body,
/// whichever comes first, and stays ended.
#[derive(Clone, Debug)]
pub struct Fragments<'a> {
    lines: str::Lines<'a>,
    finished: bool,
}

impl<'a> Fragments<'a> {
    /// Creates the sequence over `body`. Nothing is decoded until the
    /// first call to `next`.
    #[inline]
    pub fn new(body: &'a str) -> Self {
        Self {
            lines: body.lines(),
            finished: false,
        }
    }
}

impl Iterator for Fragments<'_> {
    type Item = ResponseFragment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        for line in self.lines.by_ref() {
            let Some(fragment) = decode_line(line) else {
                continue;
            };
            if fragment.is_final {
                self.finished = true;
            }
            return Some(fragment);
        }
        self.finished = true;
        None
    }
}

impl FusedIterator for Fragments<'_> {}

/// Returns the lazy fragment sequence of `body`.
#[inline]
pub fn fragments(body: &str) -> Fragments<'_> {
    Fragments::new(body)
}

/// Concatenates the text of every fragment before the first final marker.
pub fn fold_fragments<I>(fragments: I) -> String
where
    I: IntoIterator<Item = ResponseFragment>,
{
    fragments
        .into_iter()
        .take_while(|fragment| !fragment.is_final)
        .map(|fragment| fragment.text)
        .collect()
}

/// Aggregates a complete response body.
///
/// A body only exists once the transport has succeeded, so the result
/// always reports success, even if no text was found.
pub fn aggregate(body: &str) -> AggregationResult {
    AggregationResult::completed(fold_fragments(fragments(body)))
}
