use super::{Chunks, ChunksError};

/// A type for reading newline-delimited records from a chunk stream.
///
/// Records may be split across chunks at any byte, including inside a
/// multi-byte character.
pub struct Lines {
    buf: Vec<u8>,
    // Bytes of `buf` already known to contain no line feed.
    scanned: usize,
    chunks: Chunks,
    exhausted: bool,
}

impl Lines {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            chunks,
            exhausted: false,
        }
    }

    /// Returns the next line without its terminator, or `None` when the
    /// stream is exhausted. A last line without a trailing newline is
    /// still returned. Lines that are not valid UTF-8 are dropped.
    pub async fn next_line(&mut self) -> Result<Option<String>, ChunksError> {
        loop {
            // Serve complete lines from the buffer first.
            while let Some(eol_idx) = self.find_eol() {
                let raw: Vec<u8> = self.buf.drain(..=eol_idx).collect();
                self.scanned = 0;
                if let Some(line) = decode(&raw[..eol_idx]) {
                    return Ok(Some(line));
                }
            }
            self.scanned = self.buf.len();

            if self.exhausted {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let raw = std::mem::take(&mut self.buf);
                self.scanned = 0;
                return Ok(decode(&raw));
            }

            match self.chunks.next_chunk().await? {
                Some(bytes) => self.buf.extend_from_slice(&bytes),
                None => self.exhausted = true,
            }
        }
    }

    fn find_eol(&self) -> Option<usize> {
        self.buf[self.scanned..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|idx| self.scanned + idx)
    }
}

fn decode(raw: &[u8]) -> Option<String> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    match str::from_utf8(raw) {
        Ok(s) => Some(s.to_owned()),
        Err(err) => {
            debug!("dropping a line that is not valid utf-8: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[tokio::test]
    async fn test_normal_lines() {
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::from_static(b"hello\n"),
                Bytes::from_static(b"bye\n"),
            ]
            .into(),
        );
        let mut lines = Lines::new(chunks);
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "hello");
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "bye");
        assert_eq!(lines.next_line().await.unwrap(), None);
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quirk_streaming() {
        // "é" is split between two chunks.
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::from_static(b"caf\xc3"),
                Bytes::from_static(b"\xa9\r\nsec"),
                Bytes::from_static(b"ond\n\nthird"),
            ]
            .into(),
        );
        let mut lines = Lines::new(chunks);
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "café");
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "second");
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "");
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "third");
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_long_line_in_tiny_chunks() {
        let long = "x".repeat(10_000);
        let body = format!("{long}\nshort\n{long}");
        let chunks = Chunks::from_vec_deque(
            body.as_bytes()
                .chunks(3)
                .map(Bytes::copy_from_slice)
                .collect(),
        );
        let mut lines = Lines::new(chunks);
        assert_eq!(lines.next_line().await.unwrap().unwrap(), long);
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "short");
        assert_eq!(lines.next_line().await.unwrap().unwrap(), long);
        assert_eq!(lines.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_data() {
        let chunks = Chunks::from_vec_deque(
            vec![Bytes::from_static(b"\xff\xfe\nok\n")].into(),
        );
        let mut lines = Lines::new(chunks);
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "ok");
        assert_eq!(lines.next_line().await.unwrap(), None);

        let chunks = Chunks::from_results(
            vec![
                Ok(Bytes::from_static(b"first\n")),
                Err(ChunksError("connection reset".to_owned())),
            ]
            .into(),
        );
        let mut lines = Lines::new(chunks);
        assert_eq!(lines.next_line().await.unwrap().unwrap(), "first");
        assert_eq!(
            lines.next_line().await.unwrap_err(),
            ChunksError("connection reset".to_owned())
        );
    }
}
