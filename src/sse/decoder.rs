//! Incremental byte decoding and frame splitting.
//!
//! Transport chunks arrive on arbitrary byte boundaries. [`Utf8Decoder`]
//! turns them into text without ever splitting a code point, and
//! [`FrameSplitter`] cuts the resulting text into blank-line-delimited frames.

/// Replacement character emitted for byte sequences that can never be valid UTF-8.
const REPLACEMENT: char = '\u{FFFD}';

/// Stateful UTF-8 decoder that holds back incomplete trailing code points.
///
/// A fresh decoder must be used for every stream.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Bytes of a code point whose remaining bytes have not arrived yet
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder with no held-back bytes
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, prefixing any bytes held back by the previous call.
    ///
    /// Trailing bytes that form the start of a valid but incomplete code
    /// point are kept for the next call instead of being replaced.
    pub fn feed(&mut self, bytes: &[u8]) -> String {
        let input = if self.pending.is_empty() {
            bytes.to_vec()
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(bytes);
            joined
        };

        let mut out = String::with_capacity(input.len());
        let mut rest = input.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // `valid_up_to` marks a prefix that is valid UTF-8
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match e.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of input
                            self.pending.extend_from_slice(after);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush whatever is still held back at end of stream.
    ///
    /// A truncated code point can no longer be completed, so it decodes lossily.
    pub fn feed_final(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }

    /// Number of bytes currently held back
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Splits decoded text into complete frames, buffering the incomplete tail.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: String,
}

impl FrameSplitter {
    /// Create an empty splitter
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text and drain every frame completed by it.
    ///
    /// Returned frames do not include their terminating blank line.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);

        let mut frames = Vec::new();
        while let Some((pos, len)) = find_boundary(&self.buffer) {
            let frame = self.buffer[..pos].to_string();
            self.buffer.drain(..pos + len);
            frames.push(frame);
        }
        frames
    }

    /// Take the unterminated remainder, if it holds anything besides whitespace.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    /// Whether text is waiting for its terminating blank line
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }
}

/// Locate the earliest frame boundary, returning its position and length.
fn find_boundary(buffer: &str) -> Option<(usize, usize)> {
    let lf = buffer.find("\n\n").map(|pos| (pos, 2));
    let crlf = buffer.find("\r\n\r\n").map(|pos| (pos, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_in_chunks(bytes: &[u8], sizes: &[usize]) -> String {
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        let mut offset = 0;
        for size in sizes.iter().cycle() {
            if offset >= bytes.len() {
                break;
            }
            let end = (offset + size).min(bytes.len());
            out.push_str(&decoder.feed(&bytes[offset..end]));
            offset = end;
        }
        out.push_str(&decoder.feed_final());
        out
    }

    #[test]
    fn test_decode_ascii() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(b"hello"), "hello");
        assert_eq!(decoder.feed_final(), "");
    }

    #[test]
    fn test_decode_holds_back_split_code_point() {
        let bytes = "é".as_bytes();
        let mut decoder = Utf8Decoder::new();

        assert_eq!(decoder.feed(&bytes[..1]), "");
        assert_eq!(decoder.pending_len(), 1);
        assert_eq!(decoder.feed(&bytes[1..]), "é");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_decode_four_byte_code_point_split_everywhere() {
        let text = "a🦀b";
        let bytes = text.as_bytes();
        for split in 0..=bytes.len() {
            let mut decoder = Utf8Decoder::new();
            let mut out = decoder.feed(&bytes[..split]);
            out.push_str(&decoder.feed(&bytes[split..]));
            out.push_str(&decoder.feed_final());
            assert_eq!(out, text, "split at {}", split);
        }
    }

    #[test]
    fn test_chunk_boundary_invariance() {
        let text = "The crankshaft: Kurbelwelle, クランクシャフト, 曲轴 🚗⚙️ done";
        let bytes = text.as_bytes();
        for sizes in [&[1][..], &[2], &[3], &[5, 1, 2], &[7, 3], &[64]] {
            assert_eq!(decode_in_chunks(bytes, sizes), text, "chunk sizes {:?}", sizes);
        }
    }

    #[test]
    fn test_invalid_bytes_are_replaced_not_held() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(b"a\xFFb"), "a\u{FFFD}b");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_feed_final_flushes_truncated_tail() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(&"€".as_bytes()[..2]), "");
        assert_eq!(decoder.feed_final(), "\u{FFFD}");
        assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn test_splitter_single_frame() {
        let mut splitter = FrameSplitter::new();
        assert_eq!(splitter.push("data: hi\n\n"), vec!["data: hi".to_string()]);
        assert!(!splitter.has_pending());
    }

    #[test]
    fn test_splitter_buffers_partial_frame() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.push("data: he").is_empty());
        assert!(splitter.push("llo\n").is_empty());
        assert_eq!(splitter.push("\ndata: x\n\n"), vec!["data: hello", "data: x"]);
    }

    #[test]
    fn test_splitter_multiline_frame() {
        let mut splitter = FrameSplitter::new();
        let frames = splitter.push("data: a\ndata: b\n\n");
        assert_eq!(frames, vec!["data: a\ndata: b"]);
    }

    #[test]
    fn test_splitter_crlf_boundaries() {
        let mut splitter = FrameSplitter::new();
        let frames = splitter.push("data: one\r\n\r\ndata: two\n\n");
        assert_eq!(frames, vec!["data: one", "data: two"]);
    }

    #[test]
    fn test_splitter_finish() {
        let mut splitter = FrameSplitter::new();
        splitter.push("data: tail");
        assert_eq!(splitter.finish(), Some("data: tail".to_string()));
        assert_eq!(splitter.finish(), None);

        splitter.push("\n");
        assert_eq!(splitter.finish(), None);
    }
}
