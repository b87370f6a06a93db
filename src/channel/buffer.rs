//! Output buffer with tail-search prompt detection.
//!
//! Prompt patterns only ever match at the end of the stream, so the buffer
//! searches just the last N bytes on each read instead of rescanning the
//! whole output. For large outputs (full running configs, big neighbor
//! tables) this keeps the read loop cheap.

use regex::bytes::Regex;

/// Buffer accumulating session output while watching the tail for a prompt.
#[derive(Debug)]
pub struct OutputBuffer {
    buffer: Vec<u8>,

    /// How many bytes from the end to search for the prompt pattern.
    search_depth: usize,
}

impl OutputBuffer {
    /// Create a new buffer searching the last `search_depth` bytes.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
        }
    }

    /// Append newly read session data.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Check whether the pattern matches within the buffer tail.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern.is_match(&self.buffer[start..])
    }

    /// Consume the buffer into a lossily decoded string.
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    /// Current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been read yet.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_found_in_tail() {
        let mut buffer = OutputBuffer::new(20);
        buffer.extend(&[b'x'; 200]);
        buffer.extend(b"\nrouter#");

        let pattern = Regex::new(r"router#\s*$").unwrap();
        assert!(buffer.tail_contains(&pattern));
    }

    #[test]
    fn test_prompt_outside_search_depth_ignored() {
        let mut buffer = OutputBuffer::new(10);
        buffer.extend(b"router#");
        buffer.extend(&[b'x'; 200]);

        let pattern = Regex::new(r"router#").unwrap();
        assert!(!buffer.tail_contains(&pattern));
    }

    #[test]
    fn test_into_string() {
        let mut buffer = OutputBuffer::new(100);
        buffer.extend(b"hello");
        assert_eq!(buffer.into_string(), "hello");
    }
}
