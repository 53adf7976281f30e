//! Incremental Server-Sent Events decoding
//!
//! Network chunks can split lines (and multi-byte characters) anywhere, so
//! bytes are buffered until a full line is available.

/// Decodes `data:` payloads out of an SSE byte stream
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a network chunk, returning the data payload of every event it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(data) = self.handle_line(line) {
                events.push(data);
            }
        }
        events
    }

    /// Flush whatever is left once the underlying stream has ended
    pub fn finish(&mut self) -> Vec<String> {
        let mut events = Vec::new();

        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            let line = line.trim_end_matches(['\r', '\n']);
            if let Some(data) = self.handle_line(line) {
                events.push(data);
            }
        }

        if let Some(data) = self.dispatch() {
            events.push(data);
        }
        events
    }

    fn handle_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        // Comment line
        if line.starts_with(':') {
            return None;
        }
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            self.data_lines.push(value.to_string());
        }
        // event:, id: and retry: carry nothing we use
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data_lines.is_empty() {
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: {\"a\":1}\n\n");
        assert_eq!(events, vec![r#"{"a":1}"#.to_string()]);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: hel").is_empty());
        assert!(decoder.push(b"lo\r\n").is_empty());
        assert_eq!(decoder.push(b"\r\n"), vec!["hello".to_string()]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let bytes = "data: café\n\n".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;

        assert!(decoder.push(&bytes[..split]).is_empty());
        assert_eq!(decoder.push(&bytes[split..]), vec!["café".to_string()]);
    }

    #[test]
    fn test_comments_and_other_fields_ignored() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": keep-alive\nevent: message\nid: 7\ndata: x\n\n");
        assert_eq!(events, vec!["x".to_string()]);
    }

    #[test]
    fn test_multiline_data_joined() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: one\ndata: two\n\n");
        assert_eq!(events, vec!["one\ntwo".to_string()]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: [DONE]").is_empty());
        assert_eq!(decoder.finish(), vec!["[DONE]".to_string()]);
        assert!(decoder.finish().is_empty());
    }
}
