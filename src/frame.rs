//! Incremental decoding of the server's framed response stream.
//!
//! The chat endpoint sends blank-line-delimited frames:
//!
//! ```text
//! data: first chunk of the answer
//!
//! data: [ERROR] something went wrong
//!
//! data: [END_OF_STREAM]
//! ```
//!
//! Network chunks arrive at arbitrary boundaries, so [`FrameDecoder`]
//! buffers raw bytes across calls and only decodes complete lines. A
//! multi-byte UTF-8 character split across two chunks is reassembled
//! before decoding rather than mangled per chunk.

use std::collections::VecDeque;

use crate::client::ClientError;

/// Prefix marking a payload line.
pub const DATA_PREFIX: &str = "data: ";

/// Payload marking successful end of stream. Never emitted as a frame's
/// content; it terminates decoding instead.
pub const END_OF_STREAM: &str = "[END_OF_STREAM]";

/// Prefix marking an in-band error payload.
pub const ERROR_PREFIX: &str = "[ERROR]";

/// One decoded frame from the response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Ordinary response text, to be appended in arrival order.
    Content(String),
    /// In-band error reported by the server. The text is the literal
    /// payload, `[ERROR]` prefix included.
    Error(String),
    /// The end-of-stream sentinel was observed.
    End,
}

/// Extract the payload from a `data: ` line.
///
/// Returns the remainder of the line after the prefix, verbatim. Lines
/// without the prefix carry no payload.
///
/// # Example
/// ```
/// use docchat::frame::parse_data_line;
///
/// assert_eq!(parse_data_line("data: hello"), Some("hello"));
/// assert_eq!(parse_data_line("data:  two spaces"), Some(" two spaces"));
/// assert_eq!(parse_data_line("comment"), None);
/// ```
pub fn parse_data_line(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX)
}

/// Check whether a payload is the end-of-stream sentinel.
///
/// # Example
/// ```
/// use docchat::frame::is_end_marker;
///
/// assert!(is_end_marker("[END_OF_STREAM]"));
/// assert!(!is_end_marker("[ERROR] boom"));
/// ```
pub fn is_end_marker(payload: &str) -> bool {
    payload == END_OF_STREAM
}

/// Classify a payload into a [`Frame`].
pub fn frame_from_payload(payload: &str) -> Frame {
    if is_end_marker(payload) {
        Frame::End
    } else if payload.starts_with(ERROR_PREFIX) {
        Frame::Error(payload.to_string())
    } else {
        Frame::Content(payload.to_string())
    }
}

/// Stateful decoder turning raw byte chunks into [`Frame`]s.
///
/// Feed each chunk as it arrives with [`feed`](FrameDecoder::feed); call
/// [`finish`](FrameDecoder::finish) once the byte stream closes to flush a
/// trailing payload line that never received its delimiter.
///
/// Decoding is chunk-boundary independent: any fragmentation of the same
/// bytes produces the same frames in the same order.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    finished: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the end-of-stream sentinel has been decoded. Further
    /// input is ignored.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one chunk of bytes, returning every frame completed by it.
    ///
    /// Frames are delimited by blank lines, so a payload line is complete
    /// once its line break arrives; the blank separator line is consumed
    /// and discarded. `\r\n` line endings are tolerated.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<VecDeque<Frame>, ClientError> {
        let mut frames = VecDeque::new();
        if self.finished {
            return Ok(frames);
        }

        self.buf.extend_from_slice(chunk);

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line_bytes: Vec<u8> = self.buf.drain(..=pos).collect();
            line_bytes.pop(); // the '\n'
            if line_bytes.last() == Some(&b'\r') {
                line_bytes.pop();
            }

            let line = String::from_utf8(line_bytes)?;
            if self.decode_line(&line, &mut frames) {
                self.buf.clear();
                break;
            }
        }

        Ok(frames)
    }

    /// Flush a trailing payload line after the byte stream has closed.
    ///
    /// The server normally terminates every frame with its delimiter, but
    /// a stream cut mid-frame may leave a complete `data:` line in the
    /// buffer with no final line break. Decode it rather than drop it.
    pub fn finish(&mut self) -> Result<Option<Frame>, ClientError> {
        if self.finished || self.buf.is_empty() {
            return Ok(None);
        }

        let mut line_bytes = std::mem::take(&mut self.buf);
        if line_bytes.last() == Some(&b'\r') {
            line_bytes.pop();
        }

        let line = String::from_utf8(line_bytes)?;
        match parse_data_line(&line) {
            Some(payload) => {
                let frame = frame_from_payload(payload);
                if matches!(frame, Frame::End) {
                    self.finished = true;
                }
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }

    /// Decode one complete line. Returns true when the sentinel was seen.
    fn decode_line(&mut self, line: &str, frames: &mut VecDeque<Frame>) -> bool {
        // Blank separator lines and non-payload lines carry nothing.
        let Some(payload) = parse_data_line(line) else {
            return false;
        };

        let frame = frame_from_payload(payload);
        if matches!(frame, Frame::End) {
            self.finished = true;
            frames.push_back(frame);
            return true;
        }

        frames.push_back(frame);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decode a whole byte slice in one call plus the final flush.
    fn decode_all(bytes: &[u8]) -> Vec<Frame> {
        let mut decoder = FrameDecoder::new();
        let mut frames: Vec<Frame> = decoder.feed(bytes).unwrap().into();
        if let Some(frame) = decoder.finish().unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_parse_data_line() {
        assert_eq!(parse_data_line("data: hello"), Some("hello"));
        assert_eq!(parse_data_line("data: "), Some(""));
        // Payload is verbatim, interior whitespace preserved.
        assert_eq!(parse_data_line("data:   spaced  "), Some("  spaced  "));
        assert_eq!(parse_data_line("invalid"), None);
        assert_eq!(parse_data_line(""), None);
    }

    #[test]
    fn test_is_end_marker() {
        assert!(is_end_marker("[END_OF_STREAM]"));
        assert!(!is_end_marker(""));
        assert!(!is_end_marker("[END_OF_STREAM] trailing"));
    }

    #[test]
    fn test_frame_classification() {
        assert_eq!(
            frame_from_payload("plain text"),
            Frame::Content("plain text".to_string())
        );
        assert_eq!(
            frame_from_payload("[ERROR] boom"),
            Frame::Error("[ERROR] boom".to_string())
        );
        assert_eq!(frame_from_payload("[END_OF_STREAM]"), Frame::End);
    }

    #[test]
    fn test_single_chunk_multiple_frames() {
        let frames = decode_all(b"data: one\n\ndata: two\n\ndata: [END_OF_STREAM]\n\n");
        assert_eq!(
            frames,
            vec![
                Frame::Content("one".to_string()),
                Frame::Content("two".to_string()),
                Frame::End,
            ]
        );
    }

    #[test]
    fn test_nothing_after_sentinel_is_decoded() {
        let frames = decode_all(b"data: [END_OF_STREAM]\n\ndata: late\n\n");
        assert_eq!(frames, vec![Frame::End]);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: hel").unwrap().is_empty());
        let frames = decoder.feed(b"lo\n\n").unwrap();
        assert_eq!(
            Vec::from(frames),
            vec![Frame::Content("hello".to_string())]
        );
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let bytes = "data: caf\u{e9} au lait\n\n".as_bytes();
        // '\u{e9}' is two bytes in UTF-8; split right between them.
        let split = bytes.iter().position(|&b| b >= 0x80).unwrap() + 1;

        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(&bytes[..split]).unwrap().is_empty());
        let frames = decoder.feed(&bytes[split..]).unwrap();
        assert_eq!(
            Vec::from(frames),
            vec![Frame::Content("caf\u{e9} au lait".to_string())]
        );
    }

    #[test]
    fn test_chunk_boundary_independence() {
        let bytes = "data: premi\u{e8}re\n\ndata: [ERROR] boom\n\ndata: fin\n\ndata: [END_OF_STREAM]\n\n"
            .as_bytes();
        let expected = decode_all(bytes);

        for split in 0..=bytes.len() {
            let mut decoder = FrameDecoder::new();
            let mut frames: Vec<Frame> = decoder.feed(&bytes[..split]).unwrap().into();
            frames.extend(decoder.feed(&bytes[split..]).unwrap());
            if let Some(frame) = decoder.finish().unwrap() {
                frames.push(frame);
            }
            assert_eq!(frames, expected, "split at byte {}", split);
        }
    }

    #[test]
    fn test_crlf_delimiters() {
        let frames = decode_all(b"data: one\r\n\r\ndata: [END_OF_STREAM]\r\n\r\n");
        assert_eq!(frames, vec![Frame::Content("one".to_string()), Frame::End]);
    }

    #[test]
    fn test_finish_flushes_trailing_payload() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: cut off").unwrap().is_empty());
        assert_eq!(
            decoder.finish().unwrap(),
            Some(Frame::Content("cut off".to_string()))
        );
        // Second flush is a no-op.
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn test_finish_ignores_partial_non_payload() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"dat").unwrap().is_empty());
        assert_eq!(decoder.finish().unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8_in_complete_line() {
        let mut decoder = FrameDecoder::new();
        let result = decoder.feed(b"data: \xff\xfe\n\n");
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        let frames = decode_all(b"event: ping\n\ndata: real\n\ndata: [END_OF_STREAM]\n\n");
        assert_eq!(
            frames,
            vec![Frame::Content("real".to_string()), Frame::End]
        );
    }
}
