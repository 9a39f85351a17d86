//! Line framing for raw log bytes
//!
//! Build logs are not guaranteed to be valid UTF-8, so lines are decoded
//! lossily: bad bytes become U+FFFD and scanning carries on.

use std::io;

use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Longest line handed to the scanner, in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Decode one line of raw bytes, dropping a trailing `\r`
pub fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Newline-delimited decoder that never fails on content
///
/// A line longer than `max_length` bytes is cut at the limit and the rest of
/// it, up to the next newline, is skipped. Only I/O errors end a stream.
#[derive(Clone, Debug)]
pub struct LogLineCodec {
    max_length: usize,

    /// Where to resume the newline search in the buffer
    next_index: usize,

    /// Skipping the remainder of a cut line
    discarding: bool,
}

impl LogLineCodec {
    /// Create a codec with the default line cap
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a codec that cuts lines at `max_length` bytes
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
            next_index: 0,
            discarding: false,
        }
    }

    /// Line cap in bytes
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

impl Default for LogLineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LogLineCodec {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<String>> {
        loop {
            let newline = buf[self.next_index..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.next_index + offset);

            match newline {
                Some(end) => {
                    let line = buf.split_to(end + 1);
                    self.next_index = 0;
                    if self.discarding {
                        self.discarding = false;
                        continue;
                    }
                    return Ok(Some(decode_line(&line[..end.min(self.max_length)])));
                }
                None if self.discarding => {
                    buf.clear();
                    self.next_index = 0;
                    return Ok(None);
                }
                None if buf.len() > self.max_length => {
                    let line = buf.split_to(self.max_length);
                    self.next_index = 0;
                    self.discarding = true;
                    return Ok(Some(decode_line(&line)));
                }
                None => {
                    self.next_index = buf.len();
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<String>> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }

        self.next_index = 0;
        if buf.is_empty() || self.discarding {
            buf.clear();
            self.discarding = false;
            return Ok(None);
        }

        let line = buf.split();
        Ok(Some(decode_line(&line)))
    }
}
