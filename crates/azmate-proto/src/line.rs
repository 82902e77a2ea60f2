//! Line-based codec for tokio.
//!
//! Reads and writes terminator-delimited lines in a configurable charset.
//! Inbound lines longer than the limit are dropped with a warning instead
//! of failing the stream. Outbound lines are cut to the 510-byte payload
//! limit before the terminator is appended.

use bytes::BytesMut;
use encoding::Encoding;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::error::{self, ProtocolError};
use crate::MAX_PAYLOAD_LEN;

/// Default inbound line limit. Generous, since servers with message tags
/// or long NAMES pages exceed 512 bytes.
pub const DEFAULT_MAX_INBOUND: usize = 8191;

/// Line codec with charset support.
pub struct LineCodec {
    encoding: &'static Encoding,
    line_ending: String,
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
    /// Set while skipping the rest of an overlong line
    discarding: bool,
}

impl LineCodec {
    /// Create a codec for the given charset label (e.g. `"utf-8"`,
    /// `"iso-8859-1"`), writing `\r\n` line endings.
    pub fn new(label: &str) -> error::Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| ProtocolError::UnknownCharset(label.to_owned()))?;

        Ok(Self {
            encoding,
            line_ending: "\r\n".to_owned(),
            next_index: 0,
            max_len: DEFAULT_MAX_INBOUND,
            discarding: false,
        })
    }

    /// Use a different outbound line terminator.
    pub fn with_line_ending(mut self, line_ending: impl Into<String>) -> Self {
        self.line_ending = line_ending.into();
        self
    }

    /// Use a different inbound line limit.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Whether `label` names a charset this codec can use.
    pub fn is_known_charset(label: &str) -> bool {
        Encoding::for_label(label.trim().as_bytes()).is_some()
    }

    fn decode_line(&self, raw: &[u8]) -> String {
        let (text, _, _) = self.encoding.decode(raw);
        text.trim_end_matches(['\r', '\n']).to_owned()
    }

    /// Encode `line` so the result fits the payload limit.
    fn encode_bounded(&self, line: &str) -> Vec<u8> {
        // Every character encodes to at least one byte.
        let mut end = line
            .char_indices()
            .nth(MAX_PAYLOAD_LEN)
            .map_or(line.len(), |(i, _)| i);
        loop {
            let (bytes, _, _) = self.encoding.encode(&line[..end]);
            if bytes.len() <= MAX_PAYLOAD_LEN {
                return bytes.into_owned();
            }
            // Drop whole characters until it fits
            end -= 1;
            while !line.is_char_boundary(end) {
                end -= 1;
            }
        }
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if src.len() > self.max_len {
                    if !self.discarding {
                        warn!(limit = self.max_len, "dropping overlong inbound line");
                    }
                    self.discarding = true;
                    src.clear();
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > self.max_len {
                warn!(len = line.len(), limit = self.max_len, "dropping overlong inbound line");
                continue;
            }

            return Ok(Some(self.decode_line(&line)));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        // Only the first line is sent; embedded terminators would smuggle
        // extra commands.
        let line = msg.find(['\r', '\n']).map_or(msg.as_str(), |pos| &msg[..pos]);

        dst.extend_from_slice(&self.encode_bounded(line));
        dst.extend_from_slice(self.line_ending.as_bytes());
        Ok(())
    }
}
