//! Line-based codec for tokio.
//!
//! Inbound bytes are split on `\r\n`, `\r` or `\n`; a trailing fragment
//! without a terminator stays buffered until more bytes arrive, and empty
//! lines are skipped. Decoding and encoding go through the configured
//! text encoding.

use bytes::BytesMut;
use encoding::Encoding;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Upper bound on a single buffered line, terminator excluded.
pub const MAX_LINE_LEN: usize = 8191;

/// Line codec yielding decoded lines without their terminators.
#[derive(Debug)]
pub struct LineCodec {
    encoding: &'static Encoding,
    /// Index of next byte to check for a terminator
    next_index: usize,
    max_len: usize,
}

impl LineCodec {
    /// Create a new codec with the specified encoding.
    ///
    /// # Arguments
    /// * `label` - Encoding label (e.g., "utf-8", "iso-8859-1")
    pub fn new(label: &str) -> error::Result<Self> {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| error::ProtocolError::UnknownEncoding(label.to_owned()))?;
        Ok(Self {
            encoding,
            next_index: 0,
            max_len: MAX_LINE_LEN,
        })
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(label: &str, max_len: usize) -> error::Result<Self> {
        let mut codec = Self::new(label)?;
        codec.max_len = max_len;
        Ok(codec)
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\n' || *b == b'\r')
            else {
                // No complete line yet - remember where we stopped
                self.next_index = src.len();
                if src.len() > self.max_len {
                    return Err(error::ProtocolError::MessageTooLong(src.len()));
                }
                return Ok(None);
            };

            let end = self.next_index + offset;
            let line = src.split_to(end + 1);
            self.next_index = 0;

            let content = &line[..end];
            if content.is_empty() {
                continue;
            }
            if content.len() > self.max_len {
                return Err(error::ProtocolError::MessageTooLong(content.len()));
            }

            let (text, _had_errors) = self.encoding.decode_without_bom_handling(content);
            return Ok(Some(text.into_owned()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None => {
                if !src.is_empty() {
                    tracing::debug!(bytes = src.len(), "discarding unterminated line at EOF");
                    src.clear();
                    self.next_index = 0;
                }
                Ok(None)
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    /// Encode one line, appending CRLF.
    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        if msg.contains(['\r', '\n']) {
            return Err(error::ProtocolError::EmbeddedLineBreak);
        }
        let (bytes, _enc, _had_errors) = self.encoding.encode(&msg);
        dst.reserve(bytes.len() + 2);
        dst.extend_from_slice(&bytes);
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
