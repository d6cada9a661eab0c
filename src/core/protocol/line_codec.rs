// src/core/protocol/line_codec.rs

//! A `tokio_util::codec` implementation framing the byte stream into UTF-8
//! lines.
//!
//! Lines are delimited by `\n` with an optional preceding `\r`. A frame above
//! `MAX_LINE_BYTES`, or one that is not valid UTF-8, is a protocol violation:
//! the decoder returns an error and the connection is closed. Buffering is
//! bounded by the same limit.

use crate::core::GameError;
use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

/// Maximum size of a single inbound line, excluding the terminator.
pub const MAX_LINE_BYTES: usize = 8192;

/// Frames `\n`-delimited UTF-8 lines in both directions.
#[derive(Debug, Default)]
pub struct LineCodec {
    // Offset of the first unscanned byte, so repeated decode calls over a
    // growing buffer stay linear in the input.
    next_index: usize,
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = GameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, GameError> {
        if let Some(offset) = src[self.next_index..].iter().position(|&b| b == b'\n') {
            let newline_index = self.next_index + offset;
            self.next_index = 0;

            let mut line = src.split_to(newline_index + 1);
            line.truncate(line.len() - 1);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            if line.len() > MAX_LINE_BYTES {
                return Err(GameError::Protocol(format!(
                    "line of {} bytes exceeds the {MAX_LINE_BYTES} byte limit",
                    line.len()
                )));
            }

            let text = String::from_utf8(line.to_vec())?;
            Ok(Some(text))
        } else {
            if src.len() > MAX_LINE_BYTES {
                return Err(GameError::Protocol(format!(
                    "unterminated line of {} bytes exceeds the {MAX_LINE_BYTES} byte limit",
                    src.len()
                )));
            }
            self.next_index = src.len();
            Ok(None)
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = GameError;

    /// Writes the text as-is; callers are responsible for the trailing `\n`
    /// (the session send primitive appends one when absent).
    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), GameError> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}
