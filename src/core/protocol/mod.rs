// src/core/protocol/mod.rs

//! The text-line command protocol: message values and the wire codec.

pub mod line_codec;
pub mod message;

pub use line_codec::{LineCodec, MAX_LINE_BYTES};
pub use message::{Message, MessageBuilder, SEQ_PARAM};
