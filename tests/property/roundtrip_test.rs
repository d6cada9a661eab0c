// tests/property/roundtrip_test.rs

//! Property-based tests for the wire format: rendering a message and parsing
//! it back must reproduce the original, and the line codec must reassemble
//! whatever line boundaries the network delivers.

use bytes::{BufMut, BytesMut};
use gameframe::core::Message;
use gameframe::core::protocol::LineCodec;
use proptest::prelude::*;
use std::collections::BTreeMap;
use tokio_util::codec::Decoder;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_message_to_line_parse_roundtrip(
        command in "[a-z0-9_-]{1,20}",
        params in prop::collection::btree_map(
            "[a-zA-Z0-9_-]{1,10}",
            "[!-~]{1,20}",
            0..8,
        )
    ) {
        let mut builder = Message::builder(&command).unwrap();
        for (key, value) in &params {
            builder = builder.param(key, value).unwrap();
        }
        let message = builder.build();

        let reparsed = Message::parse(&message.to_line()).unwrap();
        prop_assert_eq!(&message, &reparsed);
        prop_assert_eq!(reparsed.command(), command.as_str());
        let reparsed_params: BTreeMap<String, String> = reparsed.params().clone();
        prop_assert_eq!(reparsed_params, params);
    }

    #[test]
    fn test_error_response_is_always_parseable(
        code in "[A-Z_]{1,20}",
        message in ".{0,100}",
        seq in prop::option::of("[0-9]{1,9}"),
    ) {
        let response = Message::error(&code, &message, seq.as_deref());
        let reparsed = Message::parse(&response.to_line()).unwrap();
        prop_assert_eq!(reparsed.command(), "error");
        prop_assert_eq!(reparsed.param("code"), Some(code.as_str()));
        prop_assert_eq!(reparsed.seq(), seq.as_deref());
    }

    #[test]
    fn test_codec_reassembles_arbitrary_chunking(
        lines in prop::collection::vec("[ -~]{0,100}", 1..10),
        chunk_size in 1usize..32,
    ) {
        let mut wire = Vec::new();
        for line in &lines {
            wire.extend_from_slice(line.as_bytes());
            wire.push(b'\n');
        }

        let mut codec = LineCodec::default();
        let mut buf = BytesMut::new();
        let mut decoded = Vec::new();
        for chunk in wire.chunks(chunk_size) {
            buf.put_slice(chunk);
            while let Some(line) = codec.decode(&mut buf).unwrap() {
                decoded.push(line);
            }
        }
        prop_assert_eq!(decoded, lines);
    }
}
