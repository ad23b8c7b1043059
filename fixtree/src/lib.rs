/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixTree
//!
//! A dictionary-driven FIX tag=value codec built around generic message trees.
//!
//! Instead of generated per-message types, FixTree decodes any message of a
//! loaded dictionary into a [`MessageTree`](core::MessageTree): a named node
//! holding scalars, nested components and repeating groups. Trees encode back
//! to the wire in schema order, or in the exact order a counter-party used.
//!
//! ## Features
//!
//! - **Schema index**: `(tag, message)` lookup through nested components
//! - **Typed scalars**: booleans, integers, decimals, chars, dates and times
//! - **Tolerant decoding**: unknown tags dropped and recorded, or rejected on demand
//! - **Field ordering**: schema order or a captured wire order on re-encode
//! - **Session filtering**: keep/drop decisions from schema attributes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fixtree::prelude::*;
//! use std::sync::Arc;
//!
//! let dictionary = Arc::new(Dictionary::new(schema)?);
//! let codec = Codec::new(dictionary).with_delimiter(b'|');
//!
//! let order = codec.decode_body("NewOrderSingle", b"11=A1|54=1|")?;
//! assert_eq!(order.get_str("Side"), Some("Buy"));
//! let bytes = codec.encode_bytes(&order)?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Message tree, scalar values, and error definitions
//! - [`dictionary`]: Schema descriptors, tag index, and dictionary
//! - [`tagvalue`]: Tag=value tokenizing, serialization, and wire containers
//! - [`codec`]: Tree decoding and encoding
//! - [`filter`]: Schema-driven session filtering

pub mod core {
    //! Message tree, scalar values, and error definitions.
    pub use fixtree_core::*;
}

pub mod dictionary {
    //! Schema descriptors, tag index, and dictionary.
    pub use fixtree_dictionary::*;
}

pub mod tagvalue {
    //! Tag=value tokenizing, serialization, and wire containers.
    pub use fixtree_tagvalue::*;
}

pub mod codec {
    //! Tree decoding and encoding.
    pub use fixtree_codec::*;
}

pub mod filter {
    //! Schema-driven session filtering.
    pub use fixtree_filter::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use fixtree_core::{
        DecodeError, EncodeError, FieldRef, FieldValue, FixError, MessageTree, Metadata, Result,
        Scalar, SchemaError, TimePrecision, ValueType,
    };

    // Dictionary
    pub use fixtree_dictionary::{
        Dictionary, EntityKind, FieldDescriptor, HEADER, MessageDescriptor, MessageId, Schema,
        TRAILER, attributes,
    };

    // Tag-value
    pub use fixtree_tagvalue::{
        Decoder, Encoder, FieldMap, FieldOrder, WireGroup, WireMessage, calculate_checksum,
    };

    // Codec
    pub use fixtree_codec::{Codec, CodecOptions, TreeDecoder, TreeEncoder};

    // Filter
    pub use fixtree_filter::{FilterConfig, SchemaFilter, SessionId};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::sync::Arc;

    fn schema() -> Schema {
        Schema::new("FIX44")
            .with_uri("fixtree://fix44")
            .with_message(
                MessageDescriptor::new(HEADER)
                    .with_field(FieldDescriptor::field("BeginString", 8, ValueType::String))
                    .with_field(FieldDescriptor::field("BodyLength", 9, ValueType::Int))
                    .with_field(FieldDescriptor::field("MsgType", 35, ValueType::String))
                    .with_field(FieldDescriptor::field("SenderCompID", 49, ValueType::String))
                    .with_field(FieldDescriptor::field("TargetCompID", 56, ValueType::String))
                    .with_field(FieldDescriptor::field("MsgSeqNum", 34, ValueType::Int))
                    .with_field(FieldDescriptor::field(
                        "SendingTime",
                        52,
                        ValueType::DateTime,
                    )),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new(TRAILER)
                    .with_field(FieldDescriptor::field("CheckSum", 10, ValueType::String)),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("Order")
                    .with_msg_type("D")
                    .with_field(
                        FieldDescriptor::field("ClOrdID", 11, ValueType::String)
                            .with_attribute(attributes::SUB_FILTER, "true"),
                    )
                    .with_field(
                        FieldDescriptor::field("Account", 1, ValueType::String)
                            .with_attribute(attributes::FILTER, "true"),
                    )
                    .with_field(
                        FieldDescriptor::field("Side", 54, ValueType::Char)
                            .with_value("1", "Buy")
                            .with_value("2", "Sell"),
                    )
                    .with_field(FieldDescriptor::group("Parties", 453, "Party"))
                    .with_field(
                        FieldDescriptor::field("ExpireTime", 126, ValueType::DateTime)
                            .with_attribute(attributes::SECONDS_ONLY, "true"),
                    )
                    .with_field(FieldDescriptor::field(
                        "TransactTime",
                        60,
                        ValueType::DateTime,
                    )),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("Party")
                    .with_field(FieldDescriptor::field("PartyID", 448, ValueType::String))
                    .with_field(FieldDescriptor::field("PartyRole", 452, ValueType::Int)),
            )
            .unwrap()
            .with_message(
                MessageDescriptor::new("ExecutionReport")
                    .with_msg_type("8")
                    .with_field(
                        FieldDescriptor::field("ClOrdID", 11, ValueType::String)
                            .with_attribute(attributes::SUB_FILTER, "true"),
                    )
                    .with_field(FieldDescriptor::field("ExecID", 17, ValueType::String)),
            )
            .unwrap()
    }

    fn dictionary() -> Arc<Dictionary> {
        Arc::new(Dictionary::new(schema()).unwrap())
    }

    fn codec(options: CodecOptions) -> Codec {
        Codec::new(dictionary())
            .with_options(options)
            .with_delimiter(b'|')
    }

    fn party(id: &str) -> MessageTree {
        MessageTree::new("FIX44", "Party").with("PartyID", id)
    }

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_micro_opt(9, 30, 15, 123_456)
            .unwrap()
    }

    #[test]
    fn test_order_example_decodes_and_re_encodes() {
        let codec = codec(CodecOptions::default().with_ordering_fields(true));
        let input = b"11=A1|54=1|453=2|448=X|448=Y|";
        let tree = codec.decode_body("Order", input).unwrap();

        let expected = MessageTree::new("FIX44", "Order")
            .with("ClOrdID", "A1")
            .with("Side", "Buy")
            .with("Parties", vec![party("X"), party("Y")]);
        assert_eq!(tree, expected);
        assert_eq!(tree.metadata().raw.as_deref(), Some(&input[..]));

        assert_eq!(&codec.encode_body(&tree).unwrap()[..], &input[..]);
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let codec = codec(CodecOptions::default().with_skip_tags(true));
        let sent = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(9, 30, 15, 123)
            .unwrap();
        let header = MessageTree::new("FIX44", HEADER)
            .with("BeginString", "FIX.4.2")
            .with("MsgType", "D")
            .with("SenderCompID", "CLIENT")
            .with("TargetCompID", "BROKER")
            .with("SendingTime", sent);
        let order = MessageTree::new("FIX44", "Order")
            .with(HEADER, header)
            .with("ClOrdID", "A1")
            .with("Account", "ACC1")
            .with("Side", "Sell")
            .with(
                "Parties",
                vec![party("X").with("PartyRole", 3), party("Y")],
            )
            .with("TransactTime", sent);

        let bytes = codec.encode_bytes(&order).unwrap();
        assert!(bytes.starts_with(b"8=FIX.4.2|"));

        let decoded = codec.decode_bytes(&bytes).unwrap();
        assert_eq!(decoded, order);
        assert_eq!(decoded.metadata().protocol.as_deref(), Some("FIX.4.2"));
    }

    #[test]
    fn test_counter_party_order_is_replayed() {
        let mut encoder = Encoder::new("FIX.4.4").with_delimiter(b'|');
        encoder.put_str(35, "D");
        encoder.put_str(49, "CLIENT");
        encoder.put_str(56, "BROKER");
        encoder.put_uint(34, 5);
        encoder.put_str(54, "1");
        encoder.put_str(11, "A1");
        encoder.put_str(1, "ACC1");
        let original = encoder.finish();

        let codec = codec(CodecOptions::default().with_checksum_validation(true));
        let wire = codec.parse_bytes(&original).unwrap();
        let captured = FieldOrder::capture(&wire);
        let tree = codec.decode_wire(&wire).unwrap();

        // Schema order differs from the counter-party's.
        let schema_ordered = codec.encode_bytes(&tree).unwrap();
        assert_ne!(&schema_ordered[..], &original[..]);

        let replayed = codec
            .encode(&tree)
            .unwrap()
            .with_order(captured)
            .to_bytes_with_delimiter(b'|');
        assert_eq!(&replayed[..], &original[..]);
    }

    #[test]
    fn test_unknown_tags_tolerated_unless_verified() {
        let input = b"11=A1|9999=x|54=2|";

        let tree = codec(CodecOptions::default())
            .decode_body("Order", input)
            .unwrap();
        assert_eq!(tree.get_str("ClOrdID"), Some("A1"));
        assert_eq!(tree.get_str("Side"), Some("Sell"));
        assert_eq!(tree.metadata().rejected_tags, vec![9999]);

        let strict = codec(CodecOptions::default().with_verify_tags(true));
        assert_eq!(
            strict.decode_body("Order", input),
            Err(DecodeError::UnknownTag {
                tag: 9999,
                message: "Order".to_string()
            })
        );
    }

    #[test]
    fn test_group_cardinality() {
        let codec = codec(CodecOptions::default());

        let three = codec
            .decode_body("Order", b"11=A1|453=3|448=P1|448=P2|448=P3|54=1|")
            .unwrap();
        let parties = three.get_group("Parties").unwrap();
        assert_eq!(parties.len(), 3);
        assert_eq!(parties[2].get_str("PartyID"), Some("P3"));

        let none = codec.decode_body("Order", b"11=A1|453=0|54=1|").unwrap();
        assert!(!none.contains("Parties"));
        assert_eq!(none.len(), 2);
    }

    #[test]
    fn test_precision_flags_and_seconds_only() {
        let order = MessageTree::new("FIX44", "Order")
            .with("ExpireTime", stamp())
            .with("TransactTime", stamp());

        let body = |options: CodecOptions| {
            let bytes = codec(options).encode_body(&order).unwrap();
            String::from_utf8(bytes.to_vec()).unwrap()
        };

        assert_eq!(
            body(CodecOptions::default()),
            "126=20240305-09:30:15|60=20240305-09:30:15.123|"
        );
        assert_eq!(
            body(CodecOptions::default().with_microseconds(true)),
            "126=20240305-09:30:15|60=20240305-09:30:15.123456|"
        );
        assert_eq!(
            body(CodecOptions::default().with_milliseconds(false)),
            "126=20240305-09:30:15|60=20240305-09:30:15|"
        );
    }

    #[test]
    fn test_filter_retroactive_admission() {
        let dictionary = dictionary();
        let codec = Codec::new(Arc::clone(&dictionary)).with_delimiter(b'|');
        let filter =
            SchemaFilter::new(dictionary, FilterConfig::new().with_admissible("ACC1")).unwrap();
        let session = SessionId::new("FIX.4.4", "CLIENT", "BROKER");

        let order = codec.decode_body("Order", b"11=A1|1=ACC1|54=1|").unwrap();
        assert!(filter.accept(&session, &order));

        let fill = codec
            .decode_body("ExecutionReport", b"11=A1|17=E1|")
            .unwrap();
        assert!(filter.accept(&session, &fill));

        let unrelated = codec
            .decode_body("ExecutionReport", b"11=B2|17=E2|")
            .unwrap();
        assert!(!filter.accept(&session, &unrelated));
    }

    #[test]
    fn test_encode_errors_surface() {
        let codec = codec(CodecOptions::default());
        let bad = MessageTree::new("FIX44", "Order").with("Side", 7);
        assert!(matches!(
            codec.encode(&bad),
            Err(EncodeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            codec.encode(&MessageTree::new("FIX44", "Missing")),
            Err(EncodeError::Schema(SchemaError::UnknownMessage(_)))
        ));
    }

    #[test]
    fn test_unknown_tag_inside_group_instance() {
        let input = b"11=A1|453=2|448=X|9999=z|452=3|448=Y|452=4|54=1|";

        let tree = codec(CodecOptions::default())
            .decode_body("Order", input)
            .unwrap();
        let parties = tree.get_group("Parties").unwrap();
        assert_eq!(parties.len(), 2);
        assert_eq!(parties[0].get_scalar("PartyRole"), Some(&Scalar::Int(3)));
        assert_eq!(parties[1].get_scalar("PartyRole"), Some(&Scalar::Int(4)));
        assert_eq!(tree.get_str("Side"), Some("Buy"));
        assert_eq!(tree.metadata().rejected_tags, vec![9999]);

        let strict = codec(CodecOptions::default().with_verify_tags(true));
        assert_eq!(
            strict.decode_body("Order", input),
            Err(DecodeError::UnknownTag {
                tag: 9999,
                message: "Party".to_string()
            })
        );
    }

    #[test]
    fn test_raw_passthrough_round_trip() {
        let codec = codec(CodecOptions::default().with_ignore_field_type(true));
        let input = b"11=A1|54=1|453=1|448=X|452=x1|60=whenever|";

        let tree = codec.decode_body("Order", input).unwrap();
        assert_eq!(tree.get_str("TransactTime"), Some("whenever"));
        assert_eq!(&codec.encode_body(&tree).unwrap()[..], &input[..]);
    }

    #[test]
    fn test_group_instance_missing_delimiter_fails_to_encode() {
        let order = MessageTree::new("FIX44", "Order").with(
            "Parties",
            vec![MessageTree::new("FIX44", "Party").with("PartyRole", 3), party("Y")],
        );
        assert!(matches!(
            codec(CodecOptions::default()).encode(&order),
            Err(EncodeError::MissingDelimiterField { index: 0, delimiter: 448, .. })
        ));
    }
}
