//! Round Trip Example
//!
//! Decodes an order from a counter-party, runs it through a session filter,
//! and re-encodes it both in schema order and in the order it arrived in.

use chrono::Utc;
use fixtree::prelude::*;
use std::sync::Arc;
use tracing::{info, warn};

const FIX_VERSION: &str = "FIX.4.4";

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

fn build_schema() -> std::result::Result<Schema, SchemaError> {
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
                .with_field(FieldDescriptor::field("SendingTime", 52, ValueType::DateTime)),
        )?
        .with_message(
            MessageDescriptor::new(TRAILER)
                .with_field(FieldDescriptor::field("CheckSum", 10, ValueType::String)),
        )?
        .with_message(
            MessageDescriptor::new("NewOrderSingle")
                .with_msg_type("D")
                .with_field(
                    FieldDescriptor::field("ClOrdID", 11, ValueType::String)
                        .with_attribute(attributes::SUB_FILTER, "true"),
                )
                .with_field(
                    FieldDescriptor::field("Account", 1, ValueType::String)
                        .with_attribute(attributes::FILTER, "true"),
                )
                .with_field(FieldDescriptor::component("Instrument", "Instrument"))
                .with_field(
                    FieldDescriptor::field("Side", 54, ValueType::Char)
                        .with_value("1", "Buy")
                        .with_value("2", "Sell"),
                )
                .with_field(FieldDescriptor::field("OrderQty", 38, ValueType::Decimal))
                .with_field(FieldDescriptor::field("Price", 44, ValueType::Decimal))
                .with_field(FieldDescriptor::group("Parties", 453, "Party")),
        )?
        .with_message(
            MessageDescriptor::new("Instrument")
                .with_field(FieldDescriptor::field("Symbol", 55, ValueType::String)),
        )?
        .with_message(
            MessageDescriptor::new("Party")
                .with_field(FieldDescriptor::field("PartyID", 448, ValueType::String))
                .with_field(FieldDescriptor::field("PartyRole", 452, ValueType::Int)),
        )
}

fn counter_party_order() -> bytes::BytesMut {
    let sending_time = Utc::now().format("%Y%m%d-%H:%M:%S%.3f").to_string();
    let mut encoder = Encoder::new(FIX_VERSION);
    encoder.put_str(35, "D");
    encoder.put_str(49, "CLIENT");
    encoder.put_str(56, "BROKER");
    encoder.put_uint(34, 12);
    encoder.put_str(52, &sending_time);
    encoder.put_str(55, "IBM");
    encoder.put_str(11, "ORD-1");
    encoder.put_str(54, "1");
    encoder.put_str(38, "100");
    encoder.put_str(44, "187.25");
    encoder.put_str(1, "ACC-7");
    encoder.put_uint(453, 2);
    encoder.put_str(448, "DESK-A");
    encoder.put_uint(452, 3);
    encoder.put_str(448, "TRADER-B");
    encoder.put_str(7001, "vendor extension");
    encoder.finish()
}

fn printable(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\x01', "|")
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let dictionary = Arc::new(Dictionary::new(build_schema()?)?);
    let codec = Codec::new(Arc::clone(&dictionary))
        .with_options(CodecOptions::default().with_checksum_validation(true));

    let incoming = counter_party_order();
    info!("received {}", printable(&incoming));

    let wire = codec.parse_bytes(&incoming)?;
    let arrival_order = FieldOrder::capture(&wire);
    let order = codec.decode_wire(&wire)?;
    info!(
        message = order.name(),
        fields = order.len(),
        rejected = ?order.metadata().rejected_tags,
        "decoded"
    );
    if let Some(instrument) = order.get_message("Instrument") {
        info!("symbol {:?}", instrument.get_str("Symbol"));
    }
    for party in order.get_group("Parties").unwrap_or_default() {
        info!("party {:?} role {:?}", party.get_str("PartyID"), party.get_scalar("PartyRole"));
    }

    let filter = SchemaFilter::new(
        Arc::clone(&dictionary),
        FilterConfig::new().with_admissible("ACC-7"),
    )?;
    let session = SessionId::new(FIX_VERSION, "CLIENT", "BROKER");
    if !filter.accept(&session, &order) {
        warn!(%session, "order filtered out");
        return Ok(());
    }

    let schema_ordered = codec.encode_bytes(&order)?;
    info!("schema order  {}", printable(&schema_ordered));

    let replayed = codec
        .encode(&order)?
        .with_order(arrival_order)
        .to_bytes();
    info!("arrival order {}", printable(&replayed));

    Ok(())
}
