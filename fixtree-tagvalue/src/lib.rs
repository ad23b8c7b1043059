/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixTree Tag-Value
//!
//! FIX tag=value plumbing for the FixTree codec.
//!
//! ## Features
//!
//! - **Zero-copy tokenizing**: field values reference the original buffer
//! - **SIMD-accelerated**: uses `memchr` for delimiter search
//! - **Configurable delimiter**: SOH on the wire, `|` in logs and tests
//! - **Wire containers**: header/body/trailer field maps with nested groups
//! - **Field ordering**: optional per-section tag order applied on serialization

pub mod checksum;
pub mod decoder;
pub mod encoder;
pub mod message;

pub use checksum::calculate_checksum;
pub use decoder::{Decoder, RawMessage, SOH};
pub use encoder::Encoder;
pub use message::{Entry, FieldMap, FieldOrder, WireField, WireGroup, WireMessage};
