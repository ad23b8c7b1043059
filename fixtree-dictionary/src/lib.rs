/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixTree Dictionary
//!
//! Schema descriptors and dictionary management for the FixTree codec.
//!
//! This crate provides:
//! - **Schema definitions**: Field and message descriptors held in an arena
//! - **Tag index**: `(tag, message)` lookup with component paths and cycle detection
//! - **Dictionary**: Immutable schema plus derived tables, shareable across threads
//!
//! Dictionary files are parsed elsewhere; descriptors are either built with
//! the fluent constructors or deserialized with `serde`.

pub mod dictionary;
pub mod index;
pub mod schema;

pub use dictionary::Dictionary;
pub use index::{FieldPath, IndexEntry, SchemaIndex};
pub use schema::{
    EntityKind, EnumValue, FieldDescriptor, FieldHandle, HEADER, MessageDescriptor, MessageId,
    Schema, TRAILER, attributes,
};
