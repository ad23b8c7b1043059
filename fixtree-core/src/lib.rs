/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixTree Core
//!
//! Core types, the generic message tree, and error definitions for the
//! FixTree dictionary-driven FIX codec.
//!
//! This crate provides the building blocks shared by every FixTree crate:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Field references**: Zero-copy `FieldRef` and well-known tag numbers
//! - **Values**: `ValueType` and the typed `Scalar` leaf
//! - **Message tree**: `MessageTree`, `FieldValue`, and `Metadata`
//! - **Time formats**: FIX date/time rendering with selectable precision

pub mod error;
pub mod field;
pub mod time;
pub mod tree;
pub mod value;

pub use error::{DecodeError, EncodeError, FixError, Result, SchemaError};
pub use field::{FieldRef, tags};
pub use time::TimePrecision;
pub use tree::{FieldValue, MessageTree, Metadata};
pub use value::{Scalar, ValueType};
