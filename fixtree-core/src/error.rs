/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the FixTree codec.
//!
//! This module provides a unified error hierarchy using `thiserror`. Every
//! failure carries enough context (tag, field, owning message and, when
//! decoding, the offending raw value) to render a diagnostic. None of these
//! errors are retried internally: they describe malformed wire data or a
//! malformed schema.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all FixTree operations.
///
/// Every variant wraps a plain-data error, so the whole hierarchy compares
/// and clones.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixError {
    /// Error while decoding wire data into a message tree.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error while encoding a message tree into wire data.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The schema is inconsistent.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Errors describing an inconsistent schema.
///
/// All variants are schema lookup failures: a name could not be resolved, or
/// resolving it would never terminate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// No message descriptor with the given name.
    #[error("unknown message descriptor: {0}")]
    UnknownMessage(String),

    /// No message descriptor for the given MsgType (tag 35) code.
    #[error("no message descriptor for msg type '{0}'")]
    UnknownMsgType(String),

    /// A complex field references a descriptor that does not exist.
    #[error("field {field} of {message} references unknown descriptor {reference}")]
    UnknownReference {
        /// Owning message descriptor.
        message: String,
        /// Field carrying the reference.
        field: String,
        /// The unresolved descriptor name.
        reference: String,
    },

    /// A complex field has no reference at all.
    #[error("complex field {field} of {message} has no reference")]
    MissingReference {
        /// Owning message descriptor.
        message: String,
        /// The complex field.
        field: String,
    },

    /// A component chain revisits a descriptor already on the current path.
    #[error("component cycle in {message}: {path}")]
    Cycle {
        /// Root message descriptor being indexed.
        message: String,
        /// Rendered path, e.g. `Order.Instrument.Instrument`.
        path: String,
    },

    /// A descriptor with the same name was already added.
    #[error("duplicate message descriptor: {0}")]
    DuplicateMessage(String),
}

/// Errors that occur while decoding wire data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Message buffer is incomplete, need more data.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// Invalid BeginString field (tag 8).
    #[error("invalid begin string: expected 8=FIX.x.y")]
    InvalidBeginString,

    /// Missing BodyLength field (tag 9).
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Invalid BodyLength value.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// Missing MsgType field (tag 35).
    #[error("missing msg type field (tag 35)")]
    MissingMsgType,

    /// Checksum mismatch between calculated and declared values.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum value.
        calculated: u8,
        /// Declared checksum value in message.
        declared: u8,
    },

    /// CheckSum (tag 10) is missing or not three digits.
    #[error("invalid checksum field: '{0}'")]
    InvalidChecksum(String),

    /// Invalid tag format (not a valid integer).
    #[error("invalid tag format: {0}")]
    InvalidTag(String),

    /// Invalid UTF-8 in a field value.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The wire tag has no schema entry for the message being decoded.
    #[error("unknown tag {tag} in message {message}")]
    UnknownTag {
        /// The offending tag.
        tag: u32,
        /// Root message descriptor name.
        message: String,
    },

    /// A raw value does not parse as the declared scalar type.
    #[error("invalid value '{value}' for tag {tag} ({field} in {message}): {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Field name from the schema.
        field: String,
        /// Owning message descriptor name.
        message: String,
        /// The raw wire value.
        value: String,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Wire structure contradicts the schema (e.g. group instances under a plain field).
    #[error("structure mismatch for tag {tag} in {message}: {reason}")]
    StructureMismatch {
        /// The offending tag.
        tag: u32,
        /// Root message descriptor name.
        message: String,
        /// Description of the mismatch.
        reason: String,
    },

    /// Schema lookup failed while decoding.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors that occur while encoding a message tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The group field has no wire tag of its own.
    #[error("group {field} in {message} has no wire tag")]
    MissingGroupTag {
        /// The group field.
        field: String,
        /// Owning message descriptor name.
        message: String,
    },

    /// No delimiter tag can be derived for a non-empty group.
    #[error("cannot resolve delimiter tag for group {field} in {message}")]
    UnresolvedGroupDelimiter {
        /// The group field.
        field: String,
        /// Owning message descriptor name.
        message: String,
    },

    /// A group instance does not carry the group's delimiter field.
    #[error("instance {index} of group {field} in {message} lacks delimiter tag {delimiter}")]
    MissingDelimiterField {
        /// The group field.
        field: String,
        /// Owning message descriptor name.
        message: String,
        /// Zero-based position of the instance in the group.
        index: usize,
        /// The tag every instance must open with.
        delimiter: u32,
    },

    /// A value's runtime type disagrees with the declared type.
    #[error("type mismatch for {field} in {message}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The field name.
        field: String,
        /// Owning message descriptor name.
        message: String,
        /// Declared type.
        expected: String,
        /// Runtime type found in the tree.
        found: String,
    },

    /// A value cannot be represented on the wire.
    #[error("invalid value for {field} in {message}: {reason}")]
    InvalidFieldValue {
        /// The field name.
        field: String,
        /// Owning message descriptor name.
        message: String,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Schema lookup failed while encoding.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
