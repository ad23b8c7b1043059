/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # FixTree Codec
//!
//! Dictionary-driven conversion between FIX wire messages and generic
//! message trees.
//!
//! - **Decode**: bytes are tokenized, structured into header, body, trailer
//!   and group instances, then mapped onto a [`MessageTree`] field by field.
//! - **Encode**: a tree is walked in schema declaration order and written
//!   back into a [`WireMessage`], optionally carrying the schema field order.
//!
//! [`Codec`] bundles a shared [`Dictionary`] with [`CodecOptions`] and is the
//! usual entry point.

pub mod convert;
pub mod decoder;
pub mod encoder;
pub mod options;
pub mod ordering;
pub mod parser;

pub use decoder::TreeDecoder;
pub use encoder::TreeEncoder;
pub use options::CodecOptions;

use bytes::{Bytes, BytesMut};
use fixtree_core::error::{DecodeError, EncodeError, FixError};
use fixtree_core::field::FieldRef;
use fixtree_core::tree::MessageTree;
use fixtree_dictionary::Dictionary;
use fixtree_tagvalue::decoder::{Decoder, SOH};
use fixtree_tagvalue::message::WireMessage;
use std::sync::Arc;

/// Shared dictionary plus codec flags.
#[derive(Debug, Clone)]
pub struct Codec {
    dictionary: Arc<Dictionary>,
    options: CodecOptions,
    delimiter: u8,
}

impl Codec {
    /// Creates a codec with default options and SOH delimiters.
    #[must_use]
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self {
            dictionary,
            options: CodecOptions::default(),
            delimiter: SOH,
        }
    }

    /// Replaces the options.
    #[must_use]
    pub const fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the field delimiter used for bytes in and out.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Returns the dictionary.
    #[inline]
    #[must_use]
    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    /// Returns the options.
    #[inline]
    #[must_use]
    pub const fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Tokenizes and structures a complete framed message.
    ///
    /// The root descriptor is resolved from MsgType.
    ///
    /// # Errors
    /// Returns `DecodeError` for framing problems, unknown MsgType codes or
    /// malformed group counts.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<WireMessage, DecodeError> {
        let raw = Decoder::new(bytes)
            .with_delimiter(self.delimiter)
            .with_checksum_validation(self.options.validate_checksum)
            .decode()?;
        let root = self.dictionary.message_for_msg_type(raw.msg_type())?;
        parser::parse(&self.dictionary, root, raw.fields())
    }

    /// Decodes a complete framed message into a tree.
    ///
    /// The tree's metadata carries the raw bytes, BeginString and admin flag.
    ///
    /// # Errors
    /// Returns `FixError::Decode` for any framing, structure or conversion
    /// failure.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<MessageTree, FixError> {
        let wire = self.parse_bytes(bytes)?;
        let mut tree = self.decode_wire(&wire)?;
        tree.metadata_mut().raw = Some(Bytes::copy_from_slice(bytes));
        Ok(tree)
    }

    /// Decodes an already structured wire message, resolving the root from MsgType.
    ///
    /// # Errors
    /// See [`TreeDecoder::decode_message`].
    pub fn decode_wire(&self, wire: &WireMessage) -> Result<MessageTree, DecodeError> {
        TreeDecoder::new(&self.dictionary, self.options).decode_message(wire)
    }

    /// Decodes a flat field sequence as the named descriptor.
    ///
    /// # Errors
    /// Returns a schema error if `name` is unknown, or any decode error.
    pub fn decode_fields(
        &self,
        name: &str,
        fields: &[FieldRef<'_>],
    ) -> Result<MessageTree, DecodeError> {
        let root = self.dictionary.message_id(name)?;
        let wire = parser::parse(&self.dictionary, root, fields)?;
        TreeDecoder::new(&self.dictionary, self.options).decode(&wire, root)
    }

    /// Decodes an unframed `tag=value` sequence as the named descriptor.
    ///
    /// # Errors
    /// Returns `DecodeError::Incomplete` if the input ends mid-field,
    /// `DecodeError::InvalidTag` for a non-numeric tag, or any error from
    /// [`decode_fields`](Self::decode_fields).
    pub fn decode_body(&self, name: &str, bytes: &[u8]) -> Result<MessageTree, DecodeError> {
        let mut decoder = Decoder::new(bytes).with_delimiter(self.delimiter);
        let mut fields: Vec<FieldRef<'_>> = Vec::new();
        while let Some(field) = decoder.try_next_field()? {
            fields.push(field);
        }
        let mut tree = self.decode_fields(name, &fields)?;
        tree.metadata_mut().raw = Some(Bytes::copy_from_slice(bytes));
        Ok(tree)
    }

    /// Encodes a tree into a wire message.
    ///
    /// # Errors
    /// See [`TreeEncoder::encode`].
    pub fn encode(&self, tree: &MessageTree) -> Result<WireMessage, EncodeError> {
        TreeEncoder::new(&self.dictionary, self.options).encode(tree)
    }

    /// Encodes a tree into a framed message.
    ///
    /// # Errors
    /// See [`TreeEncoder::encode`].
    pub fn encode_bytes(&self, tree: &MessageTree) -> Result<BytesMut, EncodeError> {
        Ok(self.encode(tree)?.to_bytes_with_delimiter(self.delimiter))
    }

    /// Encodes only the body of a tree.
    ///
    /// # Errors
    /// See [`TreeEncoder::encode`].
    pub fn encode_body(&self, tree: &MessageTree) -> Result<BytesMut, EncodeError> {
        Ok(self.encode(tree)?.body_bytes(self.delimiter))
    }
}
