/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX message encoder.
//!
//! Fields are appended to a body buffer in `tag=value` form. [`Encoder::finish`]
//! frames the body with BeginString, BodyLength and CheckSum, while
//! [`Encoder::into_body`] returns the body alone.

use crate::checksum::{calculate_checksum, format_checksum};
use crate::decoder::SOH;
use bytes::{BufMut, BytesMut};
use fixtree_core::field::tags;

/// Default BeginString used when none is supplied.
pub const DEFAULT_BEGIN_STRING: &str = "FIX.4.4";

/// FIX message encoder.
#[derive(Debug)]
pub struct Encoder {
    body: BytesMut,
    begin_string: String,
    delimiter: u8,
}

impl Encoder {
    /// Creates an encoder with the specified BeginString.
    ///
    /// # Arguments
    /// * `begin_string` - The FIX version string (e.g., "FIX.4.4")
    #[must_use]
    pub fn new(begin_string: impl Into<String>) -> Self {
        Self::with_capacity(begin_string, 256)
    }

    /// Creates an encoder with pre-allocated body capacity.
    ///
    /// # Arguments
    /// * `begin_string` - The FIX version string
    /// * `capacity` - Initial buffer capacity in bytes
    #[must_use]
    pub fn with_capacity(begin_string: impl Into<String>, capacity: usize) -> Self {
        Self {
            body: BytesMut::with_capacity(capacity),
            begin_string: begin_string.into(),
            delimiter: SOH,
        }
    }

    /// Sets the byte written after every field.
    #[inline]
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Returns the BeginString this encoder frames messages with.
    #[inline]
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    /// Appends a field with a string value.
    #[inline]
    pub fn put_str(&mut self, tag: u32, value: &str) {
        self.put_raw(tag, value.as_bytes());
    }

    /// Appends a field with an integer value.
    #[inline]
    pub fn put_int(&mut self, tag: u32, value: i64) {
        let mut buf = itoa::Buffer::new();
        self.put_raw(tag, buf.format(value).as_bytes());
    }

    /// Appends a field with an unsigned integer value.
    #[inline]
    pub fn put_uint(&mut self, tag: u32, value: u64) {
        let mut buf = itoa::Buffer::new();
        self.put_raw(tag, buf.format(value).as_bytes());
    }

    /// Appends a field with a raw value.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `value` - The field value bytes
    #[inline]
    pub fn put_raw(&mut self, tag: u32, value: &[u8]) {
        let mut tag_buf = itoa::Buffer::new();
        self.body.put_slice(tag_buf.format(tag).as_bytes());
        self.body.put_u8(b'=');
        self.body.put_slice(value);
        self.body.put_u8(self.delimiter);
    }

    /// Frames the body and returns the complete message.
    ///
    /// BeginString and BodyLength are prepended and CheckSum is appended.
    #[must_use]
    pub fn finish(self) -> BytesMut {
        let body_len = self.body.len();
        let mut message = BytesMut::with_capacity(body_len + self.begin_string.len() + 24);

        let mut tag_buf = itoa::Buffer::new();
        message.put_slice(tag_buf.format(tags::BEGIN_STRING).as_bytes());
        message.put_u8(b'=');
        message.put_slice(self.begin_string.as_bytes());
        message.put_u8(self.delimiter);

        let mut len_buf = itoa::Buffer::new();
        message.put_slice(tag_buf.format(tags::BODY_LENGTH).as_bytes());
        message.put_u8(b'=');
        message.put_slice(len_buf.format(body_len).as_bytes());
        message.put_u8(self.delimiter);

        message.put_slice(&self.body);

        let checksum = format_checksum(calculate_checksum(&message));
        message.put_slice(tag_buf.format(tags::CHECK_SUM).as_bytes());
        message.put_u8(b'=');
        message.put_slice(&checksum);
        message.put_u8(self.delimiter);

        message
    }

    /// Returns the body without BeginString, BodyLength or CheckSum.
    #[inline]
    #[must_use]
    pub fn into_body(self) -> BytesMut {
        self.body
    }

    /// Returns the current body length.
    #[inline]
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Clears the body for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.body.clear();
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(DEFAULT_BEGIN_STRING)
    }
}
