/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Wire field references and well-known tag numbers.
//!
//! - [`FieldRef`]: Zero-copy reference to a `tag=value` pair inside a buffer
//! - [`tags`]: Tag numbers the codec treats specially

use crate::error::DecodeError;

/// Tag numbers with fixed meaning in every FIX dialect.
pub mod tags {
    /// BeginString.
    pub const BEGIN_STRING: u32 = 8;
    /// BodyLength.
    pub const BODY_LENGTH: u32 = 9;
    /// CheckSum.
    pub const CHECK_SUM: u32 = 10;
    /// MsgSeqNum.
    pub const MSG_SEQ_NUM: u32 = 34;
    /// MsgType.
    pub const MSG_TYPE: u32 = 35;

    /// Administrative tags discarded when decoding with `skip_tags`.
    pub const SKIPPABLE: [u32; 3] = [MSG_SEQ_NUM, BODY_LENGTH, CHECK_SUM];

    /// Returns true if `tag` is discarded by `skip_tags` decoding.
    #[inline]
    #[must_use]
    pub fn is_skippable(tag: u32) -> bool {
        SKIPPABLE.contains(&tag)
    }
}

/// Zero-copy reference to a field within a FIX message buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    /// The field tag number.
    pub tag: u32,
    /// Reference to the field value bytes (without delimiters).
    pub value: &'a [u8],
}

impl<'a> FieldRef<'a> {
    /// Creates a new field reference.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `value` - Reference to the value bytes
    #[inline]
    #[must_use]
    pub const fn new(tag: u32, value: &'a [u8]) -> Self {
        Self { tag, value }
    }

    /// Returns the value as a string slice.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidUtf8` if the value is not valid UTF-8.
    pub fn as_str(&self) -> Result<&'a str, DecodeError> {
        std::str::from_utf8(self.value).map_err(DecodeError::from)
    }

    /// Returns the raw bytes of the value.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.value
    }

    /// Returns the length of the value in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.value.len()
    }

    /// Returns true if the value is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
