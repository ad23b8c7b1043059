/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Zero-copy FIX message decoder.
//!
//! The decoder splits a buffer into `tag=value` pairs without allocating for
//! field values: every [`FieldRef`] borrows from the input. The field
//! delimiter defaults to SOH but can be swapped for a printable character,
//! which is how messages are usually written in logs and tests.

use crate::checksum::{calculate_checksum, parse_checksum};
use fixtree_core::error::DecodeError;
use fixtree_core::field::{FieldRef, tags};
use memchr::memchr;
use smallvec::SmallVec;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// A framed message: every field in wire order, borrowed from the input.
///
/// The fields include BeginString, BodyLength and CheckSum (when present) so
/// that later stages can decide what to keep.
#[derive(Debug, Clone)]
pub struct RawMessage<'a> {
    buffer: &'a [u8],
    begin_string: &'a str,
    msg_type: &'a str,
    fields: SmallVec<[FieldRef<'a>; 32]>,
}

impl<'a> RawMessage<'a> {
    /// Returns the bytes this message was decoded from.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.buffer
    }

    /// Returns the BeginString (tag 8) value.
    #[inline]
    #[must_use]
    pub const fn begin_string(&self) -> &'a str {
        self.begin_string
    }

    /// Returns the MsgType (tag 35) value.
    #[inline]
    #[must_use]
    pub const fn msg_type(&self) -> &'a str {
        self.msg_type
    }

    /// Returns all fields in wire order.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldRef<'a>] {
        &self.fields
    }

    /// Returns the first field with the given tag.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&FieldRef<'a>> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Returns the number of fields.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields were decoded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Zero-copy FIX message decoder.
#[derive(Debug)]
pub struct Decoder<'a> {
    input: &'a [u8],
    offset: usize,
    delimiter: u8,
    validate_checksum: bool,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over `input` using SOH as the field delimiter.
    ///
    /// Checksum validation is off by default.
    ///
    /// # Arguments
    /// * `input` - The FIX message bytes to decode
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            delimiter: SOH,
            validate_checksum: false,
        }
    }

    /// Sets the field delimiter.
    ///
    /// # Arguments
    /// * `delimiter` - Byte terminating each field, e.g. `b'|'`
    #[inline]
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether [`decode`](Self::decode) validates the CheckSum field.
    ///
    /// # Arguments
    /// * `validate` - Whether to validate checksums
    #[inline]
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Returns the configured delimiter.
    #[inline]
    #[must_use]
    pub const fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Decodes one complete message starting at the current offset.
    ///
    /// The message must open with BeginString and BodyLength, in that order,
    /// followed by MsgType. Decoding stops after the CheckSum field or at the
    /// end of the buffer.
    ///
    /// # Errors
    /// Returns `DecodeError` if the framing fields are missing or malformed,
    /// or if checksum validation is enabled and the checksum is absent or
    /// does not match.
    pub fn decode(&mut self) -> Result<RawMessage<'a>, DecodeError> {
        let start = self.offset;

        let begin_string = self.try_next_field()?.ok_or(DecodeError::Incomplete)?;
        if begin_string.tag != tags::BEGIN_STRING {
            return Err(DecodeError::InvalidBeginString);
        }

        let body_length = self
            .try_next_field()?
            .ok_or(DecodeError::MissingBodyLength)?;
        if body_length.tag != tags::BODY_LENGTH {
            return Err(DecodeError::MissingBodyLength);
        }
        body_length
            .as_str()?
            .parse::<usize>()
            .map_err(|_| DecodeError::InvalidBodyLength)?;

        let msg_type = self.try_next_field()?.ok_or(DecodeError::MissingMsgType)?;
        if msg_type.tag != tags::MSG_TYPE {
            return Err(DecodeError::MissingMsgType);
        }

        let mut fields: SmallVec<[FieldRef<'a>; 32]> = SmallVec::new();
        fields.push(begin_string);
        fields.push(body_length);
        fields.push(msg_type);

        let mut checksum: Option<(FieldRef<'a>, usize)> = None;
        while !self.is_empty() {
            let field_start = self.offset;
            let field = self.try_next_field()?.ok_or(DecodeError::Incomplete)?;
            fields.push(field);
            if field.tag == tags::CHECK_SUM {
                checksum = Some((field, field_start));
                break;
            }
        }

        if self.validate_checksum {
            let (field, field_start) = checksum.ok_or(DecodeError::Incomplete)?;
            let declared = parse_checksum(field.value).ok_or_else(|| {
                DecodeError::InvalidChecksum(String::from_utf8_lossy(field.value).into_owned())
            })?;
            let calculated = calculate_checksum(&self.input[start..field_start]);
            if calculated != declared {
                return Err(DecodeError::ChecksumMismatch {
                    calculated,
                    declared,
                });
            }
        }

        Ok(RawMessage {
            buffer: &self.input[start..self.offset],
            begin_string: begin_string.as_str()?,
            msg_type: msg_type.as_str()?,
            fields,
        })
    }

    /// Parses the next field from the buffer.
    ///
    /// Returns `None` when the buffer is exhausted or the next field is
    /// malformed; the offset is left unchanged in the latter case. Use
    /// [`try_next_field`](Self::try_next_field) to tell the two apart.
    #[inline]
    pub fn next_field(&mut self) -> Option<FieldRef<'a>> {
        self.try_next_field().ok().flatten()
    }

    /// Parses the next field, reporting why a field could not be read.
    ///
    /// Returns `Ok(None)` once the buffer is exhausted. The offset only
    /// advances on success.
    ///
    /// # Errors
    /// Returns `DecodeError::Incomplete` if the input ends mid-field and
    /// `DecodeError::InvalidTag` if the tag is not a number.
    pub fn try_next_field(&mut self) -> Result<Option<FieldRef<'a>>, DecodeError> {
        if self.offset >= self.input.len() {
            return Ok(None);
        }

        let remaining = &self.input[self.offset..];
        let eq_pos = memchr(EQUALS, remaining).ok_or(DecodeError::Incomplete)?;
        let raw_tag = &remaining[..eq_pos];
        let tag = parse_tag(raw_tag).ok_or_else(|| {
            DecodeError::InvalidTag(String::from_utf8_lossy(raw_tag).into_owned())
        })?;

        let value_start = eq_pos + 1;
        let end = memchr(self.delimiter, &remaining[value_start..]).ok_or(DecodeError::Incomplete)?;
        let value = &remaining[value_start..value_start + end];

        self.offset += value_start + end + 1;
        Ok(Some(FieldRef::new(tag, value)))
    }

    /// Returns the current offset in the buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the bytes not yet consumed.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.offset..]
    }

    /// Returns true if the buffer has been fully consumed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Rewinds to the beginning of the buffer.
    #[inline]
    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = FieldRef<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next_field()
    }
}

/// Parses a tag number from ASCII digits.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }
    Some(result)
}
