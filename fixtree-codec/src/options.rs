/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Codec configuration.

use fixtree_core::time::TimePrecision;
use serde::{Deserialize, Serialize};

/// Flags controlling decode and encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Fail on wire tags unknown to the root descriptor instead of dropping them.
    pub verify_tags: bool,
    /// Discard MsgSeqNum, BodyLength and CheckSum while decoding.
    pub skip_tags: bool,
    /// Write milliseconds in time and timestamp fields.
    pub include_milliseconds: bool,
    /// Write microseconds in time and timestamp fields; wins over milliseconds.
    pub include_microseconds: bool,
    /// Attach the schema field order to encoded messages.
    pub ordering_fields: bool,
    /// Decode every leaf as text.
    pub ignore_field_type: bool,
    /// Decode enum fields to their symbolic names.
    pub symbolic_enums: bool,
    /// Validate the CheckSum field when decoding raw bytes.
    pub validate_checksum: bool,
}

impl CodecOptions {
    /// Creates options with the default flags.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            verify_tags: false,
            skip_tags: false,
            include_milliseconds: true,
            include_microseconds: false,
            ordering_fields: false,
            ignore_field_type: false,
            symbolic_enums: true,
            validate_checksum: false,
        }
    }

    /// Sets whether unknown tags are an error.
    #[must_use]
    pub const fn with_verify_tags(mut self, verify: bool) -> Self {
        self.verify_tags = verify;
        self
    }

    /// Sets whether administrative tags are discarded on decode.
    #[must_use]
    pub const fn with_skip_tags(mut self, skip: bool) -> Self {
        self.skip_tags = skip;
        self
    }

    /// Sets whether milliseconds are written.
    #[must_use]
    pub const fn with_milliseconds(mut self, include: bool) -> Self {
        self.include_milliseconds = include;
        self
    }

    /// Sets whether microseconds are written.
    #[must_use]
    pub const fn with_microseconds(mut self, include: bool) -> Self {
        self.include_microseconds = include;
        self
    }

    /// Sets whether the schema order is attached on encode.
    #[must_use]
    pub const fn with_ordering_fields(mut self, ordering: bool) -> Self {
        self.ordering_fields = ordering;
        self
    }

    /// Sets whether leaves are decoded as text regardless of type.
    #[must_use]
    pub const fn with_ignore_field_type(mut self, ignore: bool) -> Self {
        self.ignore_field_type = ignore;
        self
    }

    /// Sets whether enums decode to symbolic names.
    #[must_use]
    pub const fn with_symbolic_enums(mut self, symbolic: bool) -> Self {
        self.symbolic_enums = symbolic;
        self
    }

    /// Sets whether the CheckSum field is validated.
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Returns the time precision implied by the millisecond and microsecond flags.
    #[inline]
    #[must_use]
    pub const fn precision(&self) -> TimePrecision {
        TimePrecision::from_flags(self.include_milliseconds, self.include_microseconds)
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self::new()
    }
}
