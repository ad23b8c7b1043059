/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The checksum is the byte sum of everything before the `10=` field, modulo
//! 256, written as three zero-padded digits.

/// Calculates the FIX checksum of `data`.
///
/// # Example
/// ```
/// use fixtree_tagvalue::calculate_checksum;
///
/// assert_eq!(calculate_checksum(b"ABC"), 198);
/// ```
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Formats a checksum as three ASCII digits.
#[inline]
#[must_use]
pub fn format_checksum(checksum: u8) -> [u8; 3] {
    [
        b'0' + checksum / 100,
        b'0' + (checksum / 10) % 10,
        b'0' + checksum % 10,
    ]
}

/// Parses three ASCII digits into a checksum.
///
/// Returns `None` unless `bytes` is exactly three digits no greater than 255.
#[inline]
#[must_use]
pub fn parse_checksum(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = bytes
        .iter()
        .fold(0u16, |acc, &b| acc * 10 + u16::from(b - b'0'));
    u8::try_from(value).ok()
}
