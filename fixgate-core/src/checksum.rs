/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX CheckSum (tag 10).
//!
//! The checksum is the byte sum of everything preceding `10=`, modulo 256,
//! rendered as exactly three ASCII digits.

/// Computes the checksum of `data`.
#[inline]
#[must_use]
pub fn calculate(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Renders a checksum as three zero-padded ASCII digits.
#[inline]
#[must_use]
pub fn format(checksum: u8) -> [u8; 3] {
    [
        b'0' + checksum / 100,
        b'0' + (checksum / 10) % 10,
        b'0' + checksum % 10,
    ]
}

/// Parses a three-digit checksum, returning `None` for anything else.
#[must_use]
pub fn parse(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let value = bytes
        .iter()
        .fold(0u16, |acc, &b| acc * 10 + u16::from(b - b'0'));
    u8::try_from(value).ok()
}
