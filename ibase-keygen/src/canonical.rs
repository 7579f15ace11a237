//! Device identifier canonicalization.
//!
//! Raw machine codes arrive as free-form keystrokes. They are folded into a
//! fixed 16-character uppercase hex token before anything is hashed:
//!
//! 1. uppercase the input
//! 2. drop every character outside `[0-9A-F]`
//! 3. keep the first 16 characters
//! 4. right-pad with `'0'` up to 16 characters
//!
//! Canonicalization never fails. Garbage input degrades into a mostly-zero
//! token rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of hex characters in a canonical device identifier.
pub const DEVICE_ID_HEX_LEN: usize = 16;

/// Characters per hyphen-separated group.
pub const GROUP_LEN: usize = 4;

/// Canonicalizes a raw device identifier into 16 uppercase hex characters.
#[must_use]
pub fn canonicalize_device_id(raw: &str) -> String {
    let mut hex: String = raw
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| matches!(c, '0'..='9' | 'A'..='F'))
        .take(DEVICE_ID_HEX_LEN)
        .collect();

    while hex.len() < DEVICE_ID_HEX_LEN {
        hex.push('0');
    }
    hex
}

/// Inserts a hyphen after every fourth character: `XXXX-XXXX-XXXX-XXXX`.
///
/// Callers pass ASCII strings whose length is a multiple of [`GROUP_LEN`];
/// a shorter trailing group is emitted as-is.
#[must_use]
pub fn format_grouped(canonical: &str) -> String {
    let chars: Vec<char> = canonical.chars().collect();
    chars
        .chunks(GROUP_LEN)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// Returns true if `value` is four groups of four hex digits separated by
/// hyphens. Case-insensitive; surrounding whitespace is not accepted.
#[must_use]
pub fn is_grouped_hex(value: &str) -> bool {
    let groups: Vec<&str> = value.split('-').collect();
    groups.len() == DEVICE_ID_HEX_LEN / GROUP_LEN
        && groups
            .iter()
            .all(|g| g.len() == GROUP_LEN && g.chars().all(|c| c.is_ascii_hexdigit()))
}

/// A canonical 16-hex-digit device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct DeviceIdentifier {
    hex: String,
}

impl DeviceIdentifier {
    /// Canonicalizes raw user input. Never fails.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        Self {
            hex: canonicalize_device_id(raw),
        }
    }

    /// The bare 16-character uppercase hex form.
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    /// The display form, `XXXX-XXXX-XXXX-XXXX`.
    #[must_use]
    pub fn grouped(&self) -> String {
        format_grouped(&self.hex)
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.grouped())
    }
}

impl From<String> for DeviceIdentifier {
    fn from(raw: String) -> Self {
        Self::from_raw(&raw)
    }
}

impl From<DeviceIdentifier> for String {
    fn from(id: DeviceIdentifier) -> Self {
        id.grouped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_input_is_uppercased() {
        assert_eq!(canonicalize_device_id("d977b6f17ee31675"), "D977B6F17EE31675");
    }

    #[test]
    fn hyphens_are_dropped_before_truncation() {
        assert_eq!(
            canonicalize_device_id("D977-B6F1-7EE3-1675-FFFF"),
            "D977B6F17EE31675"
        );
    }

    #[test]
    fn empty_input_pads_to_zeros() {
        assert_eq!(canonicalize_device_id(""), "0000000000000000");
    }

    #[test]
    fn grouping_splits_into_fours() {
        assert_eq!(format_grouped("D977B6F17EE31675"), "D977-B6F1-7EE3-1675");
    }
}
