//! Reader colour palette.
//!
//! New readers get the first palette colour not yet used in their
//! organization. Once all ten are taken colours repeat; uniqueness is a
//! display preference, not an invariant. An explicit colour must still be
//! one of the ten.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::Reader;

/// Fixed palette offered to organizations, in suggestion order.
pub const READER_COLORS: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2",
    "#F8B88B", "#A8D5BA",
];

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex colour pattern is valid")
});

/// Palette colours not used by any of `readers`, in palette order.
pub fn available_colors(readers: &[Reader]) -> Vec<&'static str> {
    let used: HashSet<&str> = readers.iter().map(|r| r.color.as_str()).collect();
    READER_COLORS
        .into_iter()
        .filter(|color| !used.contains(color))
        .collect()
}

/// Colour suggested for the next reader of an organization.
pub fn next_color(readers: &[Reader]) -> &'static str {
    available_colors(readers)
        .first()
        .copied()
        .unwrap_or(READER_COLORS[0])
}

/// `#RRGGBB` check for caller-supplied colours.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

/// Palette entry matching `value` (case-insensitive), in the palette's spelling.
pub fn palette_color(value: &str) -> Option<&'static str> {
    if !is_hex_color(value) {
        return None;
    }
    READER_COLORS
        .into_iter()
        .find(|color| color.eq_ignore_ascii_case(value))
}
