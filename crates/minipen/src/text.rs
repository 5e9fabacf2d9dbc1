//! Caret and selection helpers shared by the controller and the browser adapter.
//!
//! The controller works in UTF-8 byte offsets. Browser text controls report
//! UTF-16 code unit offsets, so the adapter converts at the boundary.

use std::ops::Range;

/// Largest char boundary `<= offset`, clamped to the text length.
pub fn floor_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Normalizes a selection so it is ordered, in range and on char boundaries.
pub fn clamp_selection(text: &str, selection: Range<usize>) -> Range<usize> {
    let (start, end) = if selection.start <= selection.end {
        (selection.start, selection.end)
    } else {
        (selection.end, selection.start)
    };
    floor_char_boundary(text, start)..floor_char_boundary(text, end)
}

/// Converts a UTF-16 code unit offset into a UTF-8 byte offset.
///
/// An offset that falls inside a surrogate pair maps to the start of that char.
pub fn utf16_to_byte_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte_index, ch) in text.char_indices() {
        if units + ch.len_utf16() > utf16_offset {
            return byte_index;
        }
        units += ch.len_utf16();
    }
    text.len()
}

/// Converts a UTF-8 byte offset into a UTF-16 code unit offset.
pub fn byte_to_utf16_offset(text: &str, byte_offset: usize) -> usize {
    let byte_offset = floor_char_boundary(text, byte_offset);
    text[..byte_offset].chars().map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_ordered_and_clamped() {
        assert_eq!(clamp_selection("hello", 4..1), 1..4);
        assert_eq!(clamp_selection("hello", 2..99), 2..5);
    }

    #[test]
    fn selection_snaps_to_char_boundaries() {
        // 'é' occupies bytes 1..3
        assert_eq!(clamp_selection("héllo", 2..2), 1..1);
    }

    #[test]
    fn utf16_offsets_round_trip_through_astral_chars() {
        let text = "a😀b";
        assert_eq!(utf16_to_byte_offset(text, 0), 0);
        assert_eq!(utf16_to_byte_offset(text, 1), 1);
        assert_eq!(utf16_to_byte_offset(text, 3), 5);
        assert_eq!(utf16_to_byte_offset(text, 4), 6);
        assert_eq!(byte_to_utf16_offset(text, 5), 3);
        assert_eq!(byte_to_utf16_offset(text, 6), 4);
    }

    #[test]
    fn utf16_offset_inside_surrogate_pair_maps_to_char_start() {
        assert_eq!(utf16_to_byte_offset("a😀b", 2), 1);
    }
}
