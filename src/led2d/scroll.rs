//! Horizontal scroll positions for a message crossing the panel.

use crate::font::{GLYPH_ADVANCE, GLYPH_WIDTH};

/// Pixel width of `char_count` glyphs laid out with one blank column between them.
///
/// There is no trailing blank column after the last glyph, so one glyph is 5 wide,
/// two are 11 wide, and an empty message is 0 wide.
#[must_use]
pub const fn message_width(char_count: usize) -> usize {
    if char_count == 0 {
        0
    } else {
        char_count * GLYPH_ADVANCE - (GLYPH_ADVANCE - GLYPH_WIDTH)
    }
}

/// Leading-column offsets of one scroll pass, one per frame.
///
/// Starts with the message just off the right edge (`panel_width`) and steps left by one
/// pixel until the message has fully left the panel, stopping before `-message_width`.
/// A pass therefore has `panel_width + message_width` frames.
///
/// ```rust
/// use air_ticker::led2d::scroll::{ScrollOffsets, message_width};
///
/// let width = i32::try_from(message_width(2)).unwrap();
/// let offsets: Vec<i32> = ScrollOffsets::new(32, width).collect();
/// assert_eq!(offsets.len(), 43);
/// assert_eq!(offsets.first(), Some(&32));
/// assert_eq!(offsets.last(), Some(&-10));
/// ```
#[derive(Clone, Debug)]
pub struct ScrollOffsets {
    next: i32,
    end: i32,
}

impl ScrollOffsets {
    /// Offsets for a message `message_width` pixels wide on a panel `panel_width` pixels wide.
    #[must_use]
    pub const fn new(panel_width: i32, message_width: i32) -> Self {
        Self {
            next: panel_width,
            end: -message_width,
        }
    }
}

impl Iterator for ScrollOffsets {
    type Item = i32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next <= self.end {
            return None;
        }
        let offset = self.next;
        self.next -= 1;
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.next.saturating_sub(self.end)).unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ScrollOffsets {}
