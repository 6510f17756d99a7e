//! Vertical scroll state shared by the text view and the lists.

use super::darken;
use crate::{render::Canvas, ui::Colors};

const BAR_WIDTH: f32 = 6.0;
const MIN_THUMB: f32 = 20.0;

/// Wheel notches scroll this many rows.
pub(crate) const WHEEL_STEP: usize = 2;

/// First visible row of `total`, with `visible` rows on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Scroll {
    pub offset: usize,
    pub total: usize,
    pub visible: usize,
}

impl Scroll {
    pub fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.visible)
    }

    /// Moves by `delta` rows and returns whether the offset changed.
    pub fn scroll_by(&mut self, delta: isize) -> bool {
        let target = self.offset.saturating_add_signed(delta).min(self.max_offset());
        std::mem::replace(&mut self.offset, target) != target
    }

    pub fn to_start(&mut self) -> bool {
        std::mem::replace(&mut self.offset, 0) != 0
    }

    pub fn to_end(&mut self) -> bool {
        let end = self.max_offset();
        std::mem::replace(&mut self.offset, end) != end
    }

    pub fn at_end(&self) -> bool {
        self.offset >= self.max_offset()
    }

    /// Scrolls just enough to bring `row` on screen.
    pub fn reveal(&mut self, row: usize) {
        if row < self.offset {
            self.offset = row;
        } else if self.visible > 0 && row >= self.offset + self.visible {
            self.offset = row + 1 - self.visible;
        }
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn set_visible(&mut self, visible: usize) {
        self.visible = visible;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Draws the track and thumb along the right edge of the given area,
    /// if there is anything to scroll.
    pub fn draw(&self, canvas: &mut Canvas, colors: &Colors, right: f32, y: f32, h: f32, scale: f32) {
        if self.total <= self.visible || self.total == 0 {
            return;
        }
        let bar_w = BAR_WIDTH * scale;
        let x = right - bar_w - 2.0 * scale;
        let thumb_h = (self.visible as f32 / self.total as f32 * h).max(MIN_THUMB * scale).min(h);
        let thumb_y = if self.max_offset() > 0 {
            self.offset as f32 / self.max_offset() as f32 * (h - thumb_h)
        } else {
            0.0
        };

        canvas.fill_rounded_rect(x, y, bar_w, h, bar_w / 2.0, darken(colors.input_bg, 0.05));
        canvas.fill_rounded_rect(x, y + thumb_y, bar_w, thumb_h, bar_w / 2.0, colors.input_border);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroll(total: usize, visible: usize) -> Scroll {
        Scroll {
            offset: 0,
            total,
            visible,
        }
    }

    #[test]
    fn offsets_stay_in_range() {
        let mut s = scroll(10, 4);
        assert!(!s.scroll_by(-3));
        assert!(s.scroll_by(100));
        assert_eq!(s.offset, 6);
        assert!(s.at_end());
        assert!(s.to_start());
        assert!(!s.to_start());
    }

    #[test]
    fn reveal_moves_the_least() {
        let mut s = scroll(20, 5);
        s.reveal(7);
        assert_eq!(s.offset, 3);
        s.reveal(4);
        assert_eq!(s.offset, 3);
        s.reveal(1);
        assert_eq!(s.offset, 1);
    }

    #[test]
    fn shrinking_content_pulls_the_offset_back() {
        let mut s = scroll(20, 5);
        s.to_end();
        s.set_total(8);
        assert_eq!(s.offset, 3);
        s.set_visible(10);
        assert_eq!(s.offset, 0);
    }
}
