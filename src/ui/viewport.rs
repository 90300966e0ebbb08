//! Viewport management for scrolling.
//!
//! The [`Viewport`] tracks the visible window of the post and owns the
//! smooth-scroll animation used when jumping to a section.

use std::ops::Range;

/// Manages the visible portion of a document.
///
/// # Example
///
/// ```
/// use marginalia::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(80, 24, 100);
/// assert_eq!(vp.visible_range(), 0..24);
///
/// vp.scroll_down(10);
/// assert_eq!(vp.visible_range(), 10..34);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    total_lines: usize,
    /// Offset the smooth-scroll animation is heading for
    target: Option<usize>,
}

impl Viewport {
    /// Create a viewport of `width` x `height` over `total_lines` lines.
    pub const fn new(width: u16, height: u16, total_lines: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_lines,
            target: None,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Range of visible lines, clamped to the document.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height as usize).min(self.total_lines);
        self.offset..end.max(self.offset)
    }

    /// Scroll position as a percentage (0-100).
    pub fn scroll_percent(&self) -> u8 {
        let max_offset = self.max_offset();
        if max_offset == 0 {
            return 100;
        }
        // offset <= max_offset keeps the value within 0..=100
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max_offset as f64) * 100.0).round() as u8
        }
    }

    pub const fn scroll_up(&mut self, n: usize) {
        self.target = None;
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.target = None;
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub const fn page_up(&mut self) {
        self.scroll_up(self.height as usize);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height as usize);
    }

    pub const fn half_page_up(&mut self) {
        self.scroll_up(self.height as usize / 2);
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down(self.height as usize / 2);
    }

    pub const fn go_to_top(&mut self) {
        self.target = None;
        self.offset = 0;
    }

    pub const fn go_to_bottom(&mut self) {
        self.target = None;
        self.offset = self.max_offset();
    }

    /// Jump so that `line` is at the top of the viewport.
    pub fn go_to_line(&mut self, line: usize) {
        self.target = None;
        self.offset = line.min(self.max_offset());
    }

    /// Start a smooth scroll that brings `line` to the top of the viewport.
    ///
    /// Any manual scroll cancels the animation.
    pub fn animate_to(&mut self, line: usize) {
        let target = line.min(self.max_offset());
        self.target = (target != self.offset).then_some(target);
    }

    pub const fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    /// Advance the animation by one frame, covering a third of the remaining
    /// distance (at least one line). Returns true if the offset moved.
    pub fn tick_animation(&mut self) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let distance = target.abs_diff(self.offset);
        let step = (distance / 3).max(1);
        if target > self.offset {
            self.offset += step;
        } else {
            self.offset -= step;
        }
        if self.offset == target {
            self.target = None;
        }
        true
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp();
    }

    /// Update the total number of lines (e.g., after reload).
    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.clamp();
    }

    fn clamp(&mut self) {
        let max = self.max_offset();
        self.offset = self.offset.min(max);
        self.target = self.target.map(|t| t.min(max)).filter(|t| *t != self.offset);
    }

    const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_visible_range_at_top_and_bottom() {
        let mut vp = Viewport::new(80, 24, 100);
        assert_eq!(vp.visible_range(), 0..24);
        vp.go_to_bottom();
        assert_eq!(vp.visible_range(), 76..100);
    }

    #[test]
    fn test_visible_range_with_short_document() {
        let vp = Viewport::new(80, 24, 10);
        assert_eq!(vp.visible_range(), 0..10);
    }

    #[test]
    fn test_scroll_clamps() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.scroll_down(1000);
        assert_eq!(vp.offset(), 76);
        vp.scroll_up(1000);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_paging() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.page_down();
        assert_eq!(vp.offset(), 24);
        vp.half_page_down();
        assert_eq!(vp.offset(), 36);
        vp.half_page_up();
        vp.page_up();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_go_to_line_clamps() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.go_to_line(50);
        assert_eq!(vp.offset(), 50);
        vp.go_to_line(1000);
        assert_eq!(vp.offset(), 76);
    }

    #[test]
    fn test_scroll_percent() {
        let mut vp = Viewport::new(80, 24, 100);
        assert_eq!(vp.scroll_percent(), 0);
        vp.go_to_bottom();
        assert_eq!(vp.scroll_percent(), 100);
        assert_eq!(Viewport::new(80, 24, 0).scroll_percent(), 100);
    }

    #[test]
    fn test_resize_keeps_valid_offset() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.scroll_down(50);
        vp.resize(80, 60);
        assert_eq!(vp.offset(), 40);
    }

    #[test]
    fn test_animation_reaches_target() {
        let mut vp = Viewport::new(80, 10, 200);
        vp.animate_to(90);
        assert!(vp.is_animating());

        let mut frames = 0;
        while vp.tick_animation() {
            frames += 1;
            assert!(frames < 100, "animation did not settle");
        }
        assert_eq!(vp.offset(), 90);
        assert!(!vp.is_animating());
        assert!(frames > 1, "expected a multi-frame scroll");
    }

    #[test]
    fn test_animation_moves_upward() {
        let mut vp = Viewport::new(80, 10, 200);
        vp.go_to_line(100);
        vp.animate_to(4);
        vp.tick_animation();
        assert!(vp.offset() < 100 && vp.offset() > 4);
    }

    #[test]
    fn test_animation_to_current_offset_is_noop() {
        let mut vp = Viewport::new(80, 10, 200);
        vp.animate_to(0);
        assert!(!vp.is_animating());
        assert!(!vp.tick_animation());
    }

    #[test]
    fn test_manual_scroll_cancels_animation() {
        let mut vp = Viewport::new(80, 10, 200);
        vp.animate_to(150);
        vp.tick_animation();
        vp.scroll_down(1);
        assert!(!vp.is_animating());
    }

    #[test]
    fn test_animation_target_is_clamped() {
        let mut vp = Viewport::new(80, 10, 30);
        vp.animate_to(500);
        while vp.tick_animation() {}
        assert_eq!(vp.offset(), 20);
    }

    proptest! {
        #[test]
        fn prop_scroll_stays_in_bounds(
            total_lines in 0..10000usize,
            height in 1..100u16,
            amount in 0..10000usize,
        ) {
            let mut vp = Viewport::new(80, height, total_lines);
            vp.scroll_down(amount);
            prop_assert!(vp.offset() <= total_lines.saturating_sub(height as usize));
            let range = vp.visible_range();
            prop_assert!(range.start <= range.end);
            prop_assert!(range.end <= total_lines.max(range.start));
            prop_assert!(vp.scroll_percent() <= 100);
        }

        #[test]
        fn prop_animation_terminates_at_target(
            total_lines in 0..5000usize,
            height in 1..80u16,
            line in 0..6000usize,
        ) {
            let mut vp = Viewport::new(80, height, total_lines);
            vp.animate_to(line);
            let mut frames = 0;
            while vp.tick_animation() {
                frames += 1;
                prop_assert!(frames < 200);
            }
            prop_assert_eq!(vp.offset(), line.min(total_lines.saturating_sub(height as usize)));
        }
    }
}
