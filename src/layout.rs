//! Page Layout - read-only geometry snapshots.
//!
//! The engine never queries live layout: the host measures its render tree
//! and hands a [`PageLayout`] snapshot into each tick. Snapshots are
//! recomputed every tick rather than cached, since layout can change
//! between ticks (images loading, fonts swapping, resizes).
//!
//! All rects are in document coordinates; `Viewport::scroll_y` converts to
//! viewport-relative when needed.

use std::collections::HashMap;

// =============================================================================
// Geometry
// =============================================================================

/// Axis-aligned rectangle in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Current viewport: size plus vertical scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_y: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64, scroll_y: f64) -> Self {
        Self {
            width,
            height,
            scroll_y,
        }
    }
}

/// Is at least `threshold` of the element's extent inside the viewport?
///
/// Synchronous and side-effect free, usable at registration time to decide
/// whether the async intersection path can be skipped entirely. Mirrors the
/// observer's geometry but without the pre-entry margin.
pub fn is_in_viewport(rect: &Rect, viewport: &Viewport, threshold: f64) -> bool {
    // Convert to viewport-relative coordinates.
    let top = rect.top - viewport.scroll_y;
    let bottom = top + rect.height;

    let vertical =
        top + rect.height * threshold < viewport.height && bottom - rect.height * threshold > 0.0;
    let horizontal = rect.left + rect.width * threshold < viewport.width
        && rect.right() - rect.width * threshold > 0.0;

    vertical && horizontal
}

// =============================================================================
// Sections
// =============================================================================

/// One content section's vertical extent, snapshotted from live layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDescriptor {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl SectionDescriptor {
    /// Whether a document y-coordinate falls in this section's `[top, top+height)` range.
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

// =============================================================================
// Page Layout Snapshot
// =============================================================================

/// Per-tick snapshot of everything the engine needs from live layout.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub viewport: Viewport,
    /// Height of the fixed navigation bar.
    pub nav_height: f64,
    /// Total scrollable document height (for scroll progress).
    pub document_height: f64,
    rects: HashMap<usize, Rect>,
    sections: Vec<SectionDescriptor>,
}

impl PageLayout {
    pub fn new(viewport: Viewport, nav_height: f64) -> Self {
        Self {
            viewport,
            nav_height,
            document_height: viewport.height,
            rects: HashMap::new(),
            sections: Vec::new(),
        }
    }

    /// Record the measured rect for an element index.
    pub fn set_rect(&mut self, index: usize, rect: Rect) {
        self.rects.insert(index, rect);
    }

    /// Measured rect for an element, if the host reported one this tick.
    pub fn rect(&self, index: usize) -> Option<Rect> {
        self.rects.get(&index).copied()
    }

    /// Append a section in document order.
    pub fn push_section(&mut self, id: impl Into<String>, top: f64, height: f64) {
        self.sections.push(SectionDescriptor {
            id: id.into(),
            top,
            height,
        });
    }

    pub fn sections(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// How far the page has been scrolled, as a whole percentage 0-100.
    pub fn scroll_percentage(&self) -> f64 {
        let scrollable = self.document_height - self.viewport.height;
        if scrollable <= 0.0 {
            return 0.0;
        }
        (self.viewport.scroll_y / scrollable * 100.0)
            .round()
            .clamp(0.0, 100.0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0, 0.0)
    }

    #[test]
    fn test_fully_visible_element() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        assert!(is_in_viewport(&rect, &viewport(), 0.1));
    }

    #[test]
    fn test_element_below_fold() {
        let rect = Rect::new(100.0, 700.0, 200.0, 100.0);
        assert!(!is_in_viewport(&rect, &viewport(), 0.1));
    }

    #[test]
    fn test_element_enters_after_scroll() {
        let rect = Rect::new(100.0, 700.0, 200.0, 100.0);
        let scrolled = Viewport::new(800.0, 600.0, 300.0);
        assert!(is_in_viewport(&rect, &scrolled, 0.1));
    }

    #[test]
    fn test_threshold_requires_fraction_visible() {
        // Bottom edge peeks 5px into a 600px viewport: under 10% of 100px height.
        let rect = Rect::new(100.0, 595.0, 200.0, 100.0);
        assert!(is_in_viewport(&rect, &viewport(), 0.0));
        assert!(!is_in_viewport(&rect, &viewport(), 0.1));

        // 20px visible clears the 10% threshold.
        let rect = Rect::new(100.0, 580.0, 200.0, 100.0);
        assert!(is_in_viewport(&rect, &viewport(), 0.1));
    }

    #[test]
    fn test_element_scrolled_past_above() {
        let rect = Rect::new(100.0, 0.0, 200.0, 100.0);
        let scrolled = Viewport::new(800.0, 600.0, 200.0);
        assert!(!is_in_viewport(&rect, &scrolled, 0.1));
    }

    #[test]
    fn test_section_contains_is_half_open() {
        let section = SectionDescriptor {
            id: "skills".into(),
            top: 100.0,
            height: 200.0,
        };
        assert!(section.contains(100.0));
        assert!(section.contains(299.9));
        assert!(!section.contains(300.0));
        assert!(!section.contains(99.9));
    }

    #[test]
    fn test_layout_lookup() {
        let mut layout = PageLayout::new(viewport(), 64.0);
        layout.set_rect(3, Rect::new(0.0, 50.0, 10.0, 10.0));
        layout.push_section("home", 0.0, 100.0);

        assert_eq!(layout.rect(3), Some(Rect::new(0.0, 50.0, 10.0, 10.0)));
        assert_eq!(layout.rect(4), None);
        assert_eq!(layout.section("home").map(|s| s.top), Some(0.0));
        assert!(layout.section("missing").is_none());
    }

    #[test]
    fn test_scroll_percentage() {
        let mut layout = PageLayout::new(Viewport::new(800.0, 600.0, 700.0), 64.0);
        layout.document_height = 2000.0;
        assert_eq!(layout.scroll_percentage(), 50.0);

        layout.viewport.scroll_y = 0.0;
        assert_eq!(layout.scroll_percentage(), 0.0);

        layout.viewport.scroll_y = 5000.0; // over-scroll clamps
        assert_eq!(layout.scroll_percentage(), 100.0);
    }

    #[test]
    fn test_scroll_percentage_short_document() {
        let layout = PageLayout::new(Viewport::new(800.0, 600.0, 0.0), 64.0);
        // document_height defaults to viewport height: nothing to scroll
        assert_eq!(layout.scroll_percentage(), 0.0);
    }
}
