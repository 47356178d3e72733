//! Navigation Tracker - navbar chrome, active section, mobile menu.
//!
//! Recomputes two independent signals on a throttled scroll cadence:
//! - chrome state: `scrolled` iff the offset is past 50px, written to the
//!   navbar element only when the boolean actually flips
//! - active section: the section whose vertical range contains the focus
//!   line at `scroll + nav_height + viewport_height / 3`; when nothing
//!   matches (e.g. past the last section) the previous section is retained
//!   rather than flickering to none
//!
//! Clicking a nav link short-circuits the scroll cadence: it computes the
//! smooth-scroll target and sets the active link immediately for responsive
//! feedback rather than waiting for the next tick.
//!
//! The throttle is leading-edge: the last scroll event inside a busy window
//! is dropped, which can leave the highlight one section behind after fast
//! scrolling stops. That matches the page's long-standing behavior and is
//! kept deliberately.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{Signal, signal};
use tracing::{debug, warn};

use crate::engine::SharedRegistry;
use crate::error::EngineError;
use crate::layout::PageLayout;
use crate::scheduler::{Debounce, Throttle, TimerQueue};
use crate::types::ClassFlags;

/// Scroll offset past which the navbar switches to "scrolled" chrome.
pub const SCROLL_THRESHOLD_PX: f64 = 50.0;

/// Scroll recomputation cadence (~60Hz).
pub const SCROLL_THROTTLE_MS: u64 = 16;

/// Extra padding above a section when scrolling to it.
pub const NAV_SCROLL_PADDING_PX: f64 = 20.0;

/// Resize handling debounce.
pub const RESIZE_DEBOUNCE_MS: u64 = 250;

/// Viewport width at which the mobile menu stops applying.
pub const DESKTOP_BREAKPOINT_PX: f64 = 768.0;

// =============================================================================
// Types
// =============================================================================

/// A scroll the host should perform on the engine's behalf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    /// Target vertical offset in document coordinates, clamped to >= 0.
    pub top: f64,
    pub smooth: bool,
}

/// Element indices of the navigation chrome. All optional: a page without a
/// mobile toggle simply never gets toggle classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavChrome {
    pub navbar: Option<usize>,
    pub toggle: Option<usize>,
    pub menu: Option<usize>,
}

// =============================================================================
// Tracker
// =============================================================================

#[derive(Clone)]
pub struct NavTracker {
    registry: SharedRegistry,
    timers: Rc<TimerQueue>,
    chrome: NavChrome,
    current_section: Signal<String>,
    is_menu_open: Signal<bool>,
    is_scrolled: Signal<bool>,
    throttle: Rc<Throttle>,
    resize_debounce: Rc<Debounce>,
    /// Section id -> nav link element index.
    links: Rc<RefCell<HashMap<String, usize>>>,
}

impl NavTracker {
    pub fn new(
        registry: SharedRegistry,
        timers: Rc<TimerQueue>,
        chrome: NavChrome,
        initial_section: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            timers,
            chrome,
            current_section: signal(initial_section.into()),
            is_menu_open: signal(false),
            is_scrolled: signal(false),
            throttle: Rc::new(Throttle::new(SCROLL_THROTTLE_MS)),
            resize_debounce: Rc::new(Debounce::new(RESIZE_DEBOUNCE_MS)),
            links: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    // -------------------------------------------------------------------------
    // State accessors
    // -------------------------------------------------------------------------

    pub fn current_section(&self) -> String {
        self.current_section.get()
    }

    pub fn current_section_signal(&self) -> Signal<String> {
        self.current_section.clone()
    }

    pub fn is_menu_open(&self) -> bool {
        self.is_menu_open.get()
    }

    pub fn is_scrolled(&self) -> bool {
        self.is_scrolled.get()
    }

    /// Bind a nav link element to the section it targets.
    pub fn register_link(&self, section_id: impl Into<String>, index: usize) {
        let section_id = section_id.into();
        if !self.registry.borrow().is_allocated(index) {
            warn!(%section_id, index, "nav link element not registered");
            return;
        }
        self.links.borrow_mut().insert(section_id, index);
    }

    // -------------------------------------------------------------------------
    // Scroll handling
    // -------------------------------------------------------------------------

    /// Throttled scroll/resize tick. Returns `false` when the call fell
    /// inside a pending throttle window and was dropped.
    pub fn handle_scroll(&self, layout: &PageLayout) -> bool {
        if !self.throttle.allow(self.timers.now()) {
            return false;
        }
        self.update_chrome(layout);
        self.update_active_section(layout);
        true
    }

    fn update_chrome(&self, layout: &PageLayout) {
        let scrolled = layout.viewport.scroll_y > SCROLL_THRESHOLD_PX;
        if scrolled == self.is_scrolled.get() {
            return; // no redundant class writes while the state holds
        }
        self.is_scrolled.set(scrolled);
        if let Some(navbar) = self.chrome.navbar {
            let mut reg = self.registry.borrow_mut();
            if scrolled {
                reg.add_classes(navbar, ClassFlags::SCROLLED);
            } else {
                reg.remove_classes(navbar, ClassFlags::SCROLLED);
            }
        }
    }

    /// The section whose `[top, top+height)` range contains the focus line,
    /// or `None` when the line is outside every section.
    pub fn section_at_focus_line(&self, layout: &PageLayout) -> Option<String> {
        let focus_line =
            layout.viewport.scroll_y + layout.nav_height + layout.viewport.height / 3.0;
        let mut active = None;
        for section in layout.sections() {
            if section.contains(focus_line) {
                active = Some(section.id.clone());
            }
        }
        active
    }

    fn update_active_section(&self, layout: &PageLayout) {
        // Retain the previous section when no range matches.
        let Some(section) = self.section_at_focus_line(layout) else {
            return;
        };
        if section != self.current_section.get() {
            self.set_active(&section);
        }
    }

    /// Move the active highlight: clear every link, set the matching one,
    /// and update the current-section signal in the same tick.
    fn set_active(&self, section_id: &str) {
        {
            let links = self.links.borrow();
            let mut reg = self.registry.borrow_mut();
            for &index in links.values() {
                reg.remove_classes(index, ClassFlags::ACTIVE);
            }
            match links.get(section_id) {
                Some(&index) => reg.add_classes(index, ClassFlags::ACTIVE),
                None => warn!(%section_id, "no nav link registered for section"),
            }
        }
        debug!(%section_id, "active section changed");
        self.current_section.set(section_id.to_string());
    }

    // -------------------------------------------------------------------------
    // Nav link clicks
    // -------------------------------------------------------------------------

    /// Nav link click: close the menu, compute the smooth-scroll target
    /// (section top minus nav height minus 20px padding, clamped to >= 0)
    /// and set the active link immediately.
    pub fn scroll_to(
        &self,
        section_id: &str,
        layout: &PageLayout,
    ) -> Result<ScrollRequest, EngineError> {
        let Some(section) = layout.section(section_id) else {
            warn!(%section_id, "scroll target section missing");
            return Err(EngineError::MissingSection(section_id.to_string()));
        };
        self.close_menu();

        let top = (section.top - layout.nav_height - NAV_SCROLL_PADDING_PX).max(0.0);
        self.set_active(section_id);
        Ok(ScrollRequest { top, smooth: true })
    }

    /// Brand link click: back to the top, first section active.
    pub fn scroll_to_top(&self, home_section_id: &str) -> ScrollRequest {
        self.close_menu();
        self.set_active(home_section_id);
        ScrollRequest {
            top: 0.0,
            smooth: true,
        }
    }

    // -------------------------------------------------------------------------
    // Mobile menu
    // -------------------------------------------------------------------------

    pub fn toggle_menu(&self) {
        let open = !self.is_menu_open.get();
        self.is_menu_open.set(open);

        let mut reg = self.registry.borrow_mut();
        for index in [self.chrome.toggle, self.chrome.menu].into_iter().flatten() {
            if open {
                reg.add_classes(index, ClassFlags::ACTIVE);
            } else {
                reg.remove_classes(index, ClassFlags::ACTIVE);
            }
        }
        debug!(open, "mobile menu toggled");
    }

    pub fn close_menu(&self) {
        if self.is_menu_open.get() {
            self.toggle_menu();
        }
    }

    /// Escape key closes the open menu.
    pub fn handle_escape(&self) {
        self.close_menu();
    }

    /// A click landing outside the menu and its toggle closes the menu.
    /// `target` is the clicked element, if any.
    pub fn handle_outside_click(&self, target: Option<usize>) {
        if !self.is_menu_open.get() {
            return;
        }
        let inside = matches!(target, Some(t) if Some(t) == self.chrome.menu || Some(t) == self.chrome.toggle);
        if !inside {
            self.close_menu();
        }
    }

    /// Resize events are debounced; growing past the desktop breakpoint
    /// closes a menu left open from mobile.
    pub fn handle_resize(&self, viewport_width: f64) {
        let tracker = self.clone();
        self.resize_debounce.call(&self.timers, move || {
            if viewport_width > DESKTOP_BREAKPOINT_PX {
                tracker.close_menu();
            }
        });
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ElementRegistry, ElementSpec};
    use crate::layout::Viewport;

    struct Env {
        registry: SharedRegistry,
        timers: Rc<TimerQueue>,
        tracker: NavTracker,
        navbar: usize,
        links: HashMap<&'static str, usize>,
    }

    /// Three sections at [0,100), [100,300), [300,500) with nav height 64
    /// and a 600px viewport - the geometry from the design discussions.
    fn layout(scroll_y: f64) -> PageLayout {
        let mut layout = PageLayout::new(Viewport::new(800.0, 600.0, scroll_y), 64.0);
        layout.push_section("home", 0.0, 100.0);
        layout.push_section("experience", 100.0, 200.0);
        layout.push_section("skills", 300.0, 200.0);
        layout
    }

    fn setup() -> Env {
        let registry = ElementRegistry::shared();
        let timers = Rc::new(TimerQueue::new());

        let (navbar, toggle, menu) = {
            let mut reg = registry.borrow_mut();
            (
                reg.allocate(ElementSpec::default()),
                reg.allocate(ElementSpec::default()),
                reg.allocate(ElementSpec::default()),
            )
        };
        let tracker = NavTracker::new(
            registry.clone(),
            timers.clone(),
            NavChrome {
                navbar: Some(navbar),
                toggle: Some(toggle),
                menu: Some(menu),
            },
            "home",
        );

        let mut links = HashMap::new();
        for id in ["home", "experience", "skills"] {
            let idx = registry.borrow_mut().allocate(ElementSpec::default());
            tracker.register_link(id, idx);
            links.insert(id, idx);
        }

        Env {
            registry,
            timers,
            tracker,
            navbar,
            links,
        }
    }

    /// Scroll offset whose focus line lands at `line` (nav 64, viewport 600).
    fn scroll_for_focus_line(line: f64) -> f64 {
        line - 64.0 - 200.0
    }

    #[test]
    fn test_focus_line_selects_containing_section() {
        let env = setup();
        let layout = layout(scroll_for_focus_line(150.0));
        assert_eq!(
            env.tracker.section_at_focus_line(&layout).as_deref(),
            Some("experience")
        );

        env.tracker.handle_scroll(&layout);
        assert_eq!(env.tracker.current_section(), "experience");
        assert!(env
            .registry
            .borrow()
            .has_class(env.links["experience"], ClassFlags::ACTIVE));
        assert!(!env
            .registry
            .borrow()
            .has_class(env.links["home"], ClassFlags::ACTIVE));
    }

    #[test]
    fn test_focus_line_past_all_sections_retains_previous() {
        let env = setup();
        env.tracker.handle_scroll(&layout(scroll_for_focus_line(350.0)));
        assert_eq!(env.tracker.current_section(), "skills");

        // Focus line 650 is past every range: no flicker to none.
        env.timers.advance(SCROLL_THROTTLE_MS);
        env.tracker.handle_scroll(&layout(scroll_for_focus_line(650.0)));
        assert_eq!(env.tracker.current_section(), "skills");
        assert!(env
            .registry
            .borrow()
            .has_class(env.links["skills"], ClassFlags::ACTIVE));
    }

    #[test]
    fn test_chrome_flips_only_on_threshold_crossing() {
        let env = setup();
        let changes = env.registry.borrow().changes();

        env.tracker.handle_scroll(&layout(10.0));
        assert!(!env.tracker.is_scrolled());

        env.timers.advance(SCROLL_THROTTLE_MS);
        env.tracker.handle_scroll(&layout(51.0));
        assert!(env.tracker.is_scrolled());
        assert!(env.registry.borrow().has_class(env.navbar, ClassFlags::SCROLLED));

        // Staying past the threshold writes nothing further.
        let version = changes.get();
        env.timers.advance(SCROLL_THROTTLE_MS);
        env.tracker.handle_scroll(&layout(400.0));
        assert_eq!(changes.get(), version);

        env.timers.advance(SCROLL_THROTTLE_MS);
        env.tracker.handle_scroll(&layout(50.0)); // back at the threshold: not past it
        assert!(!env.tracker.is_scrolled());
        assert!(!env.registry.borrow().has_class(env.navbar, ClassFlags::SCROLLED));
    }

    #[test]
    fn test_scroll_tick_is_throttled_leading_edge() {
        let env = setup();
        assert!(env.tracker.handle_scroll(&layout(0.0)));
        // Same window: dropped, even though the state would change.
        assert!(!env.tracker.handle_scroll(&layout(400.0)));
        assert_eq!(env.tracker.current_section(), "home");

        env.timers.advance(SCROLL_THROTTLE_MS);
        assert!(env.tracker.handle_scroll(&layout(400.0)));
    }

    #[test]
    fn test_nav_click_scrolls_and_activates_immediately() {
        let env = setup();
        let request = env.tracker.scroll_to("skills", &layout(0.0)).unwrap();

        // 300 - 64 - 20
        assert_eq!(request, ScrollRequest { top: 216.0, smooth: true });
        assert_eq!(env.tracker.current_section(), "skills");
        assert!(env
            .registry
            .borrow()
            .has_class(env.links["skills"], ClassFlags::ACTIVE));
    }

    #[test]
    fn test_nav_click_clamps_to_top() {
        let env = setup();
        let request = env.tracker.scroll_to("home", &layout(500.0)).unwrap();
        assert_eq!(request.top, 0.0); // 0 - 64 - 20 clamps
    }

    #[test]
    fn test_nav_click_missing_section() {
        let env = setup();
        let err = env.tracker.scroll_to("blog", &layout(0.0)).unwrap_err();
        assert_eq!(err, EngineError::MissingSection("blog".into()));
    }

    #[test]
    fn test_brand_link_scrolls_to_top() {
        let env = setup();
        env.tracker.toggle_menu();
        let request = env.tracker.scroll_to_top("home");

        assert_eq!(request.top, 0.0);
        assert_eq!(env.tracker.current_section(), "home");
        assert!(!env.tracker.is_menu_open()); // click also closes the menu
    }

    #[test]
    fn test_menu_toggle_classes() {
        let env = setup();
        env.tracker.toggle_menu();
        assert!(env.tracker.is_menu_open());

        env.tracker.toggle_menu();
        assert!(!env.tracker.is_menu_open());
    }

    #[test]
    fn test_escape_closes_menu() {
        let env = setup();
        env.tracker.toggle_menu();
        env.tracker.handle_escape();
        assert!(!env.tracker.is_menu_open());

        env.tracker.handle_escape(); // closed: no-op
        assert!(!env.tracker.is_menu_open());
    }

    #[test]
    fn test_outside_click_closes_menu() {
        let env = setup();
        env.tracker.toggle_menu();

        // Click on the menu itself: stays open.
        let menu = env.tracker.chrome.menu;
        env.tracker.handle_outside_click(menu);
        assert!(env.tracker.is_menu_open());

        env.tracker.handle_outside_click(None);
        assert!(!env.tracker.is_menu_open());
    }

    #[test]
    fn test_resize_to_desktop_closes_menu_debounced() {
        let env = setup();
        env.tracker.toggle_menu();

        env.tracker.handle_resize(1024.0);
        assert!(env.tracker.is_menu_open()); // debounce pending

        env.timers.advance(RESIZE_DEBOUNCE_MS);
        assert!(!env.tracker.is_menu_open());
    }

    #[test]
    fn test_resize_below_breakpoint_keeps_menu() {
        let env = setup();
        env.tracker.toggle_menu();
        env.tracker.handle_resize(500.0);
        env.timers.advance(RESIZE_DEBOUNCE_MS);
        assert!(env.tracker.is_menu_open());
    }
}
