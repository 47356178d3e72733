//! Mount API - page lifecycle and the tick loop.
//!
//! [`Page::mount`] assembles one engine instance: registry, timer queue,
//! motion preference, viewport observer (when available), reveal engine, and
//! navigation tracker. Multiple pages are fully independent - nothing here
//! is process-wide.
//!
//! The host drives the engine from its own loop:
//!
//! ```ignore
//! use unveil::{Page, PageConfig, PageLayout, Viewport};
//!
//! let page = Page::mount(PageConfig::default());
//! // register elements, nav links, stagger groups ...
//!
//! loop {
//!     let layout = measure(); // host-owned: rects, sections, scroll offset
//!     page.tick(&layout, now_ms());
//! }
//! ```
//!
//! Per tick, in order: the timer queue advances (reveal delays, animator
//! intervals), pending intersection watches are delivered against the fresh
//! snapshot, then the scroll tracker recomputes chrome/active-section on its
//! own throttled cadence. Within one element's lifecycle this keeps
//! `enter -> scheduled reveal timer -> class mutation` strictly sequential.

use std::rc::Rc;

use spark_signals::{Signal, signal};
use tracing::warn;

use crate::engine::{ElementRegistry, ElementSpec, SharedRegistry};
use crate::layout::PageLayout;
use crate::observer::{HostCapabilities, ObserverConfig, ViewportObserver};
use crate::scheduler::{Throttle, TimerQueue};
use crate::state::counter::animate_counter;
use crate::state::motion::MotionPreference;
use crate::state::navigation::{NavChrome, NavTracker, SCROLL_THROTTLE_MS};
use crate::state::reveal::RevealEngine;
use crate::state::typing::type_effect;
use crate::types::CounterFormat;

// =============================================================================
// Config
// =============================================================================

#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Section considered active before the first scroll tick.
    pub initial_section: String,
    /// Seed for the motion preference; the host updates it on media changes.
    pub reduced_motion: bool,
    pub capabilities: HostCapabilities,
    pub observer: ObserverConfig,
    pub chrome: NavChrome,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            initial_section: "home".to_string(),
            reduced_motion: false,
            capabilities: HostCapabilities::default(),
            observer: ObserverConfig::default(),
            chrome: NavChrome::default(),
        }
    }
}

// =============================================================================
// Page
// =============================================================================

/// One mounted page: the composition root for all engine state.
pub struct Page {
    registry: SharedRegistry,
    timers: Rc<TimerQueue>,
    motion: MotionPreference,
    observer: Option<Rc<ViewportObserver>>,
    reveal: RevealEngine,
    nav: NavTracker,
    scroll_progress: Signal<f64>,
    progress_throttle: Throttle,
}

impl Page {
    /// Assemble a page. An unavailable intersection capability is not an
    /// error: the reveal engine degrades to the immediate/synchronous path.
    pub fn mount(config: PageConfig) -> Self {
        let registry = ElementRegistry::shared();
        let timers = Rc::new(TimerQueue::new());
        let motion = MotionPreference::new(config.reduced_motion);

        let observer = match ViewportObserver::new(&config.capabilities, config.observer) {
            Ok(observer) => Some(Rc::new(observer)),
            Err(err) => {
                warn!(%err, "mounting with immediate reveal fallback");
                None
            }
        };

        let reveal = RevealEngine::new(
            registry.clone(),
            timers.clone(),
            motion.clone(),
            observer.clone(),
        );
        let nav = NavTracker::new(
            registry.clone(),
            timers.clone(),
            config.chrome,
            config.initial_section,
        );

        Self {
            registry,
            timers,
            motion,
            observer,
            reveal,
            nav,
            scroll_progress: signal(0.0),
            progress_throttle: Throttle::new(SCROLL_THROTTLE_MS),
        }
    }

    // -------------------------------------------------------------------------
    // Component access
    // -------------------------------------------------------------------------

    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    pub fn timers(&self) -> Rc<TimerQueue> {
        self.timers.clone()
    }

    pub fn motion(&self) -> &MotionPreference {
        &self.motion
    }

    pub fn reveal_engine(&self) -> &RevealEngine {
        &self.reveal
    }

    pub fn nav(&self) -> &NavTracker {
        &self.nav
    }

    /// Whether the async intersection path is available.
    pub fn observer_available(&self) -> bool {
        self.observer.is_some()
    }

    // -------------------------------------------------------------------------
    // Public operations
    // -------------------------------------------------------------------------

    pub fn register_element(&self, spec: ElementSpec) -> usize {
        self.registry.borrow_mut().allocate(spec)
    }

    pub fn reveal(&self, index: usize) {
        self.reveal.reveal(index);
    }

    pub fn stagger_reveal(&self, indices: &[usize], base_delay_ms: u64, layout: &PageLayout) {
        self.reveal.stagger_reveal(indices, base_delay_ms, layout);
    }

    pub fn reset(&self) {
        self.reveal.reset();
    }

    pub fn animate_counter(
        &self,
        index: usize,
        target: i64,
        duration_ms: u64,
        format: CounterFormat,
    ) {
        animate_counter(
            &self.registry,
            &self.timers,
            &self.motion,
            index,
            target,
            duration_ms,
            format,
        );
    }

    pub fn type_effect(&self, index: usize, text: &str, speed_ms: u64) {
        type_effect(&self.registry, &self.timers, &self.motion, index, text, speed_ms);
    }

    pub fn current_section(&self) -> String {
        self.nav.current_section()
    }

    pub fn is_menu_open(&self) -> bool {
        self.nav.is_menu_open()
    }

    /// Page scroll progress 0-100, throttled like the scroll tracker.
    pub fn scroll_progress(&self) -> f64 {
        self.scroll_progress.get()
    }

    pub fn scroll_progress_signal(&self) -> Signal<f64> {
        self.scroll_progress.clone()
    }

    // -------------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------------

    /// Advance the engine to `now_ms` against a fresh layout snapshot.
    pub fn tick(&self, layout: &PageLayout, now_ms: u64) {
        self.timers.advance_to(now_ms);
        if let Some(observer) = &self.observer {
            observer.deliver(layout);
        }
        self.nav.handle_scroll(layout);
        self.update_progress(layout);
    }

    fn update_progress(&self, layout: &PageLayout) {
        if !self.progress_throttle.allow(self.timers.now()) {
            return;
        }
        let progress = layout.scroll_percentage();
        if progress != self.scroll_progress.get() {
            self.scroll_progress.set(progress);
        }
    }

    /// Tear down: drop every pending timer without running it.
    pub fn unmount(self) {
        self.timers.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
