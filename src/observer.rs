//! Viewport Observer - one-shot intersection notifications.
//!
//! Wraps the host's viewport-intersection capability behind one-shot watch
//! registrations:
//! - `observe(index, on_enter)` fires `on_enter` at most once, the first time
//!   the element crosses the visibility threshold, then auto-unregisters.
//! - Delivery happens during [`ViewportObserver::deliver`], driven from the
//!   page tick with the current layout snapshot. Notifications for distinct
//!   elements are unordered relative to each other.
//! - `observe` returns a disposer; dropping interest early is the caller's
//!   one-shot subscription escape hatch.
//!
//! Construction fails with [`EngineError::ObserverUnavailable`] when the host
//! reports no intersection capability. Dependents must then degrade to the
//! synchronous reveal path rather than silently doing nothing.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::layout::{PageLayout, Viewport, is_in_viewport};

/// Fire when 10% of the element is visible.
pub const INTERSECTION_THRESHOLD: f64 = 0.1;

/// Trigger 50px before the element geometrically enters the viewport.
pub const ROOT_MARGIN_PX: f64 = 50.0;

// =============================================================================
// Host Capabilities
// =============================================================================

/// What the host environment can deliver. Queried once at mount.
#[derive(Debug, Clone, Copy)]
pub struct HostCapabilities {
    pub intersection_observer: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
        }
    }
}

// =============================================================================
// Observer
// =============================================================================

/// Observer geometry knobs. Defaults match the page's reveal tuning.
#[derive(Debug, Clone, Copy)]
pub struct ObserverConfig {
    pub threshold: f64,
    pub margin_px: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            threshold: INTERSECTION_THRESHOLD,
            margin_px: ROOT_MARGIN_PX,
        }
    }
}

struct Watch {
    index: usize,
    on_enter: Box<dyn FnOnce(usize)>,
    disposed: Rc<Cell<bool>>,
}

/// One-shot viewport intersection watcher.
pub struct ViewportObserver {
    config: ObserverConfig,
    watches: RefCell<Vec<Watch>>,
}

impl std::fmt::Debug for ViewportObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportObserver")
            .field("config", &self.config)
            .field("watches", &self.watches.borrow().len())
            .finish()
    }
}

impl ViewportObserver {
    /// Build an observer, or report unavailable so callers can fall back
    /// to immediate reveal.
    pub fn new(caps: &HostCapabilities, config: ObserverConfig) -> Result<Self, EngineError> {
        if !caps.intersection_observer {
            warn!("intersection capability missing, observer unavailable");
            return Err(EngineError::ObserverUnavailable);
        }
        Ok(Self {
            config,
            watches: RefCell::new(Vec::new()),
        })
    }

    /// Register interest in an element. `on_enter` fires at most once, after
    /// which the registration is dropped automatically. The returned disposer
    /// cancels the registration without firing.
    pub fn observe(&self, index: usize, on_enter: impl FnOnce(usize) + 'static) -> impl FnOnce() {
        let disposed = Rc::new(Cell::new(false));
        self.watches.borrow_mut().push(Watch {
            index,
            on_enter: Box::new(on_enter),
            disposed: disposed.clone(),
        });
        move || disposed.set(true)
    }

    /// Number of live registrations.
    pub fn watch_count(&self) -> usize {
        self.watches
            .borrow()
            .iter()
            .filter(|w| !w.disposed.get())
            .count()
    }

    /// Check every registration against the snapshot and fire the ones whose
    /// element has entered. Returns how many fired. Callbacks run with the
    /// watch list unborrowed, so they may register further watches.
    pub fn deliver(&self, layout: &PageLayout) -> usize {
        let pending = std::mem::take(&mut *self.watches.borrow_mut());
        let mut kept = Vec::with_capacity(pending.len());
        let mut fired = 0;

        for watch in pending {
            if watch.disposed.get() {
                continue;
            }
            let entered = layout
                .rect(watch.index)
                .is_some_and(|rect| self.has_entered(&rect, layout));
            if entered {
                watch.disposed.set(true);
                (watch.on_enter)(watch.index);
                fired += 1;
            } else {
                kept.push(watch);
            }
        }

        // Merge back behind anything registered by the callbacks.
        let mut watches = self.watches.borrow_mut();
        kept.append(&mut *watches);
        *watches = kept;

        if fired > 0 {
            debug!(fired, remaining = watches.len(), "intersection delivery");
        }
        fired
    }

    fn has_entered(&self, rect: &crate::layout::Rect, layout: &PageLayout) -> bool {
        // The margin extends the viewport's bottom edge so elements trigger
        // before they geometrically enter.
        let extended = Viewport {
            width: layout.viewport.width,
            height: layout.viewport.height + self.config.margin_px,
            scroll_y: layout.viewport.scroll_y,
        };
        is_in_viewport(rect, &extended, self.config.threshold)
    }
}

// =============================================================================
// Tests
// =============================================================================
