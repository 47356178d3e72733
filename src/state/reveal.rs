//! Reveal Engine - one-time visual state transitions.
//!
//! Owns the reveal record: the add-only set of element indices that have
//! been revealed. `reveal` is idempotent; the record is written synchronously
//! *before* the per-element delay, so a second call racing a pending timer
//! cannot double-schedule. After the delay, exactly one of two outcomes:
//!
//! - reduced motion: only the terminal `VISIBLE` state, no kind class
//! - otherwise: the kind class plus `VISIBLE`
//!
//! followed in both cases by `ANIMATED` (fully settled).
//!
//! `stagger_reveal` assigns incrementing delays across a sequence and
//! delegates each element to the viewport observer - or reveals immediately
//! when the element is already visible at registration time, since an
//! intersection event may never fire for something already inside a low
//! threshold. Without an observer, everything degrades to immediate reveal.
//!
//! The engine is cheap to clone; clones share the record, registry, and
//! timers. This is what lets observer callbacks re-enter the engine.

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::ReactiveSet;
use tracing::{debug, warn};

use crate::engine::SharedRegistry;
use crate::layout::{PageLayout, is_in_viewport};
use crate::observer::{INTERSECTION_THRESHOLD, ViewportObserver};
use crate::scheduler::TimerQueue;
use crate::state::motion::MotionPreference;
use crate::types::ClassFlags;

/// Additional delay per element index in a staggered sequence.
pub const STAGGER_DELAY_MS: u64 = 150;

// =============================================================================
// Reveal Engine
// =============================================================================

#[derive(Clone)]
pub struct RevealEngine {
    registry: SharedRegistry,
    timers: Rc<TimerQueue>,
    motion: MotionPreference,
    observer: Option<Rc<ViewportObserver>>,
    // Mutation goes through borrow_mut; clones of the engine share one record.
    revealed: Rc<RefCell<ReactiveSet<usize>>>,
}

impl RevealEngine {
    /// `observer: None` puts the engine in degraded mode: every reveal path
    /// is synchronous/immediate instead of intersection-driven.
    pub fn new(
        registry: SharedRegistry,
        timers: Rc<TimerQueue>,
        motion: MotionPreference,
        observer: Option<Rc<ViewportObserver>>,
    ) -> Self {
        Self {
            registry,
            timers,
            motion,
            observer,
            revealed: Rc::new(RefCell::new(ReactiveSet::new())),
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.borrow().contains(&index)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.borrow().len()
    }

    /// Reveal one element. No-op if already in the record. The class
    /// mutation lands after the element's configured delay; the motion
    /// preference is read when the timer fires, not when it is scheduled.
    pub fn reveal(&self, index: usize) {
        let (kind, delay_ms) = {
            let reg = self.registry.borrow();
            match (reg.kind(index), reg.delay_ms(index)) {
                (Some(kind), Some(delay_ms)) => (kind, delay_ms),
                _ => {
                    warn!(index, "reveal target not registered");
                    return;
                }
            }
        };
        if self.revealed.borrow().contains(&index) {
            return;
        }
        // Record membership before the delay: re-entrancy guard.
        self.revealed.borrow_mut().insert(index);

        let registry = self.registry.clone();
        let motion = self.motion.clone();
        self.timers.set_timeout(delay_ms, move || {
            let mut reg = registry.borrow_mut();
            if motion.is_reduced() {
                reg.add_classes(index, ClassFlags::VISIBLE);
            } else {
                reg.add_classes(index, kind.class() | ClassFlags::VISIBLE);
            }
            reg.add_classes(index, ClassFlags::ANIMATED);
        });
    }

    /// Assign element `i` a delay of `base_delay_ms + i * 150` and route it
    /// to the observer, or reveal immediately if already visible (or when no
    /// observer is available). Delay assignment is deterministic by index;
    /// visual order across elements is not guaranteed.
    pub fn stagger_reveal(&self, indices: &[usize], base_delay_ms: u64, layout: &PageLayout) {
        for (i, &index) in indices.iter().enumerate() {
            let delay = base_delay_ms + i as u64 * STAGGER_DELAY_MS;
            {
                let mut reg = self.registry.borrow_mut();
                if !reg.is_allocated(index) {
                    warn!(index, "stagger target not registered");
                    continue;
                }
                reg.set_delay_ms(index, delay);
            }

            let visible_now = layout
                .rect(index)
                .is_some_and(|rect| is_in_viewport(&rect, &layout.viewport, INTERSECTION_THRESHOLD));

            match (&self.observer, visible_now) {
                (_, true) => self.reveal(index),
                (Some(observer), false) => {
                    let engine = self.clone();
                    let _dispose = observer.observe(index, move |idx| engine.reveal(idx));
                }
                (None, false) => self.reveal(index),
            }
        }
    }

    /// Clear the reveal record and strip reveal classes from every element.
    /// For full re-initialization only. In-flight reveal timers are not
    /// cancelled; one that fires after a reset mutates a now-stripped
    /// element - an accepted inconsistency window.
    pub fn reset(&self) {
        self.revealed.borrow_mut().clear();
        let mut reg = self.registry.borrow_mut();
        for index in reg.indices() {
            reg.remove_classes(index, ClassFlags::REVEAL);
        }
        debug!("reveal record cleared");
    }
}

// =============================================================================
// Tests
// =============================================================================
