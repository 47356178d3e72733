//! Counter Animator - number count-up on the shared timer queue.
//!
//! One-shot and independent of the reveal record: a counter can run on an
//! element whether or not it has been revealed. Linear interpolation from 0
//! to the target, sampled every 16ms, clamped to exactly the target on the
//! final tick. Under reduced motion the full formatted value lands
//! immediately.

use std::rc::Rc;

use tracing::warn;

use crate::engine::SharedRegistry;
use crate::scheduler::TimerQueue;
use crate::state::motion::MotionPreference;
use crate::types::CounterFormat;

/// Sampling cadence (~60fps).
pub const COUNTER_TICK_MS: u64 = 16;

/// Duration applied when the markup does not specify one.
pub const DEFAULT_COUNTER_DURATION_MS: u64 = 2000;

/// Animate `index`'s text from 0 to `target` over `duration_ms`.
pub fn animate_counter(
    registry: &SharedRegistry,
    timers: &TimerQueue,
    motion: &MotionPreference,
    index: usize,
    target: i64,
    duration_ms: u64,
    format: CounterFormat,
) {
    if !registry.borrow().is_allocated(index) {
        warn!(index, "counter target not registered");
        return;
    }
    if motion.is_reduced() || target <= 0 {
        registry.borrow_mut().set_text(index, format.format(target));
        return;
    }

    let steps = (duration_ms / COUNTER_TICK_MS).max(1);
    let increment = target as f64 / steps as f64;
    let mut current = 0.0;
    let registry = Rc::clone(registry);
    timers.set_interval(COUNTER_TICK_MS, move || {
        current += increment;
        let done = current >= target as f64;
        if done {
            current = target as f64; // clamp the final sample exactly
        }
        registry
            .borrow_mut()
            .set_text(index, format.format(current.floor() as i64));
        !done
    });
}

// =============================================================================
// Tests
// =============================================================================
