//! Typing Animator - character-at-a-time text reveal.
//!
//! One-shot like the counter, independent of the reveal record. Clears the
//! element's text and appends one character per interval tick at a fixed
//! cadence. Under reduced motion the full text lands immediately.

use std::rc::Rc;

use tracing::warn;

use crate::engine::SharedRegistry;
use crate::scheduler::TimerQueue;
use crate::state::motion::MotionPreference;

/// Default typing cadence per character.
pub const DEFAULT_TYPE_SPEED_MS: u64 = 100;

/// Type `text` into `index` one character every `speed_ms`.
pub fn type_effect(
    registry: &SharedRegistry,
    timers: &TimerQueue,
    motion: &MotionPreference,
    index: usize,
    text: &str,
    speed_ms: u64,
) {
    if !registry.borrow().is_allocated(index) {
        warn!(index, "typing target not registered");
        return;
    }
    if motion.is_reduced() || text.is_empty() {
        registry.borrow_mut().set_text(index, text);
        return;
    }

    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;
    let registry = Rc::clone(registry);
    registry.borrow_mut().set_text(index, "");
    timers.set_interval(speed_ms, move || {
        registry.borrow_mut().append_text(index, chars[pos]);
        pos += 1;
        pos < chars.len()
    });
}

// =============================================================================
// Tests
// =============================================================================
