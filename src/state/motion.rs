//! Global Motion Preference - reduced-motion accessibility state.
//!
//! A single reactive boolean mirroring the host's reduced-motion media
//! preference. The host seeds it at mount and calls [`MotionPreference::set_reduced`]
//! from its media-preference-change callback; every animator reads it before
//! performing a transition. Shared by clone - all clones observe the same
//! signal.

use spark_signals::{Signal, signal};
use tracing::debug;

#[derive(Clone)]
pub struct MotionPreference {
    reduced: Signal<bool>,
}

impl MotionPreference {
    pub fn new(initially_reduced: bool) -> Self {
        Self {
            reduced: signal(initially_reduced),
        }
    }

    /// Whether non-essential animation should be suppressed right now.
    pub fn is_reduced(&self) -> bool {
        self.reduced.get()
    }

    /// Media-preference-change entry point.
    pub fn set_reduced(&self, reduced: bool) {
        if self.reduced.get() != reduced {
            debug!(reduced, "motion preference changed");
            self.reduced.set(reduced);
        }
    }

    /// The underlying signal, for reactive tracking in effects.
    pub fn signal(&self) -> Signal<bool> {
        self.reduced.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let motion = MotionPreference::new(false);
        let clone = motion.clone();

        motion.set_reduced(true);
        assert!(clone.is_reduced());

        clone.set_reduced(false);
        assert!(!motion.is_reduced());
    }

    #[test]
    fn test_initial_value() {
        assert!(MotionPreference::new(true).is_reduced());
        assert!(!MotionPreference::new(false).is_reduced());
    }
}
