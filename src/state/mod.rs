//! Engine state modules: motion preference, reveal, navigation, animators.

pub mod counter;
pub mod motion;
pub mod navigation;
pub mod reveal;
pub mod typing;

pub use counter::{DEFAULT_COUNTER_DURATION_MS, animate_counter};
pub use motion::MotionPreference;
pub use navigation::{NavChrome, NavTracker, ScrollRequest};
pub use reveal::{RevealEngine, STAGGER_DELAY_MS};
pub use typing::{DEFAULT_TYPE_SPEED_MS, type_effect};
