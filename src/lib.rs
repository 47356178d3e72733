//! # unveil
//!
//! Scroll-driven reveal and navigation engine with fine-grained reactivity.
//!
//! The engine owns all behavioral state for a scrolling page - which elements
//! have revealed, which nav section is active, running counter and typing
//! animations - while the host owns rendering and measurement. Each tick the
//! host hands in a [`layout::PageLayout`] snapshot (element rects, section
//! extents, scroll offset) and a clock reading; the engine advances its timer
//! queue, delivers intersection watches, and mutates element class state
//! through the registry. Hosts observe results via signals and the registry
//! version.
//!
//! ## Architecture
//!
//! - **engine/**: element registry, the single authority on class/text state
//! - **scheduler**: deterministic timer queue, throttle and debounce
//! - **layout**: host-supplied geometry snapshots and visibility math
//! - **observer**: one-shot viewport entry watches with pre-entry margin
//! - **state/**: reveal engine, scroll/nav tracker, motion preference,
//!   counter and typing animators
//! - **mount**: [`mount::Page`], the composition root
//!
//! ## Example
//!
//! ```ignore
//! use unveil::{AnimationKind, ElementSpec, Page, PageConfig};
//!
//! let page = Page::mount(PageConfig::default());
//! let card = page.register_element(ElementSpec {
//!     kind: AnimationKind::SlideUp,
//!     ..Default::default()
//! });
//!
//! // Host loop: measure, then tick.
//! page.stagger_reveal(&[card], 0, &layout);
//! page.tick(&layout, now_ms);
//! ```

pub mod engine;
pub mod error;
pub mod layout;
pub mod mount;
pub mod observer;
pub mod scheduler;
pub mod state;
pub mod types;

pub use engine::{ElementRegistry, ElementSpec, SharedRegistry};
pub use error::EngineError;
pub use layout::{PageLayout, Rect, SectionDescriptor, Viewport};
pub use mount::{Page, PageConfig};
pub use observer::{HostCapabilities, ObserverConfig, ViewportObserver};
pub use scheduler::{Debounce, Throttle, TimerId, TimerQueue};
pub use state::{
    DEFAULT_COUNTER_DURATION_MS, DEFAULT_TYPE_SPEED_MS, MotionPreference, NavChrome, NavTracker,
    RevealEngine, STAGGER_DELAY_MS, ScrollRequest, animate_counter, type_effect,
};
pub use types::{AnimationKind, ClassFlags, CounterFormat};
