//! Element registry and shared engine plumbing.

pub mod registry;

pub use registry::{ElementRegistry, ElementSpec, SharedRegistry};
