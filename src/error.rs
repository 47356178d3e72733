//! Error taxonomy.
//!
//! None of these should ever surface as a correctness failure to the page:
//! the worst acceptable outcome anywhere in the engine is "no animation".
//! Missing targets are logged and skipped; an unavailable observer degrades
//! every dependent to the synchronous reveal path.

use thiserror::Error;

/// Errors the engine can report to the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The host environment cannot deliver intersection notifications.
    /// Dependents must reveal synchronously instead of silently doing nothing.
    #[error("viewport intersection primitive unavailable")]
    ObserverUnavailable,

    /// A navigation operation targeted a section absent from the layout.
    #[error("section `{0}` not found in layout")]
    MissingSection(String),
}
