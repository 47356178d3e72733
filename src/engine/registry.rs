//! Element Registry - index allocation for watchable elements.
//!
//! Elements are indices into the registry rather than owned handles:
//! - ID <-> index bidirectional mapping
//! - Free index pool for O(1) reuse
//! - Per-element animation kind, delay, class flags, and text content
//! - A version signal so deriveds/effects react to any visual mutation
//!
//! The registry is the only authority on visual class state. The host renders
//! by reading [`ElementRegistry::classes`] inside an effect that tracks
//! [`ElementRegistry::changes`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{Signal, signal};
use tracing::warn;

use crate::types::{AnimationKind, ClassFlags};

/// Shared handle; every engine component holds a clone.
pub type SharedRegistry = Rc<RefCell<ElementRegistry>>;

// =============================================================================
// Element Spec
// =============================================================================

/// Registration-time attributes, read from page markup at load.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    /// Stable string id. Generated (`e0`, `e1`, ...) when not provided.
    pub id: Option<String>,
    pub kind: AnimationKind,
    /// Reveal delay in milliseconds. Stagger scheduling overwrites this.
    pub delay_ms: u64,
}

impl ElementSpec {
    /// Spec from raw markup tags; unknown kinds fall back to fade-in.
    pub fn from_markup(id: Option<&str>, kind_tag: &str, delay_ms: u64) -> Self {
        Self {
            id: id.map(str::to_string),
            kind: AnimationKind::from_tag(kind_tag),
            delay_ms,
        }
    }
}

#[derive(Debug, Clone)]
struct Element {
    id: String,
    kind: AnimationKind,
    delay_ms: u64,
    classes: ClassFlags,
    text: String,
}

// =============================================================================
// Registry
// =============================================================================

pub struct ElementRegistry {
    elements: Vec<Option<Element>>,
    id_to_index: HashMap<String, usize>,
    free: Vec<usize>,
    id_counter: usize,
    /// Bumped on every visual mutation (classes or text).
    version: Signal<u64>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            id_to_index: HashMap::new(),
            free: Vec::new(),
            id_counter: 0,
            version: signal(0),
        }
    }

    /// Construct pre-wrapped for sharing across engine components.
    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    /// Allocate an index for an element. Re-registering an existing id
    /// returns its current index unchanged.
    pub fn allocate(&mut self, spec: ElementSpec) -> usize {
        let id = match spec.id {
            Some(id) => id,
            None => {
                let id = format!("e{}", self.id_counter);
                self.id_counter += 1;
                id
            }
        };

        if let Some(&index) = self.id_to_index.get(&id) {
            return index;
        }

        let element = Element {
            id: id.clone(),
            kind: spec.kind,
            delay_ms: spec.delay_ms,
            classes: ClassFlags::empty(),
            text: String::new(),
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.elements[index] = Some(element);
                index
            }
            None => {
                self.elements.push(Some(element));
                self.elements.len() - 1
            }
        };
        self.id_to_index.insert(id, index);
        index
    }

    /// Release an index back to the pool.
    pub fn release(&mut self, index: usize) {
        let Some(slot) = self.elements.get_mut(index) else {
            return;
        };
        if let Some(element) = slot.take() {
            self.id_to_index.remove(&element.id);
            self.free.push(index);
        }
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    pub fn id_of(&self, index: usize) -> Option<&str> {
        self.get(index).map(|e| e.id.as_str())
    }

    pub fn is_allocated(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// All currently allocated indices, in index order.
    pub fn indices(&self) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|_| i))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index).and_then(Option::as_ref)
    }

    // -------------------------------------------------------------------------
    // Element attributes
    // -------------------------------------------------------------------------

    pub fn kind(&self, index: usize) -> Option<AnimationKind> {
        self.get(index).map(|e| e.kind)
    }

    pub fn delay_ms(&self, index: usize) -> Option<u64> {
        self.get(index).map(|e| e.delay_ms)
    }

    /// Overwrite the element's reveal delay (stagger scheduling does this).
    pub fn set_delay_ms(&mut self, index: usize, delay_ms: u64) {
        match self.elements.get_mut(index).and_then(Option::as_mut) {
            Some(element) => element.delay_ms = delay_ms,
            None => warn!(index, "set_delay_ms target not registered"),
        }
    }

    // -------------------------------------------------------------------------
    // Visual state
    // -------------------------------------------------------------------------

    pub fn classes(&self, index: usize) -> ClassFlags {
        self.get(index).map(|e| e.classes).unwrap_or_default()
    }

    pub fn has_class(&self, index: usize, flags: ClassFlags) -> bool {
        self.classes(index).contains(flags)
    }

    /// Add class flags. Missing targets are logged and skipped, never a fault.
    pub fn add_classes(&mut self, index: usize, flags: ClassFlags) {
        let Some(element) = self.elements.get_mut(index).and_then(Option::as_mut) else {
            warn!(index, ?flags, "add_classes target not registered");
            return;
        };
        let next = element.classes | flags;
        if next != element.classes {
            element.classes = next;
            self.bump();
        }
    }

    /// Remove class flags. Writes nothing when the flags are already absent.
    pub fn remove_classes(&mut self, index: usize, flags: ClassFlags) {
        let Some(element) = self.elements.get_mut(index).and_then(Option::as_mut) else {
            warn!(index, ?flags, "remove_classes target not registered");
            return;
        };
        let next = element.classes - flags;
        if next != element.classes {
            element.classes = next;
            self.bump();
        }
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.get(index).map(|e| e.text.as_str())
    }

    pub fn set_text(&mut self, index: usize, text: impl Into<String>) {
        let Some(element) = self.elements.get_mut(index).and_then(Option::as_mut) else {
            warn!(index, "set_text target not registered");
            return;
        };
        element.text = text.into();
        self.bump();
    }

    pub fn append_text(&mut self, index: usize, ch: char) {
        let Some(element) = self.elements.get_mut(index).and_then(Option::as_mut) else {
            warn!(index, "append_text target not registered");
            return;
        };
        element.text.push(ch);
        self.bump();
    }

    /// Version signal for reactive rendering. Reading it inside an effect
    /// creates a dependency on every visual mutation.
    pub fn changes(&self) -> Signal<u64> {
        self.version.clone()
    }

    fn bump(&self) {
        self.version.set(self.version.get() + 1);
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
