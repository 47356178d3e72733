//! Core types for unveil.
//!
//! These types define the foundation that everything builds on.
//! They flow between the host (which owns the real render tree) and the
//! engine (which owns reveal/navigation state).

use bitflags::bitflags;

// =============================================================================
// Animation Kind
// =============================================================================

/// Entrance animation assigned to a watchable element.
///
/// Unrecognized tags from markup resolve to [`AnimationKind::FadeIn`] rather
/// than erroring - a misspelled data attribute must never block a reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationKind {
    #[default]
    FadeIn,
    SlideUp,
    SlideLeft,
    SlideRight,
    ScaleIn,
    RotateIn,
}

impl AnimationKind {
    /// Parse a markup tag (e.g. `"slide-up"`). Unknown tags fall back to fade-in.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "fade-in" => Self::FadeIn,
            "slide-up" => Self::SlideUp,
            "slide-left" => Self::SlideLeft,
            "slide-right" => Self::SlideRight,
            "scale-in" => Self::ScaleIn,
            "rotate-in" => Self::RotateIn,
            _ => Self::FadeIn,
        }
    }

    /// The class flag applied when this animation runs.
    pub const fn class(self) -> ClassFlags {
        match self {
            Self::FadeIn => ClassFlags::FADE_IN,
            Self::SlideUp => ClassFlags::SLIDE_UP,
            Self::SlideLeft => ClassFlags::SLIDE_LEFT,
            Self::SlideRight => ClassFlags::SLIDE_RIGHT,
            Self::ScaleIn => ClassFlags::SCALE_IN,
            Self::RotateIn => ClassFlags::ROTATE_IN,
        }
    }

    /// The markup tag for this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::FadeIn => "fade-in",
            Self::SlideUp => "slide-up",
            Self::SlideLeft => "slide-left",
            Self::SlideRight => "slide-right",
            Self::ScaleIn => "scale-in",
            Self::RotateIn => "rotate-in",
        }
    }
}

// =============================================================================
// Class Flags
// =============================================================================

bitflags! {
    /// Visual class state for one element, packed into a single word.
    ///
    /// The host maps these back to real class names when it renders.
    /// Kind flags and `VISIBLE`/`ANIMATED` are written by the reveal engine;
    /// `ACTIVE`/`SCROLLED` are written by the navigation tracker.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClassFlags: u16 {
        const FADE_IN = 1 << 0;
        const SLIDE_UP = 1 << 1;
        const SLIDE_LEFT = 1 << 2;
        const SLIDE_RIGHT = 1 << 3;
        const SCALE_IN = 1 << 4;
        const ROTATE_IN = 1 << 5;
        /// Terminal visible state; applied on every reveal.
        const VISIBLE = 1 << 6;
        /// Fully settled; distinguishes "in transition" from "done".
        const ANIMATED = 1 << 7;
        /// Active nav link highlight (also the open state of menu chrome).
        const ACTIVE = 1 << 8;
        /// Navbar chrome past the scroll threshold.
        const SCROLLED = 1 << 9;
    }
}

impl ClassFlags {
    /// All kind-specific animation flags.
    pub const ANIMATION: Self = Self::FADE_IN
        .union(Self::SLIDE_UP)
        .union(Self::SLIDE_LEFT)
        .union(Self::SLIDE_RIGHT)
        .union(Self::SCALE_IN)
        .union(Self::ROTATE_IN);

    /// Everything a reveal (or reset) touches: kind flags plus the
    /// visible/animated terminal states.
    pub const REVEAL: Self = Self::ANIMATION.union(Self::VISIBLE).union(Self::ANIMATED);
}

// =============================================================================
// Counter Format
// =============================================================================

/// Display format for animated counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterFormat {
    /// Grouped integer, e.g. `1,250`.
    #[default]
    Plain,
    /// `42%`
    Percentage,
    /// `$1,250`
    Currency,
    /// Rounded to thousands, e.g. `3K+` for 2500.
    Thousands,
}

impl CounterFormat {
    /// Parse a markup format tag. Unknown tags fall back to plain.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "percentage" => Self::Percentage,
            "currency" => Self::Currency,
            "thousands" => Self::Thousands,
            _ => Self::Plain,
        }
    }

    /// Format a sampled counter value for display.
    pub fn format(self, value: i64) -> String {
        match self {
            Self::Percentage => format!("{value}%"),
            Self::Currency => format!("${}", group_thousands(value)),
            Self::Thousands => format!("{}K+", ((value as f64) / 1000.0).round() as i64),
            Self::Plain => group_thousands(value),
        }
    }
}

/// Group an integer with comma separators (`2500` -> `"2,500"`).
pub fn group_thousands(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

// =============================================================================
// Tests
// =============================================================================
