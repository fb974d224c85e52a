//! Global input → pan translation.
//!
//! Raw keyboard and wheel events arrive from an OS-wide hook on its own
//! thread. The translator keeps a snapshot of the gating modifiers and turns
//! gated wheel rotation into [`PanDelta`]s; the hook forwards those to the
//! control loop only while a subscription is attached.

mod hook;
mod translator;

pub use hook::{InputError, InputHook, InputSubscription};
pub use translator::PanTranslator;

/// The modifier keys that gate wheel panning. Left and right variants of a
/// key are reported as the same modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKey {
    Meta,
    Alt,
}

/// A raw global input event, reduced to what panning cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Key pressed. `None` for keys that are not gating modifiers.
    KeyDown(Option<ModifierKey>),
    KeyUp(Option<ModifierKey>),
    /// Wheel rotation in OS-reported notches.
    Wheel { rotation: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanAxis {
    Horizontal,
}

/// A single requested scroll adjustment of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanDelta {
    pub axis: PanAxis,
    pub magnitude: f64,
}

impl PanDelta {
    pub fn horizontal(magnitude: f64) -> Self {
        Self {
            axis: PanAxis::Horizontal,
            magnitude,
        }
    }
}
