//! Window synchronization — keeps the viewport and overlay surfaces in step.
//!
//! Surfaces are reached only through the message-passing traits below; the
//! Tauri-backed implementations live in `windows.rs`, tests use fakes.

mod synchronizer;

pub use synchronizer::WindowSynchronizer;

use crate::geometry::ScreenBounds;
use crate::selection::Source;

/// Messages the viewport surface accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportCommand {
    /// Scroll the viewport horizontally by this many layout units.
    ApplyPanDelta(f64),
    /// A new share of `source` starts; its frames are tagged with `session`.
    BeginStream { session: u64, source: Source },
    /// Drop the current share's frames and clear the last one shown.
    EndStream,
}

/// The window that displays the captured stream to the sharer.
pub trait ViewportSurface: Send {
    /// Makes the surface visible without taking focus from the foreground app.
    fn show_inactive(&self) -> Result<(), SurfaceError>;
    fn hide(&self) -> Result<(), SurfaceError>;
    /// Top-left corner in desktop coordinates.
    fn position(&self) -> Result<(i32, i32), SurfaceError>;
    fn move_to(&self, x: i32, y: i32) -> Result<(), SurfaceError>;
    fn send(&self, command: ViewportCommand) -> Result<(), SurfaceError>;
}

/// The click-through window outlining the shared region on screen.
pub trait OverlaySurface: Send {
    fn show_inactive(&self) -> Result<(), SurfaceError>;
    fn hide(&self) -> Result<(), SurfaceError>;
    fn set_bounds(&self, bounds: ScreenBounds) -> Result<(), SurfaceError>;
}

/// A physical display as reported by the windowing system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pub name: String,
    pub bounds: ScreenBounds,
}

pub trait DisplayTopology: Send {
    fn displays(&self) -> Result<Vec<Display>, SurfaceError>;
}

/// Picks the display containing `point`, or failing that the one closest to it.
///
/// Ties resolve to enumeration order.
pub fn display_nearest_point(displays: &[Display], point: (i32, i32)) -> Option<&Display> {
    displays
        .iter()
        .min_by_key(|d| d.bounds.distance_squared_to(point.0, point.1))
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Surface '{0}' is not available")]
    Missing(&'static str),

    #[error("Window operation failed: {0}")]
    Window(String),

    #[error("No display found")]
    NoDisplay,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(name: &str, x: i32, y: i32, width: u32, height: u32) -> Display {
        Display {
            name: name.into(),
            bounds: ScreenBounds { x, y, width, height },
        }
    }

    #[test]
    fn containing_display_wins() {
        let displays = vec![
            display("left", -1920, 0, 1920, 1080),
            display("main", 0, 0, 2560, 1440),
        ];
        let nearest = display_nearest_point(&displays, (100, 100)).unwrap();
        assert_eq!(nearest.name, "main");
    }

    #[test]
    fn offscreen_point_picks_closest_display() {
        let displays = vec![
            display("main", 0, 0, 2560, 1440),
            display("right", 2560, 0, 1920, 1080),
        ];
        let nearest = display_nearest_point(&displays, (4500, 1100)).unwrap();
        assert_eq!(nearest.name, "right");
    }

    #[test]
    fn ties_resolve_to_first_display() {
        let displays = vec![display("a", 0, 0, 100, 100), display("b", 200, 0, 100, 100)];
        let nearest = display_nearest_point(&displays, (150, 50)).unwrap();
        assert_eq!(nearest.name, "a");
    }

    #[test]
    fn no_displays_yields_none() {
        assert!(display_nearest_point(&[], (0, 0)).is_none());
    }
}
