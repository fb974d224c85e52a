//! Viewport-to-source coordinate mapping — functional core.
//!
//! This module has zero infrastructure dependencies.
//! It takes the viewport's scroll state in, returns a crop rectangle in
//! source-native pixels out.

use serde::{Deserialize, Serialize};

/// Scroll and size state of the viewport that displays the captured stream.
///
/// Reported by the viewport webview on every scroll and resize. All lengths
/// except `content_*` are in the viewport's layout units; `content_*` is the
/// native resolution of the active source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportGeometry {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub visible_width: f64,
    pub visible_height: f64,
    /// Full scrollable width of the content after layout.
    pub scroll_width: f64,
    pub content_width: f64,
    pub content_height: f64,
}

impl ViewportGeometry {
    /// Whether the geometry can be mapped.
    ///
    /// The viewport reports zero sizes until the stream's metadata has
    /// loaded; such reports are dropped instead of mapped.
    pub fn is_measurable(&self) -> bool {
        let positive = [
            self.visible_width,
            self.visible_height,
            self.scroll_width,
            self.content_width,
            self.content_height,
        ];
        positive.iter().all(|v| v.is_finite() && *v > 0.0)
            && self.scroll_x.is_finite()
            && self.scroll_y.is_finite()
    }

    /// Ratio of native source pixels to viewport layout units.
    pub fn shrink_factor(&self) -> f64 {
        self.content_width / self.scroll_width
    }
}

/// Crop rectangle in source-native pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SourceRect {
    /// Translates the rectangle into desktop coordinates of the display
    /// whose top-left corner sits at `origin`.
    pub fn to_screen_bounds(&self, origin: (i32, i32)) -> ScreenBounds {
        ScreenBounds {
            x: origin.0.saturating_add(self.x as i32),
            y: origin.1.saturating_add(self.y as i32),
            width: self.width,
            height: self.height,
        }
    }
}

/// A rectangle in desktop (multi-display) physical pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenBounds {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let right = self.x as i64 + self.width as i64;
        let bottom = self.y as i64 + self.height as i64;
        (x as i64) >= self.x as i64
            && (x as i64) < right
            && (y as i64) >= self.y as i64
            && (y as i64) < bottom
    }

    /// Squared distance from a point to the nearest edge of the rectangle.
    /// Zero when the point is inside.
    pub fn distance_squared_to(&self, x: i32, y: i32) -> i64 {
        let right = self.x as i64 + self.width as i64;
        let bottom = self.y as i64 + self.height as i64;
        let dx = if (x as i64) < self.x as i64 {
            self.x as i64 - x as i64
        } else if (x as i64) > right {
            x as i64 - right
        } else {
            0
        };
        let dy = if (y as i64) < self.y as i64 {
            self.y as i64 - y as i64
        } else if (y as i64) > bottom {
            y as i64 - bottom
        } else {
            0
        };
        dx * dx + dy * dy
    }
}

/// Converts the viewport's scroll state into the source rectangle it shows.
///
/// This is a pure function with no side effects: identical geometry always
/// yields an identical rectangle. Rounding is half away from zero, and each
/// value is clamped to the source's native bounds so a transient over-scroll
/// during resize never produces a rectangle outside the source.
pub fn to_source_rect(geometry: &ViewportGeometry) -> SourceRect {
    let factor = geometry.shrink_factor();
    let max_w = geometry.content_width;
    let max_h = geometry.content_height;

    SourceRect {
        x: scale(geometry.scroll_x, factor, max_w),
        y: scale(geometry.scroll_y, factor, max_h),
        width: scale(geometry.visible_width, factor, max_w),
        height: scale(geometry.visible_height, factor, max_h),
    }
}

fn scale(value: f64, factor: f64, max: f64) -> u32 {
    (value * factor).round().clamp(0.0, max.round()) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(scroll_x: f64, visible_width: f64, scroll_width: f64, content_width: f64) -> ViewportGeometry {
        ViewportGeometry {
            scroll_x,
            scroll_y: 0.0,
            visible_width,
            visible_height: 450.0,
            scroll_width,
            content_width,
            content_height: 900.0,
        }
    }

    #[test]
    fn shrink_factor_two_doubles_offsets() {
        let rect = to_source_rect(&geometry(100.0, 200.0, 800.0, 1600.0));
        assert_eq!(rect.x, 200);
        assert_eq!(rect.width, 400);
        assert_eq!(rect.height, 900);
    }

    #[test]
    fn mapping_is_idempotent() {
        let g = geometry(123.4, 567.8, 1000.0, 2560.0);
        assert_eq!(to_source_rect(&g), to_source_rect(&g));
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // factor 1.0 so the scaled values are the raw inputs
        let mut g = geometry(10.5, 20.5, 1000.0, 1000.0);
        g.scroll_y = 2.5;
        let rect = to_source_rect(&g);
        assert_eq!(rect.x, 11);
        assert_eq!(rect.width, 21);
        assert_eq!(rect.y, 3);
    }

    #[test]
    fn overscroll_is_clamped_to_source() {
        let mut g = geometry(900.0, 400.0, 800.0, 1600.0);
        g.scroll_y = -5.0;
        let rect = to_source_rect(&g);
        assert_eq!(rect.x, 1600);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.width, 800);
    }

    #[test]
    fn visible_span_stays_within_source() {
        let scroll_width = 977.0;
        let content_width = 2880.0;
        let visible = 311.0;
        let mut scroll = 0.0;
        while scroll + visible <= scroll_width {
            let rect = to_source_rect(&geometry(scroll, visible, scroll_width, content_width));
            assert!(
                rect.x + rect.width <= content_width as u32 + 1,
                "scroll {} gave {:?}",
                scroll,
                rect
            );
            scroll += 13.7;
        }
    }

    #[test]
    fn unloaded_stream_is_not_measurable() {
        let g = geometry(0.0, 640.0, 0.0, 0.0);
        assert!(!g.is_measurable());
        assert!(geometry(0.0, 640.0, 800.0, 1600.0).is_measurable());
    }

    #[test]
    fn screen_bounds_follow_display_origin() {
        let rect = SourceRect { x: 10, y: 20, width: 300, height: 200 };
        let bounds = rect.to_screen_bounds((-1920, 0));
        assert_eq!(bounds, ScreenBounds { x: -1910, y: 20, width: 300, height: 200 });
    }

    #[test]
    fn distance_is_zero_inside() {
        let b = ScreenBounds { x: 0, y: 0, width: 100, height: 100 };
        assert!(b.contains(50, 50));
        assert_eq!(b.distance_squared_to(50, 50), 0);
        assert_eq!(b.distance_squared_to(103, 104), 9 + 16);
    }
}
