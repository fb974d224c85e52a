//! Display enumeration and capture using the `xcap` crate.
//!
//! This is the infrastructure layer: it talks to the OS.

use super::{CaptureError, FrameGrabber, SourceProvider};
use crate::selection::Source;
use image::RgbaImage;
use xcap::Monitor;

/// xcap reports monitor positions in logical units everywhere but Windows,
/// while captured frames and window positions are physical pixels.
const POSITIONS_ARE_LOGICAL: bool = !cfg!(target_os = "windows");

/// Lists and captures monitors through xcap.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonitorSources;

impl SourceProvider for MonitorSources {
    fn list_sources(&self) -> Result<Vec<Source>, CaptureError> {
        let monitors =
            Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;

        let mut sources = Vec::with_capacity(monitors.len());
        for (index, monitor) in monitors.iter().enumerate() {
            let id = monitor.id().map_err(|e| CaptureError::MonitorAttribute {
                index,
                field: "id",
                reason: e.to_string(),
            })?;
            let x = monitor.x().unwrap_or(0);
            let y = monitor.y().unwrap_or(0);
            let scale = monitor.scale_factor().unwrap_or(1.0);
            // Unnamed monitors show their source id in the menu.
            let source_id = format!("screen:{}", id);
            let label = monitor
                .name()
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| source_id.clone());

            sources.push(Source {
                id: source_id,
                display_key: id.to_string(),
                label,
                origin: physical_origin((x, y), scale, POSITIONS_ARE_LOGICAL),
            });
        }

        log::debug!("[CAPTURE] Enumerated {} display(s)", sources.len());
        Ok(sources)
    }

    fn primary_display_key(&self) -> Option<String> {
        let monitors = Monitor::all().ok()?;
        monitors
            .iter()
            .find(|m| m.is_primary().unwrap_or(false))
            .or_else(|| monitors.first())
            .and_then(|m| m.id().ok())
            .map(|id| id.to_string())
    }
}

impl FrameGrabber for MonitorSources {
    fn grab(&self, source: &Source) -> Result<RgbaImage, CaptureError> {
        let monitor = Monitor::all()
            .map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?
            .into_iter()
            .find(|m| m.id().is_ok_and(|id| id.to_string() == source.display_key))
            .ok_or_else(|| CaptureError::DisplayGone(source.display_key.clone()))?;

        monitor
            .capture_image()
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))
    }
}

/// Converts a monitor's top-left corner to physical desktop pixels.
fn physical_origin(position: (i32, i32), scale: f32, logical: bool) -> (i32, i32) {
    if !logical || !scale.is_finite() || scale <= 0.0 {
        return position;
    }
    let scale = scale as f64;
    (
        (position.0 as f64 * scale).round() as i32,
        (position.1 as f64 * scale).round() as i32,
    )
}
