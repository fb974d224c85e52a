use super::{
    display_nearest_point, DisplayTopology, OverlaySurface, SurfaceError, ViewportCommand,
    ViewportSurface,
};
use crate::capture::{FramePipeline, FrameStream};
use crate::geometry::{to_source_rect, SourceRect, ViewportGeometry};
use crate::input::{PanAxis, PanDelta};
use crate::selection::Source;
use std::time::Duration;

/// Owns both presentation surfaces and relays state between them.
///
/// Multi-step operations (start, stop) keep going when a single step fails:
/// each failure is logged and the remaining steps still run, so a hidden
/// overlay never outlives a stopped share.
pub struct WindowSynchronizer {
    viewport: Box<dyn ViewportSurface>,
    overlay: Box<dyn OverlaySurface>,
    displays: Box<dyn DisplayTopology>,
    frames: FramePipeline,
    settle_delay: Duration,
    dock_margin: u32,
    streaming: Option<Source>,
    stream: Option<FrameStream>,
    last_session: u64,
    last_rect: Option<SourceRect>,
}

impl WindowSynchronizer {
    pub fn new(
        viewport: Box<dyn ViewportSurface>,
        overlay: Box<dyn OverlaySurface>,
        displays: Box<dyn DisplayTopology>,
        frames: FramePipeline,
        settle_delay: Duration,
        dock_margin: u32,
    ) -> Self {
        Self {
            viewport,
            overlay,
            displays,
            frames,
            settle_delay,
            dock_margin,
            streaming: None,
            stream: None,
            last_session: 0,
            last_rect: None,
        }
    }

    /// The source whose frames the viewport is showing.
    pub fn streaming(&self) -> Option<&Source> {
        self.streaming.as_ref()
    }

    /// Session number of the running stream.
    pub fn session(&self) -> Option<u64> {
        self.stream.as_ref().map(FrameStream::session)
    }

    /// The last rectangle forwarded to the overlay in this share.
    pub fn last_rect(&self) -> Option<SourceRect> {
        self.last_rect
    }

    /// Reveals both surfaces, docks the viewport and starts streaming `source`.
    ///
    /// Must run inside a tokio runtime; the frame pump is a spawned task.
    pub fn start(&mut self, source: Source) {
        log_failure("show overlay", self.overlay.show_inactive());
        log_failure("show viewport", self.viewport.show_inactive());
        log_failure("dock viewport", self.dock_viewport());

        self.last_session += 1;
        let session = self.last_session;
        log::info!(
            "[SYNC] Streaming {} ({}) as session {}",
            source.label,
            source.id,
            session
        );
        self.last_rect = None;
        log_failure(
            "begin stream",
            self.viewport.send(ViewportCommand::BeginStream {
                session,
                source: source.clone(),
            }),
        );
        self.stream = Some(FrameStream::spawn(&self.frames, source.clone(), session));
        self.streaming = Some(source);
    }

    /// Moves the viewport so only a corner of it stays on screen, `dock_margin`
    /// pixels from the bottom-right of the display nearest its current position.
    pub fn dock_viewport(&self) -> Result<(), SurfaceError> {
        let position = self.viewport.position()?;
        let displays = self.displays.displays()?;
        let display = display_nearest_point(&displays, position).ok_or(SurfaceError::NoDisplay)?;
        let (x, y) = dock_position(&display.bounds, self.dock_margin);
        log::debug!("[SYNC] Docking viewport on {} at {},{}", display.name, x, y);
        self.viewport.move_to(x, y)
    }

    pub fn relay_pan(&self, delta: PanDelta) -> Result<(), SurfaceError> {
        match delta.axis {
            PanAxis::Horizontal => self
                .viewport
                .send(ViewportCommand::ApplyPanDelta(delta.magnitude)),
        }
    }

    /// Maps fresh viewport geometry onto the overlay.
    ///
    /// Returns the rectangle forwarded, or `None` when nothing is streaming,
    /// the geometry is not measurable yet, or the rectangle is unchanged.
    pub fn on_geometry_changed(
        &mut self,
        geometry: &ViewportGeometry,
    ) -> Result<Option<SourceRect>, SurfaceError> {
        let Some(source) = self.streaming.as_ref() else {
            return Ok(None);
        };
        if !geometry.is_measurable() {
            log::debug!("[SYNC] Ignoring unmeasurable geometry {:?}", geometry);
            return Ok(None);
        }

        let rect = to_source_rect(geometry);
        if self.last_rect == Some(rect) {
            return Ok(None);
        }

        self.overlay.set_bounds(rect.to_screen_bounds(source.origin))?;
        self.last_rect = Some(rect);
        log::debug!(
            "[SYNC] Overlay at {},{} {}x{}",
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );
        Ok(Some(rect))
    }

    /// Ends the stream, waits for the viewport to clear, then hides both surfaces.
    pub async fn stop(&mut self) {
        // Stop the pump first so no frame follows EndStream.
        self.stream = None;
        log_failure("end stream", self.viewport.send(ViewportCommand::EndStream));

        // Let the viewport drop its last frame before the window disappears.
        tokio::time::sleep(self.settle_delay).await;

        log_failure("hide overlay", self.overlay.hide());
        log_failure("hide viewport", self.viewport.hide());
        self.streaming = None;
        self.last_rect = None;
        log::info!("[SYNC] Surfaces hidden");
    }
}

fn dock_position(bounds: &crate::geometry::ScreenBounds, margin: u32) -> (i32, i32) {
    let right = bounds.x as i64 + bounds.width as i64 - margin as i64;
    let bottom = bounds.y as i64 + bounds.height as i64 - margin as i64;
    (right as i32, bottom as i32)
}

fn log_failure(step: &str, result: Result<(), SurfaceError>) {
    if let Err(e) = result {
        log::warn!("[SYNC] Failed to {}: {}", step, e);
    }
}
