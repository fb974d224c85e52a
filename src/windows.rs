//! Tauri-backed presentation surfaces.
//!
//! The viewport window shows the captured stream and sits docked mostly
//! off-screen; the overlay window is a transparent, click-through frame that
//! outlines the shared region for everyone looking at the physical screen.
//! Neither window can take focus, so showing them never pulls the keyboard
//! away from the app being presented.

use crate::capture::{Frame, FrameSink};
use crate::controller::ControlEvent;
use crate::geometry::ScreenBounds;
use crate::selection::Source;
use crate::sync::{Display, DisplayTopology, OverlaySurface, SurfaceError, ViewportCommand, ViewportSurface};
use serde::Serialize;
use tauri::{
    AppHandle, Emitter, PhysicalPosition, PhysicalSize, WebviewUrl, WebviewWindow,
    WebviewWindowBuilder, WindowEvent,
};
use tokio::sync::mpsc::UnboundedSender;

pub const VIEWPORT_LABEL: &str = "viewport";
pub const OVERLAY_LABEL: &str = "overlay";

/// Builder flags that differ between the two surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SurfaceStyle {
    label: &'static str,
    page: &'static str,
    title: &'static str,
    focusable: bool,
    transparent: bool,
    always_on_top: bool,
    skip_taskbar: bool,
    click_through: bool,
}

const VIEWPORT_STYLE: SurfaceStyle = SurfaceStyle {
    label: VIEWPORT_LABEL,
    page: "index.html",
    title: "WNDW",
    focusable: false,
    transparent: false,
    always_on_top: false,
    skip_taskbar: false,
    click_through: false,
};

const OVERLAY_STYLE: SurfaceStyle = SurfaceStyle {
    label: OVERLAY_LABEL,
    page: "overlay.html",
    title: "WNDW Overlay",
    focusable: false,
    transparent: true,
    always_on_top: true,
    skip_taskbar: true,
    click_through: true,
};

fn surface_builder<'a>(
    app: &'a AppHandle,
    style: &SurfaceStyle,
) -> WebviewWindowBuilder<'a, tauri::Wry, AppHandle> {
    WebviewWindowBuilder::new(app, style.label, WebviewUrl::App(style.page.into()))
        .title(style.title)
        .decorations(false)
        .resizable(false)
        .shadow(false)
        .focused(false)
        .focusable(style.focusable)
        .transparent(style.transparent)
        .always_on_top(style.always_on_top)
        .skip_taskbar(style.skip_taskbar)
        .visible(false)
}

/// Creates both windows hidden. Closing the viewport shuts the app down.
pub fn create_windows(
    app: &AppHandle,
    events: UnboundedSender<ControlEvent>,
) -> Result<(WebviewWindow, WebviewWindow), Box<dyn std::error::Error>> {
    let viewport = surface_builder(app, &VIEWPORT_STYLE)
        .inner_size(1920.0, 1080.0)
        .min_inner_size(720.0, 720.0)
        .max_inner_size(5000.0, 5000.0)
        .build()?;

    viewport.on_window_event(move |event| {
        if let WindowEvent::Destroyed = event {
            log::info!("Viewport window closed, quitting");
            let _ = events.send(ControlEvent::Shutdown);
        }
    });

    let overlay = surface_builder(app, &OVERLAY_STYLE)
        .position(0.0, 0.0)
        .build()?;
    overlay.set_ignore_cursor_events(OVERLAY_STYLE.click_through)?;

    Ok((viewport, overlay))
}

fn window_error(e: tauri::Error) -> SurfaceError {
    SurfaceError::Window(e.to_string())
}

/// Shows a window without activating it.
fn show_without_focus(window: &WebviewWindow) -> Result<(), SurfaceError> {
    window.set_focusable(false).map_err(window_error)?;
    window.show().map_err(window_error)
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamStart<'a> {
    session: u64,
    source: &'a Source,
}

pub struct ViewportWindow {
    window: WebviewWindow,
}

impl ViewportWindow {
    pub fn new(window: WebviewWindow) -> Self {
        Self { window }
    }
}

impl ViewportSurface for ViewportWindow {
    fn show_inactive(&self) -> Result<(), SurfaceError> {
        show_without_focus(&self.window)
    }

    fn hide(&self) -> Result<(), SurfaceError> {
        self.window.hide().map_err(window_error)
    }

    fn position(&self) -> Result<(i32, i32), SurfaceError> {
        let position = self.window.outer_position().map_err(window_error)?;
        Ok((position.x, position.y))
    }

    fn move_to(&self, x: i32, y: i32) -> Result<(), SurfaceError> {
        self.window
            .set_position(PhysicalPosition::new(x, y))
            .map_err(window_error)
    }

    fn send(&self, command: ViewportCommand) -> Result<(), SurfaceError> {
        let sent = match command {
            ViewportCommand::ApplyPanDelta(delta) => self.window.emit("pan-delta", delta),
            ViewportCommand::BeginStream { session, source } => self.window.emit(
                "sharing-start",
                StreamStart {
                    session,
                    source: &source,
                },
            ),
            ViewportCommand::EndStream => self.window.emit("sharing-stop", ()),
        };
        sent.map_err(window_error)
    }
}

/// Forwards captured frames to the viewport webview and capture failures
/// to the control loop.
pub struct ViewportFrames {
    window: WebviewWindow,
    events: UnboundedSender<ControlEvent>,
}

impl ViewportFrames {
    pub fn new(window: WebviewWindow, events: UnboundedSender<ControlEvent>) -> Self {
        Self { window, events }
    }
}

impl FrameSink for ViewportFrames {
    fn deliver(&self, frame: Frame) -> Result<(), SurfaceError> {
        self.window.emit("stream-frame", frame).map_err(window_error)
    }

    fn failed(&self, session: u64, reason: String) {
        let event = ControlEvent::StreamFailed {
            session,
            message: reason,
        };
        if self.events.send(event).is_err() {
            log::warn!(
                "[CAPTURE] Control loop is gone, dropping failure of session {}",
                session
            );
        }
    }
}

pub struct OverlayWindow {
    window: WebviewWindow,
}

impl OverlayWindow {
    pub fn new(window: WebviewWindow) -> Self {
        Self { window }
    }
}

impl OverlaySurface for OverlayWindow {
    fn show_inactive(&self) -> Result<(), SurfaceError> {
        show_without_focus(&self.window)
    }

    fn hide(&self) -> Result<(), SurfaceError> {
        self.window.hide().map_err(window_error)
    }

    fn set_bounds(&self, bounds: ScreenBounds) -> Result<(), SurfaceError> {
        self.window
            .set_position(PhysicalPosition::new(bounds.x, bounds.y))
            .map_err(window_error)?;
        self.window
            .set_size(PhysicalSize::new(bounds.width, bounds.height))
            .map_err(window_error)
    }
}

/// Display layout as the windowing system sees it.
pub struct TauriDisplays {
    app: AppHandle,
}

impl TauriDisplays {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl DisplayTopology for TauriDisplays {
    fn displays(&self) -> Result<Vec<Display>, SurfaceError> {
        let monitors = self.app.available_monitors().map_err(window_error)?;
        Ok(monitors
            .iter()
            .map(|m| Display {
                name: m.name().cloned().unwrap_or_default(),
                bounds: ScreenBounds {
                    x: m.position().x,
                    y: m.position().y,
                    width: m.size().width,
                    height: m.size().height,
                },
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_surface_can_take_focus() {
        for style in [VIEWPORT_STYLE, OVERLAY_STYLE] {
            assert!(!style.focusable, "{} must not be focusable", style.label);
        }
    }

    #[test]
    fn only_the_overlay_is_click_through() {
        assert!(OVERLAY_STYLE.click_through && OVERLAY_STYLE.transparent);
        assert!(OVERLAY_STYLE.always_on_top && OVERLAY_STYLE.skip_taskbar);
        assert!(!VIEWPORT_STYLE.click_through);
    }

    #[test]
    fn stream_start_payload_carries_session() {
        let source = Source {
            id: "screen:7".into(),
            display_key: "7".into(),
            label: "Studio Display".into(),
            origin: (2880, 0),
        };
        let payload = serde_json::to_value(StreamStart {
            session: 4,
            source: &source,
        })
        .unwrap();
        assert_eq!(payload["session"], 4);
        assert_eq!(payload["source"]["displayKey"], "7");
    }
}
