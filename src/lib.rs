//! WNDW — Tauri application entry point.
//!
//! This is the app shell that wires together:
//! - The control loop owning the sharing state (controller.rs)
//! - Viewport and overlay windows (windows.rs) kept in step by sync/
//! - System tray menu (tray.rs) and global hotkeys (shortcuts.rs)
//! - The global wheel hook (input/), display enumeration and frame capture (capture/)
//! - Tauri command handlers the viewport webview reports through

pub mod capture;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod input;
pub mod selection;
pub mod sync;

mod shortcuts;
mod tray;
mod windows;

use capture::{FramePipeline, MonitorSources};
use config::Config;
use controller::{ControlEvent, SharingController};
use geometry::ViewportGeometry;
use input::InputHook;
use std::sync::Arc;
use sync::WindowSynchronizer;
use tokio::sync::mpsc::{self, UnboundedSender};

/// Sender side of the control loop's channel, shared with command handlers.
struct ControlChannel(UnboundedSender<ControlEvent>);

impl ControlChannel {
    fn send(&self, event: ControlEvent) -> Result<(), String> {
        self.0
            .send(event)
            .map_err(|_| "Control loop is not running".to_string())
    }
}

/// Tauri command: the viewport scrolled, resized, or showed a frame of a new size.
#[tauri::command]
fn report_viewport_geometry(
    channel: tauri::State<'_, ControlChannel>,
    geometry: ViewportGeometry,
) -> Result<(), String> {
    channel.send(ControlEvent::GeometryChanged(geometry))
}

/// Entry point, called by the Tauri runtime.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::init();

    let config = Config::from_env().unwrap_or_else(|e| {
        log::error!("[CONFIG] {}, falling back to defaults", e);
        Config::default()
    });
    let (tx, rx) = mpsc::unbounded_channel();

    tauri::Builder::default()
        .manage(ControlChannel(tx.clone()))
        .invoke_handler(tauri::generate_handler![report_viewport_geometry])
        .setup(move |app| {
            log::info!("WNDW starting up");
            let handle = app.handle().clone();

            let (viewport, overlay) = windows::create_windows(&handle, tx.clone())?;
            tray::setup_tray(&handle, tx.clone())?;
            shortcuts::setup_shortcuts(&handle, tx.clone())?;

            let hook_tx = tx.clone();
            let hook = InputHook::new(config.wheel_scale, move |delta| {
                let _ = hook_tx.send(ControlEvent::Pan(delta));
            });
            if let Err(e) = hook.install_os_listener() {
                log::error!("[INPUT] Wheel panning unavailable: {}", e);
            }

            let frames = FramePipeline::new(
                Arc::new(MonitorSources),
                Arc::new(windows::ViewportFrames::new(viewport.clone(), tx.clone())),
                config.frame_interval,
            );
            let sync = WindowSynchronizer::new(
                Box::new(windows::ViewportWindow::new(viewport)),
                Box::new(windows::OverlayWindow::new(overlay)),
                Box::new(windows::TauriDisplays::new(handle.clone())),
                frames,
                config.settle_delay,
                config.dock_margin,
            );
            let sharing = SharingController::new(
                config.clone(),
                sync,
                Box::new(MonitorSources),
                Box::new(tray::TrayMenu::new(handle.clone())),
                hook,
            );

            let watcher_tx = tx.clone();
            tauri::async_runtime::spawn(capture::watch_displays(
                MonitorSources,
                config.topology_poll_interval,
                move || watcher_tx.send(ControlEvent::DisplaysChanged).is_ok(),
            ));

            let exit_handle = handle.clone();
            tauri::async_runtime::spawn(async move {
                sharing.run(rx).await;
                exit_handle.exit(0);
            });

            log::info!("Tray and hotkeys ready, toggle with {}", controller::TOGGLE_ACCELERATOR);
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("Error running WNDW");
}
