//! System tray setup and menu rendering.
//!
//! The tray menu is the primary entry point for WNDW: it toggles sharing,
//! picks the display to share, and quits. The control loop re-renders it
//! from a [`MenuModel`] whenever the sources or the phase change.

use crate::controller::{
    event_for_menu_id, ControlEvent, ControlSurface, MenuModel, MENU_QUIT_ID, MENU_TOGGLE_ID,
    TOGGLE_ACCELERATOR,
};
use crate::sync::SurfaceError;
use tauri::{
    image::Image as TauriImage,
    menu::{CheckMenuItemBuilder, Menu, MenuBuilder, MenuItemBuilder},
    tray::TrayIconBuilder,
    AppHandle,
};
use tokio::sync::mpsc::UnboundedSender;

pub const TRAY_ID: &str = "main";

/// Creates the tray icon with a placeholder menu and routes menu clicks
/// into the control loop.
pub fn setup_tray(
    app: &AppHandle,
    events: UnboundedSender<ControlEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    let toggle_item = MenuItemBuilder::with_id(MENU_TOGGLE_ID, "Start sharing")
        .accelerator(TOGGLE_ACCELERATOR)
        .build(app)?;
    let quit_item = MenuItemBuilder::with_id(MENU_QUIT_ID, "Quit").build(app)?;
    let menu = MenuBuilder::new(app)
        .item(&toggle_item)
        .separator()
        .item(&quit_item)
        .build()?;

    // Decode the PNG icon to RGBA for Tauri's Image type
    let icon_bytes = include_bytes!("../icons/32x32.png");
    let icon_img = image::load_from_memory(icon_bytes)
        .map_err(|e| format!("Failed to decode tray icon: {}", e))?;
    let rgba = icon_img.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let tray_icon = TauriImage::new_owned(rgba.into_raw(), w, h);

    TrayIconBuilder::with_id(TRAY_ID)
        .icon(tray_icon)
        .tooltip("WNDW")
        .menu(&menu)
        .show_menu_on_left_click(true)
        .build(app)?;

    app.on_menu_event(move |_app, event| {
        let id: &str = event.id().as_ref();
        match event_for_menu_id(id) {
            Some(control_event) => {
                log::info!("[TRAY] Menu item {} clicked", id);
                if events.send(control_event).is_err() {
                    log::warn!("[TRAY] Control loop is gone, ignoring {}", id);
                }
            }
            None => log::debug!("[TRAY] Unhandled menu item {}", id),
        }
    });

    Ok(())
}

/// Renders the control loop's menu model onto the tray icon.
pub struct TrayMenu {
    app: AppHandle,
}

impl TrayMenu {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl ControlSurface for TrayMenu {
    fn render(&self, model: &MenuModel) -> Result<(), SurfaceError> {
        let tray = self
            .app
            .tray_by_id(TRAY_ID)
            .ok_or(SurfaceError::Missing("tray"))?;
        let menu = build_menu(&self.app, model).map_err(|e| SurfaceError::Window(e.to_string()))?;
        tray.set_menu(Some(menu))
            .map_err(|e| SurfaceError::Window(e.to_string()))
    }
}

fn build_menu(app: &AppHandle, model: &MenuModel) -> tauri::Result<Menu<tauri::Wry>> {
    let toggle = MenuItemBuilder::with_id(MENU_TOGGLE_ID, model.toggle_label)
        .accelerator(TOGGLE_ACCELERATOR)
        .build(app)?;
    let mut builder = MenuBuilder::new(app).item(&toggle);

    if let Some(status) = &model.status {
        let status_item = MenuItemBuilder::new(status).enabled(false).build(app)?;
        builder = builder.item(&status_item);
    }

    builder = builder.separator();
    for entry in &model.sources {
        let item = CheckMenuItemBuilder::with_id(entry.menu_id.as_str(), &entry.label)
            .checked(entry.checked)
            .build(app)?;
        builder = builder.item(&item);
    }

    let version = MenuItemBuilder::new(&model.version_label)
        .enabled(false)
        .build(app)?;
    let quit = MenuItemBuilder::with_id(MENU_QUIT_ID, "Quit").build(app)?;

    builder.separator().item(&version).item(&quit).build()
}
