//! Global hotkeys: pan left, pan right, toggle sharing.
//!
//! All three use Super+Control+Alt+Shift so they never collide with
//! application shortcuts, and fire whichever window has focus.

use crate::controller::ControlEvent;
use tauri::AppHandle;
use tauri_plugin_global_shortcut::{Code, GlobalShortcutExt, Modifiers, Shortcut, ShortcutState};
use tokio::sync::mpsc::UnboundedSender;

fn hyper(code: Code) -> Shortcut {
    Shortcut::new(
        Some(Modifiers::SUPER | Modifiers::CONTROL | Modifiers::ALT | Modifiers::SHIFT),
        code,
    )
}

pub fn pan_left_shortcut() -> Shortcut {
    hyper(Code::ArrowLeft)
}

pub fn pan_right_shortcut() -> Shortcut {
    hyper(Code::ArrowRight)
}

pub fn toggle_shortcut() -> Shortcut {
    hyper(Code::KeyS)
}

pub fn event_for_shortcut(shortcut: &Shortcut) -> Option<ControlEvent> {
    if *shortcut == pan_left_shortcut() {
        Some(ControlEvent::PanLeft)
    } else if *shortcut == pan_right_shortcut() {
        Some(ControlEvent::PanRight)
    } else if *shortcut == toggle_shortcut() {
        Some(ControlEvent::ToggleSharing)
    } else {
        None
    }
}

/// Installs the global-shortcut plugin and registers the three hotkeys.
pub fn setup_shortcuts(
    app: &AppHandle,
    events: UnboundedSender<ControlEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    app.plugin(
        tauri_plugin_global_shortcut::Builder::new()
            .with_handler(move |_app, shortcut, event| {
                if event.state() != ShortcutState::Pressed {
                    return;
                }
                if let Some(control_event) = event_for_shortcut(shortcut) {
                    log::debug!("[INPUT] Hotkey {:?}", control_event);
                    let _ = events.send(control_event);
                }
            })
            .build(),
    )?;

    for shortcut in [pan_left_shortcut(), pan_right_shortcut(), toggle_shortcut()] {
        app.global_shortcut().register(shortcut)?;
    }

    log::info!("[INPUT] Global hotkeys registered");
    Ok(())
}
