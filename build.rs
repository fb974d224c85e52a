//! Build script for the WNDW Tauri app.
//!
//! Generates Tauri's context (config, capabilities, embedded frontend).

fn main() {
    tauri_build::build();
}
