//! The control loop — single owner of the sharing state.
//!
//! Every state transition and every relay between surfaces happens here, on
//! one task, in the order events arrive on the channel. The tray, the global
//! shortcuts, the input hook, the topology watcher and the viewport webview
//! only ever send [`ControlEvent`]s.

use crate::capture::SourceProvider;
use crate::config::Config;
use crate::geometry::ViewportGeometry;
use crate::input::{InputHook, InputSubscription, PanDelta};
use crate::selection::{SelectionState, SharingPhase, Source};
use crate::sync::{SurfaceError, WindowSynchronizer};
use tokio::sync::mpsc::UnboundedReceiver;

pub const MENU_TOGGLE_ID: &str = "toggle";
pub const MENU_QUIT_ID: &str = "quit";
const MENU_SOURCE_PREFIX: &str = "source:";

/// Accelerator shown next to the toggle item; matches the global shortcut.
pub const TOGGLE_ACCELERATOR: &str = "Super+Control+Alt+Shift+S";

#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    ToggleSharing,
    /// Choose the display to share, by display key.
    SelectSource(String),
    Pan(PanDelta),
    PanLeft,
    PanRight,
    GeometryChanged(ViewportGeometry),
    DisplaysChanged,
    /// Capturing the shared display failed for the share numbered `session`.
    StreamFailed { session: u64, message: String },
    Shutdown,
}

/// What the tray menu should show. Rebuilt from scratch on every render.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuModel {
    pub toggle_label: &'static str,
    pub status: Option<String>,
    pub sources: Vec<SourceEntry>,
    pub version_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    pub menu_id: String,
    pub label: String,
    pub checked: bool,
}

/// Renders the menu model on the human-facing control surface.
pub trait ControlSurface: Send {
    fn render(&self, menu: &MenuModel) -> Result<(), SurfaceError>;
}

/// Maps a clicked menu item id to the event it triggers.
/// `None` for ids that are handled outside the control loop or unknown.
pub fn event_for_menu_id(id: &str) -> Option<ControlEvent> {
    if id == MENU_TOGGLE_ID {
        Some(ControlEvent::ToggleSharing)
    } else if id == MENU_QUIT_ID {
        Some(ControlEvent::Shutdown)
    } else {
        id.strip_prefix(MENU_SOURCE_PREFIX)
            .map(|key| ControlEvent::SelectSource(key.to_string()))
    }
}

pub struct SharingController {
    config: Config,
    state: SelectionState,
    sync: WindowSynchronizer,
    sources: Box<dyn SourceProvider>,
    control: Box<dyn ControlSurface>,
    hook: InputHook,
    subscription: Option<InputSubscription>,
    status: Option<String>,
}

impl SharingController {
    pub fn new(
        config: Config,
        sync: WindowSynchronizer,
        sources: Box<dyn SourceProvider>,
        control: Box<dyn ControlSurface>,
        hook: InputHook,
    ) -> Self {
        Self {
            config,
            state: SelectionState::new(),
            sync,
            sources,
            control,
            hook,
            subscription: None,
            status: None,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn synchronizer(&self) -> &WindowSynchronizer {
        &self.sync
    }

    pub fn input_hook(&self) -> &InputHook {
        &self.hook
    }

    /// Enumerates displays and renders the initial menu.
    pub fn init(&mut self) {
        self.refresh_sources();
        self.render_menu();
    }

    /// Processes events until `Shutdown` arrives or every sender is gone.
    pub async fn run(mut self, mut events: UnboundedReceiver<ControlEvent>) {
        self.init();
        while let Some(event) = events.recv().await {
            if !self.handle(event).await {
                break;
            }
        }
        if self.state.stop_sharing() {
            self.end_share().await;
        }
        log::info!("[SHARING] Control loop finished");
    }

    /// Applies one event. Returns `false` once the loop should stop.
    pub async fn handle(&mut self, event: ControlEvent) -> bool {
        match event {
            ControlEvent::ToggleSharing => {
                self.refresh_sources();
                self.toggle_sharing().await;
                self.render_menu();
            }
            ControlEvent::SelectSource(key) => {
                self.state.select_source(&key);
                if self.state.is_sharing() {
                    log::info!(
                        "[SHARING] Display {} selected; takes effect on the next share",
                        key
                    );
                }
                self.refresh_sources();
                self.render_menu();
            }
            ControlEvent::Pan(delta) => self.relay_pan(delta),
            ControlEvent::PanLeft => self.relay_pan(PanDelta::horizontal(-self.config.pan_step)),
            ControlEvent::PanRight => self.relay_pan(PanDelta::horizontal(self.config.pan_step)),
            ControlEvent::GeometryChanged(geometry) => {
                if let Err(e) = self.sync.on_geometry_changed(&geometry) {
                    log::warn!("[SYNC] Overlay update failed: {}", e);
                }
            }
            ControlEvent::DisplaysChanged => {
                self.refresh_sources();
                self.render_menu();
            }
            ControlEvent::StreamFailed { session, message } => {
                if self.state.is_sharing() && self.sync.session() == Some(session) {
                    log::error!("[SHARING] Capture failed: {}", message);
                    self.status = Some(format!("Capture failed: {}", message));
                    self.render_menu();
                } else {
                    log::debug!(
                        "[SHARING] Failure of finished session {} ignored: {}",
                        session,
                        message
                    );
                }
            }
            ControlEvent::Shutdown => {
                log::info!("[SHARING] Shutdown requested");
                return false;
            }
        }
        true
    }

    async fn toggle_sharing(&mut self) {
        let source = self.state.current_source().cloned();
        if !self.state.is_sharing() && source.is_none() {
            log::warn!("[SHARING] No display available to share");
            self.status = Some("No display available".to_string());
            return;
        }

        match (self.state.toggle(), source) {
            (SharingPhase::Sharing, Some(source)) => self.begin_share(source),
            // Unreachable: starting without a source returned above.
            (SharingPhase::Sharing, None) => {}
            (SharingPhase::Idle, _) => self.end_share().await,
        }
    }

    fn begin_share(&mut self, source: Source) {
        log::info!("[SHARING] Start sharing {}", source.label);
        self.status = None;
        self.subscription = Some(self.hook.subscribe());
        self.sync.start(source);
    }

    async fn end_share(&mut self) {
        log::info!("[SHARING] Stop sharing");
        self.subscription = None;
        self.sync.stop().await;
        self.status = None;
    }

    fn relay_pan(&self, delta: PanDelta) {
        if !self.state.is_sharing() {
            log::debug!("[SHARING] Pan {} dropped, not sharing", delta.magnitude);
            return;
        }
        if let Err(e) = self.sync.relay_pan(delta) {
            log::warn!("[SYNC] Pan relay failed: {}", e);
        }
    }

    fn refresh_sources(&mut self) {
        match self.sources.list_sources() {
            Ok(sources) => {
                if self.state.active_key().is_none() {
                    self.state.ensure_active_key(self.sources.primary_display_key());
                }
                self.state.enumerate(sources);
            }
            Err(e) => log::warn!("[CAPTURE] Keeping previous display list: {}", e),
        }
    }

    pub fn menu_model(&self) -> MenuModel {
        let current_key = self.state.current_source().map(|s| s.display_key.as_str());
        let sources = self
            .state
            .sources()
            .iter()
            .map(|source| SourceEntry {
                menu_id: format!("{}{}", MENU_SOURCE_PREFIX, source.display_key),
                label: source.label.clone(),
                checked: Some(source.display_key.as_str()) == current_key,
            })
            .collect();

        MenuModel {
            toggle_label: match self.state.phase() {
                SharingPhase::Idle => "Start sharing",
                SharingPhase::Sharing => "Stop sharing",
            },
            status: self.status.clone(),
            sources,
            version_label: format!("WNDW Version {}", env!("CARGO_PKG_VERSION")),
        }
    }

    fn render_menu(&self) {
        if let Err(e) = self.control.render(&self.menu_model()) {
            log::warn!("[TRAY] Menu render failed: {}", e);
        }
    }
}
