//! Sharing selection state: which display is shared and whether sharing is on.
//!
//! A single owned value with explicit transitions. Transitions that do not
//! apply to the current phase are no-ops and report `false`; the caller
//! performs the side effects only when a transition actually happened.

use serde::{Deserialize, Serialize};

/// A capturable display surface as enumerated by the capture backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    /// Key used to correlate the source with a physical display.
    pub display_key: String,
    pub label: String,
    /// Top-left of the display in desktop coordinates.
    pub origin: (i32, i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SharingPhase {
    #[default]
    Idle,
    Sharing,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    sources: Vec<Source>,
    active_key: Option<String>,
    phase: SharingPhase,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SharingPhase {
        self.phase
    }

    pub fn is_sharing(&self) -> bool {
        self.phase == SharingPhase::Sharing
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active_key.as_deref()
    }

    /// Replaces the source list and re-resolves the active key.
    ///
    /// A key that no longer matches any source falls back to the first
    /// entry. An empty list keeps the stored key so a display that briefly
    /// disappears is picked again once it returns.
    pub fn enumerate(&mut self, sources: Vec<Source>) {
        self.sources = sources;

        let still_valid = self
            .active_key
            .as_deref()
            .is_some_and(|key| self.sources.iter().any(|s| s.display_key == key));

        if !still_valid {
            if let Some(first) = self.sources.first() {
                if self.active_key.is_some() {
                    log::debug!(
                        "[SHARING] Active display {:?} gone, falling back to {}",
                        self.active_key,
                        first.display_key
                    );
                }
                self.active_key = Some(first.display_key.clone());
            }
        }
    }

    /// Seeds the active key with the primary display unless one is already set.
    pub fn ensure_active_key(&mut self, primary_key: Option<String>) {
        if self.active_key.is_none() {
            self.active_key = primary_key;
        }
    }

    /// Marks `key` as the display to share.
    ///
    /// Takes effect on the next start; a share already in progress keeps
    /// streaming the display it started with.
    pub fn select_source(&mut self, key: &str) {
        self.active_key = Some(key.to_string());
    }

    /// The source that sharing would stream right now.
    pub fn current_source(&self) -> Option<&Source> {
        self.active_key
            .as_deref()
            .and_then(|key| self.sources.iter().find(|s| s.display_key == key))
            .or_else(|| self.sources.first())
    }

    pub fn start_sharing(&mut self) -> bool {
        match self.phase {
            SharingPhase::Idle => {
                self.phase = SharingPhase::Sharing;
                true
            }
            SharingPhase::Sharing => false,
        }
    }

    pub fn stop_sharing(&mut self) -> bool {
        match self.phase {
            SharingPhase::Sharing => {
                self.phase = SharingPhase::Idle;
                true
            }
            SharingPhase::Idle => false,
        }
    }

    /// Starts or stops sharing depending on the current phase.
    /// Returns the phase after the toggle.
    pub fn toggle(&mut self) -> SharingPhase {
        if !self.start_sharing() {
            self.stop_sharing();
        }
        self.phase
    }
}
