//! Display topology polling.
//!
//! Tauri exposes no display-added/removed event, so the display list is
//! polled and compared against the previous poll.

use super::SourceProvider;
use std::time::Duration;

/// The set of display keys seen at the last poll.
#[derive(Debug, Default)]
pub struct TopologySnapshot {
    keys: Option<Vec<String>>,
}

impl TopologySnapshot {
    /// Records `keys` and reports whether they differ from the previous poll.
    /// The first poll only establishes the baseline.
    pub fn update(&mut self, mut keys: Vec<String>) -> bool {
        keys.sort();
        let changed = self.keys.as_ref().is_some_and(|previous| *previous != keys);
        self.keys = Some(keys);
        changed
    }
}

/// Polls `provider` every `interval` and calls `on_change` when a display
/// was added or removed. Runs until `on_change` returns `false`.
pub async fn watch_displays<P, F>(provider: P, interval: Duration, on_change: F)
where
    P: SourceProvider,
    F: Fn() -> bool,
{
    let mut snapshot = TopologySnapshot::default();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let keys = match provider.list_sources() {
            Ok(sources) => sources.into_iter().map(|s| s.display_key).collect(),
            Err(e) => {
                log::warn!("[CAPTURE] Display poll failed: {}", e);
                continue;
            }
        };

        if snapshot.update(keys) {
            log::info!("[CAPTURE] Display topology changed");
            if !on_change() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn first_poll_is_baseline() {
        let mut snapshot = TopologySnapshot::default();
        assert!(!snapshot.update(keys(&["1", "2"])));
    }

    #[test]
    fn reordering_is_not_a_change() {
        let mut snapshot = TopologySnapshot::default();
        snapshot.update(keys(&["1", "2"]));
        assert!(!snapshot.update(keys(&["2", "1"])));
    }

    #[test]
    fn added_and_removed_displays_are_changes() {
        let mut snapshot = TopologySnapshot::default();
        snapshot.update(keys(&["1"]));
        assert!(snapshot.update(keys(&["1", "2"])));
        assert!(snapshot.update(keys(&["2"])));
        assert!(!snapshot.update(keys(&["2"])));
    }
}
