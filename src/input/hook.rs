//! Process-wide input hook with attach/detach subscriptions.
//!
//! The OS listener (rdev) cannot be stopped once running, so it is installed
//! once per process and every event passes through [`InputHook::dispatch`].
//! Events only reach the pan sink while an [`InputSubscription`] is alive;
//! dropping the subscription detaches, which also covers early returns and
//! unwinding.

use super::{InputEvent, ModifierKey, PanDelta, PanTranslator};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type PanSink = Box<dyn Fn(PanDelta) + Send + Sync>;

struct Shared {
    /// Generation of the live subscription; 0 when detached.
    attached: AtomicU64,
    next_generation: AtomicU64,
    translator: Mutex<PanTranslator>,
    sink: PanSink,
}

pub struct InputHook {
    shared: Arc<Shared>,
    listener_installed: AtomicBool,
}

impl InputHook {
    pub fn new(wheel_scale: f64, sink: impl Fn(PanDelta) + Send + Sync + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                attached: AtomicU64::new(0),
                next_generation: AtomicU64::new(1),
                translator: Mutex::new(PanTranslator::new(wheel_scale)),
                sink: Box::new(sink),
            }),
            listener_installed: AtomicBool::new(false),
        }
    }

    /// Starts delivering pans to the sink until the returned guard is dropped.
    ///
    /// The modifier snapshot starts empty so keys held during a previous
    /// session cannot open the gate.
    pub fn subscribe(&self) -> InputSubscription {
        if let Ok(mut translator) = self.shared.translator.lock() {
            translator.reset();
        }
        let generation = self.shared.next_generation.fetch_add(1, Ordering::SeqCst);
        self.shared.attached.store(generation, Ordering::SeqCst);
        log::info!("[INPUT] Wheel panning attached");

        InputSubscription {
            shared: Arc::clone(&self.shared),
            generation,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.shared.attached.load(Ordering::SeqCst) != 0
    }

    /// Feeds one raw event through the translator.
    ///
    /// Runs on the OS hook's dispatch path: a snapshot update and at most one
    /// message, nothing else.
    pub fn dispatch(&self, event: InputEvent) {
        dispatch(&self.shared, event);
    }

    /// Spawns the OS listener thread. Later calls are no-ops.
    pub fn install_os_listener(&self) -> Result<(), InputError> {
        if self.listener_installed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let shared = Arc::clone(&self.shared);
        let spawned = std::thread::Builder::new()
            .name("wndw-input-hook".into())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    if let Some(input) = translate_os_event(&event.event_type) {
                        dispatch(&shared, input);
                    }
                });
                if let Err(e) = result {
                    log::error!("[INPUT] Global input listener stopped: {:?}", e);
                }
            });

        if let Err(e) = spawned {
            self.listener_installed.store(false, Ordering::SeqCst);
            return Err(InputError::Spawn(e));
        }

        log::info!("[INPUT] Global input listener installed");
        Ok(())
    }
}

fn dispatch(shared: &Shared, event: InputEvent) {
    if shared.attached.load(Ordering::SeqCst) == 0 {
        return;
    }
    let delta = match shared.translator.lock() {
        Ok(mut translator) => translator.handle(event),
        Err(_) => return,
    };
    if let Some(delta) = delta {
        log::debug!("[INPUT] Wheel pan {}", delta.magnitude);
        (shared.sink)(delta);
    }
}

/// Reduces an rdev event to the subset panning reacts to.
fn translate_os_event(event: &rdev::EventType) -> Option<InputEvent> {
    match event {
        rdev::EventType::KeyPress(key) => Some(InputEvent::KeyDown(modifier_for(key))),
        rdev::EventType::KeyRelease(key) => Some(InputEvent::KeyUp(modifier_for(key))),
        // rdev reports scrolling up as positive; rotation is positive downwards.
        rdev::EventType::Wheel { delta_y, .. } => Some(InputEvent::Wheel {
            rotation: -(*delta_y as f64),
        }),
        _ => None,
    }
}

fn modifier_for(key: &rdev::Key) -> Option<ModifierKey> {
    match key {
        rdev::Key::MetaLeft | rdev::Key::MetaRight => Some(ModifierKey::Meta),
        rdev::Key::Alt | rdev::Key::AltGr => Some(ModifierKey::Alt),
        _ => None,
    }
}

/// Live attachment of the pan sink to the global input stream.
pub struct InputSubscription {
    shared: Arc<Shared>,
    generation: u64,
}

impl Drop for InputSubscription {
    fn drop(&mut self) {
        let detached = self
            .shared
            .attached
            .compare_exchange(self.generation, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if detached {
            log::info!("[INPUT] Wheel panning detached");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to spawn input hook thread: {0}")]
    Spawn(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn hook() -> (InputHook, mpsc::Receiver<PanDelta>) {
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let hook = InputHook::new(10.0, move |delta| {
            let _ = tx.lock().unwrap().send(delta);
        });
        (hook, rx)
    }

    fn hold_both(hook: &InputHook) {
        hook.dispatch(InputEvent::KeyDown(Some(ModifierKey::Meta)));
        hook.dispatch(InputEvent::KeyDown(Some(ModifierKey::Alt)));
    }

    #[test]
    fn detached_hook_emits_nothing() {
        let (hook, rx) = hook();
        hold_both(&hook);
        hook.dispatch(InputEvent::Wheel { rotation: 3.0 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn attached_hook_emits_until_dropped() {
        let (hook, rx) = hook();
        let sub = hook.subscribe();
        hold_both(&hook);
        hook.dispatch(InputEvent::Wheel { rotation: 3.0 });
        assert_eq!(rx.try_recv().unwrap().magnitude, 30.0);

        drop(sub);
        assert!(!hook.is_attached());
        hook.dispatch(InputEvent::Wheel { rotation: 3.0 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn resubscribe_starts_with_empty_snapshot() {
        let (hook, rx) = hook();
        let sub = hook.subscribe();
        hold_both(&hook);
        drop(sub);

        let _sub = hook.subscribe();
        hook.dispatch(InputEvent::Wheel { rotation: 1.0 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stale_guard_does_not_detach_newer_subscription() {
        let (hook, _rx) = hook();
        let old = hook.subscribe();
        let _new = hook.subscribe();
        drop(old);
        assert!(hook.is_attached());
    }

    #[test]
    fn os_modifiers_map_to_gating_keys() {
        assert_eq!(modifier_for(&rdev::Key::MetaRight), Some(ModifierKey::Meta));
        assert_eq!(modifier_for(&rdev::Key::AltGr), Some(ModifierKey::Alt));
        assert_eq!(modifier_for(&rdev::Key::ShiftLeft), None);
    }

    #[test]
    fn wheel_down_pans_right() {
        let (hook, rx) = hook();
        let _sub = hook.subscribe();
        hold_both(&hook);

        let down = translate_os_event(&rdev::EventType::Wheel { delta_x: 0, delta_y: -1 });
        assert_eq!(down, Some(InputEvent::Wheel { rotation: 1.0 }));
        hook.dispatch(down.unwrap());
        assert_eq!(rx.try_recv().unwrap().magnitude, 10.0);

        let up = translate_os_event(&rdev::EventType::Wheel { delta_x: 0, delta_y: 2 });
        hook.dispatch(up.unwrap());
        assert_eq!(rx.try_recv().unwrap().magnitude, -20.0);
    }
}
