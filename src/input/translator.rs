use super::{InputEvent, ModifierKey, PanDelta};

/// Turns wheel rotation into horizontal pans while Meta and Alt are both held.
#[derive(Debug, Clone)]
pub struct PanTranslator {
    meta_held: bool,
    alt_held: bool,
    wheel_scale: f64,
}

impl PanTranslator {
    pub fn new(wheel_scale: f64) -> Self {
        Self {
            meta_held: false,
            alt_held: false,
            wheel_scale,
        }
    }

    /// Forgets every held modifier.
    pub fn reset(&mut self) {
        self.meta_held = false;
        self.alt_held = false;
    }

    pub fn gate_open(&self) -> bool {
        self.meta_held && self.alt_held
    }

    /// Updates the modifier snapshot and returns the pan a wheel event
    /// produces, if any.
    pub fn handle(&mut self, event: InputEvent) -> Option<PanDelta> {
        match event {
            InputEvent::KeyDown(Some(key)) => {
                self.set_held(key, true);
                None
            }
            InputEvent::KeyUp(Some(key)) => {
                self.set_held(key, false);
                None
            }
            InputEvent::KeyDown(None) | InputEvent::KeyUp(None) => None,
            InputEvent::Wheel { rotation } => {
                if self.gate_open() && rotation != 0.0 {
                    Some(PanDelta::horizontal(rotation * self.wheel_scale))
                } else {
                    None
                }
            }
        }
    }

    fn set_held(&mut self, key: ModifierKey, held: bool) {
        match key {
            ModifierKey::Meta => self.meta_held = held,
            ModifierKey::Alt => self.alt_held = held,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PanAxis;

    #[test]
    fn wheel_without_modifiers_is_dropped() {
        let mut t = PanTranslator::new(10.0);
        assert_eq!(t.handle(InputEvent::Wheel { rotation: 5.0 }), None);
    }

    #[test]
    fn single_modifier_does_not_open_gate() {
        let mut t = PanTranslator::new(10.0);
        t.handle(InputEvent::KeyDown(Some(ModifierKey::Meta)));
        assert_eq!(t.handle(InputEvent::Wheel { rotation: 5.0 }), None);

        let mut t = PanTranslator::new(10.0);
        t.handle(InputEvent::KeyDown(Some(ModifierKey::Alt)));
        assert_eq!(t.handle(InputEvent::Wheel { rotation: 5.0 }), None);
    }

    #[test]
    fn both_modifiers_scale_rotation() {
        let mut t = PanTranslator::new(10.0);
        t.handle(InputEvent::KeyDown(Some(ModifierKey::Meta)));
        t.handle(InputEvent::KeyDown(Some(ModifierKey::Alt)));
        let delta = t.handle(InputEvent::Wheel { rotation: 5.0 }).unwrap();
        assert_eq!(delta.axis, PanAxis::Horizontal);
        assert_eq!(delta.magnitude, 50.0);

        let delta = t.handle(InputEvent::Wheel { rotation: -2.0 }).unwrap();
        assert_eq!(delta.magnitude, -20.0);
    }

    #[test]
    fn releasing_a_modifier_closes_gate() {
        let mut t = PanTranslator::new(10.0);
        t.handle(InputEvent::KeyDown(Some(ModifierKey::Meta)));
        t.handle(InputEvent::KeyDown(Some(ModifierKey::Alt)));
        t.handle(InputEvent::KeyUp(Some(ModifierKey::Alt)));
        assert_eq!(t.handle(InputEvent::Wheel { rotation: 1.0 }), None);
    }

    #[test]
    fn unrelated_keys_leave_snapshot_alone() {
        let mut t = PanTranslator::new(10.0);
        t.handle(InputEvent::KeyDown(Some(ModifierKey::Meta)));
        t.handle(InputEvent::KeyDown(Some(ModifierKey::Alt)));
        t.handle(InputEvent::KeyDown(None));
        t.handle(InputEvent::KeyUp(None));
        assert!(t.gate_open());
    }

    #[test]
    fn reset_clears_held_modifiers() {
        let mut t = PanTranslator::new(10.0);
        t.handle(InputEvent::KeyDown(Some(ModifierKey::Meta)));
        t.handle(InputEvent::KeyDown(Some(ModifierKey::Alt)));
        t.reset();
        assert!(!t.gate_open());
    }
}
