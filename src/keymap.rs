use std::collections::HashMap;

use crate::{error::MotorError, keyboard::Key, model::MotorId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Nudge { id: MotorId, delta: i32 },
}

/// Jog pairs of the reference five-servo chain: (key, actuator, delta).
const REFERENCE_BINDINGS: [(char, u8, i32); 10] = [
    ('u', 11, 50),
    ('j', 11, -50),
    ('i', 12, 50),
    ('k', 12, -50),
    ('o', 13, 50),
    ('l', 13, -50),
    ('p', 14, 50),
    (';', 14, -50),
    ('[', 15, 100),
    ('\'', 15, -100),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap {
    bindings: HashMap<Key, Action>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Esc quits, the rest jog servos 11 through 15.
    pub fn reference() -> Self {
        let mut bindings: HashMap<Key, Action> = REFERENCE_BINDINGS
            .iter()
            .map(|&(c, id, delta)| (Key::Char(c), Action::Nudge { id: MotorId(id), delta }))
            .collect();
        bindings.insert(Key::Esc, Action::Quit);
        Self { bindings }
    }

    pub fn bind(&mut self, key: Key, action: Action) -> Result<(), MotorError> {
        if key == Key::Esc && action != Action::Quit {
            return Err(MotorError::ReservedEsc(action));
        }
        if self.bindings.contains_key(&key) {
            return Err(MotorError::DuplicateBinding(key));
        }
        self.bindings.insert(key, action);
        Ok(())
    }

    /// Binds `up` to `+step` and `down` to `-step` on one actuator.
    pub fn bind_jog_pair(&mut self, up: char, down: char, id: MotorId, step: i32) -> Result<(), MotorError> {
        self.bind(Key::Char(up), Action::Nudge { id, delta: step })?;
        self.bind(Key::Char(down), Action::Nudge { id, delta: -step })
    }

    pub fn lookup(&self, key: Key) -> Option<Action> {
        self.bindings.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, Action)> + '_ {
        self.bindings.iter().map(|(k, a)| (*k, *a))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_table_has_unique_keys() {
        let map = KeyMap::reference();
        assert_eq!(map.len(), REFERENCE_BINDINGS.len() + 1);
        assert_eq!(map.lookup(Key::Esc), Some(Action::Quit));
    }

    #[test]
    fn reference_pairs_are_symmetric() {
        let map = KeyMap::reference();
        assert_eq!(map.lookup(Key::Char('u')), Some(Action::Nudge { id: MotorId(11), delta: 50 }));
        assert_eq!(map.lookup(Key::Char(';')), Some(Action::Nudge { id: MotorId(14), delta: -50 }));
        assert_eq!(map.lookup(Key::Char('[')), Some(Action::Nudge { id: MotorId(15), delta: 100 }));
        assert_eq!(map.lookup(Key::Char('\'')), Some(Action::Nudge { id: MotorId(15), delta: -100 }));
        assert_eq!(map.lookup(Key::Char('x')), None);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut map = KeyMap::new();
        map.bind_jog_pair('w', 's', MotorId(1), 10).unwrap();

        let err = map.bind(Key::Char('s'), Action::Quit).unwrap_err();
        assert!(matches!(err, MotorError::DuplicateBinding(Key::Char('s'))));
        assert_eq!(map.lookup(Key::Char('s')), Some(Action::Nudge { id: MotorId(1), delta: -10 }));
    }

    #[test]
    fn esc_only_binds_to_quit() {
        let mut map = KeyMap::new();
        let nudge = Action::Nudge { id: MotorId(1), delta: 10 };

        assert!(matches!(map.bind(Key::Esc, nudge), Err(MotorError::ReservedEsc(a)) if a == nudge));
        assert_eq!(map.lookup(Key::Esc), None);
        assert!(map.bind(Key::Esc, Action::Quit).is_ok());
    }
}
