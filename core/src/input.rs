use crate::constants::KEY_COUNT;

/// One of the 16 keys of the hexadecimal keypad
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u8);

impl Key {
    /// Returns `None` for anything outside 0x0..=0xF
    pub fn new(index: u8) -> Option<Key> {
        if (index as usize) < KEY_COUNT {
            Some(Key(index))
        } else {
            None
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Pressed,
    Released,
}

/// A platform independent key event; hosts translate their own key codes into these
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub transition: Transition,
}

impl KeyEvent {
    pub fn pressed(key: Key) -> Self {
        KeyEvent {
            key,
            transition: Transition::Pressed,
        }
    }

    pub fn released(key: Key) -> Self {
        KeyEvent {
            key,
            transition: Transition::Released,
        }
    }
}

/// # Keypad
/// The held state of every key plus a latch remembering the most recent key
/// pressed during the current cycle. The latch lives for exactly one cycle.
#[derive(Clone, Debug, Default)]
pub struct Keypad {
    held: [bool; KEY_COUNT],
    latched: Option<Key>,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates held state; presses also set the latch
    pub fn apply(&mut self, event: KeyEvent) {
        match event.transition {
            Transition::Pressed => {
                self.set_key(event.key, true);
                self.latch(event.key);
            }
            Transition::Released => self.set_key(event.key, false),
        }
    }

    pub fn set_key(&mut self, key: Key, held: bool) {
        self.held[key.index() as usize] = held;
    }

    pub fn latch(&mut self, key: Key) {
        self.latched = Some(key);
    }

    /// Whether the key at `index` is held.
    /// Indices beyond the keypad only use their low nibble.
    pub fn is_held(&self, index: u8) -> bool {
        self.held[(index & 0xF) as usize]
    }

    pub fn latched(&self) -> Option<Key> {
        self.latched
    }

    /// Drops the latch whether or not it was consumed
    pub fn end_cycle(&mut self) {
        self.latched = None;
    }
}
