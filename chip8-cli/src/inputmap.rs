//! Host keyboard to Chip8 keypad mapping.
use chip8::KeyCode;

/// Number of frames a key stays down after the terminal reports a press.
///
/// Terminals report key presses and auto-repeat, but never releases.
pub const HOLD_FRAMES: u8 = 6;

/// Left-hand side of a QWERTY keyboard, laid out like the COSMAC VIP keypad.
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// q w e r      4 5 6 D
/// a s d f  ->  7 8 9 E
/// z x c v      A 0 B F
/// ```
#[rustfmt::skip]
const CONVENTIONAL_KEYMAP: [(char, KeyCode); 16] = [
    ('1', KeyCode::Key1), ('2', KeyCode::Key2), ('3', KeyCode::Key3), ('4', KeyCode::KeyC),
    ('q', KeyCode::Key4), ('w', KeyCode::Key5), ('e', KeyCode::Key6), ('r', KeyCode::KeyD),
    ('a', KeyCode::Key7), ('s', KeyCode::Key8), ('d', KeyCode::Key9), ('f', KeyCode::KeyE),
    ('z', KeyCode::KeyA), ('x', KeyCode::Key0), ('c', KeyCode::KeyB), ('v', KeyCode::KeyF),
];

/// Input mapper
///
/// Maps host characters to Chip8 keycodes, and tracks for how many more
/// frames each keypad key is considered held down.
#[derive(Debug)]
pub struct InputMap {
    keys: Box<[(char, KeyCode)]>,
    held: [u8; 16],
}

impl Default for InputMap {
    fn default() -> Self {
        Self {
            keys: Box::new(CONVENTIONAL_KEYMAP),
            held: [0; 16],
        }
    }
}

impl InputMap {
    pub fn new() -> Self {
        Default::default()
    }

    /// Given a host character, map it to a Chip8 key.
    pub fn map_key(&self, c: char) -> Option<KeyCode> {
        let c = c.to_ascii_lowercase();
        self.keys
            .iter()
            .find(|(key, _)| *key == c)
            .map(|(_, keycode)| *keycode)
    }

    /// Record a host key press. Returns the keypad key it maps to.
    pub fn press(&mut self, c: char) -> Option<KeyCode> {
        let keycode = self.map_key(c)?;
        self.held[keycode.as_u8() as usize] = HOLD_FRAMES;
        Some(keycode)
    }

    /// Count down held keys at the end of a frame.
    pub fn end_frame(&mut self) {
        for frames in self.held.iter_mut() {
            *frames = frames.saturating_sub(1);
        }
    }

    /// Current state of all 16 keypad keys, suitable to merge into the VM.
    pub fn iter_chip8(&self) -> impl Iterator<Item = (KeyCode, bool)> + '_ {
        self.held
            .iter()
            .enumerate()
            .filter_map(|(key_id, frames)| {
                KeyCode::try_from(key_id as u8)
                    .ok()
                    .map(|keycode| (keycode, *frames > 0))
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_map_key() {
        let input_map = InputMap::new();
        assert_eq!(input_map.map_key('1'), Some(KeyCode::Key1));
        assert_eq!(input_map.map_key('x'), Some(KeyCode::Key0));
        assert_eq!(input_map.map_key('V'), Some(KeyCode::KeyF));
        assert_eq!(input_map.map_key('p'), None);
    }

    #[test]
    fn test_hold_and_release() {
        let mut input_map = InputMap::new();
        assert_eq!(input_map.press('w'), Some(KeyCode::Key5));

        for _ in 0..HOLD_FRAMES {
            assert!(input_map
                .iter_chip8()
                .any(|(key, down)| key == KeyCode::Key5 && down));
            input_map.end_frame();
        }

        assert!(input_map.iter_chip8().all(|(_, down)| !down));
        assert_eq!(input_map.iter_chip8().count(), 16);
    }
}
