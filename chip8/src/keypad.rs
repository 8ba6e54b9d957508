//! Hexadecimal keypad input state.
use crate::constants::*;

/// State of the 16 keys, one bit per key. Pressed is a 1 bit, released is a 0 bit.
#[derive(Debug, Default, Clone, Copy)]
pub struct Keypad {
    state: u16,
}

impl Keypad {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set(&mut self, key_id: u8, pressed: bool) {
        if key_id < KEY_COUNT {
            if pressed {
                self.state |= 1 << key_id;
            } else {
                self.state &= !(1 << key_id);
            }
        }
    }

    /// Key identifiers outside 0x0-0xF are never down.
    pub fn is_down(&self, key_id: u8) -> bool {
        if key_id < KEY_COUNT {
            self.state & (1 << key_id) > 0
        } else {
            false
        }
    }

    /// Check whether any key is pressed down.
    #[inline(always)]
    pub fn any_key(&self) -> bool {
        self.state > 0
    }

    /// Retrieve the lowest numbered key that is pressed down.
    #[inline]
    pub fn any_pressed(&self) -> Option<u8> {
        if self.any_key() {
            Some(self.state.trailing_zeros() as u8)
        } else {
            None
        }
    }

    /// Iterate the keys currently held down, in ascending order.
    pub fn pressed(&self) -> impl Iterator<Item = KeyCode> + '_ {
        (0..KEY_COUNT)
            .filter(|k| self.is_down(*k))
            .filter_map(|k| KeyCode::try_from(k).ok())
    }

    /// Clear the keyboard input state, setting all keys to up.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.state = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyCode {
    Key0 = 0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF = 0xF,
}

impl KeyCode {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let key_id = self.as_u8();
        write!(f, "k{key_id:x}")
    }
}

impl From<KeyCode> for u8 {
    fn from(keycode: KeyCode) -> Self {
        keycode.as_u8()
    }
}

impl TryFrom<u8> for KeyCode {
    type Error = InvalidKeyCode;

    fn try_from(key_id: u8) -> Result<Self, Self::Error> {
        match key_id {
            0 => Ok(Self::Key0),
            1 => Ok(Self::Key1),
            2 => Ok(Self::Key2),
            3 => Ok(Self::Key3),
            4 => Ok(Self::Key4),
            5 => Ok(Self::Key5),
            6 => Ok(Self::Key6),
            7 => Ok(Self::Key7),
            8 => Ok(Self::Key8),
            9 => Ok(Self::Key9),
            10 => Ok(Self::KeyA),
            11 => Ok(Self::KeyB),
            12 => Ok(Self::KeyC),
            13 => Ok(Self::KeyD),
            14 => Ok(Self::KeyE),
            15 => Ok(Self::KeyF),
            _ => Err(InvalidKeyCode),
        }
    }
}

#[derive(Debug)]
pub struct InvalidKeyCode;

impl std::error::Error for InvalidKeyCode {}

impl std::fmt::Display for InvalidKeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "keycode must be in range 0 <= keycode < 16")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut keypad = Keypad::default();

        keypad.set(0, true);
        assert_eq!(keypad.state, 0b00000000_00000001);
        assert!(keypad.is_down(0));
        assert!(!keypad.is_down(1));
        assert!(!keypad.is_down(7));

        keypad.set(7, true);
        assert_eq!(keypad.state, 0b00000000_10000001);
        assert!(keypad.is_down(0));
        assert!(!keypad.is_down(1));
        assert!(keypad.is_down(7));

        keypad.set(0, false);
        assert_eq!(keypad.state, 0b00000000_10000000);
        assert!(!keypad.is_down(0));
        assert!(!keypad.is_down(1));
        assert!(keypad.is_down(7));

        keypad.set(15, true);
        assert_eq!(keypad.state, 0b10000000_10000000);
        assert!(keypad.is_down(15));

        // out of range keys are ignored
        keypad.set(16, true);
        assert_eq!(keypad.state, 0b10000000_10000000);
        assert!(!keypad.is_down(16));
    }

    #[test]
    fn test_any_pressed() {
        let mut keypad = Keypad::default();
        assert_eq!(keypad.any_pressed(), None);

        keypad.set(0xC, true);
        keypad.set(0x5, true);
        assert_eq!(keypad.any_pressed(), Some(0x5));
        assert_eq!(
            keypad.pressed().collect::<Vec<_>>(),
            vec![KeyCode::Key5, KeyCode::KeyC]
        );

        keypad.clear();
        assert_eq!(keypad.any_pressed(), None);
    }

    #[test]
    fn test_keycode_conversion() {
        assert_eq!(KeyCode::try_from(0xA).unwrap(), KeyCode::KeyA);
        assert_eq!(u8::from(KeyCode::KeyF), 0xF);
        assert!(KeyCode::try_from(0x10).is_err());
        assert_eq!(KeyCode::Key9.to_string(), "k9");
    }
}
