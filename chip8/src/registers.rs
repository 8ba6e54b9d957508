//! CPU registers and timers.
use crate::constants::*;

pub struct Registers {
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    pub(crate) v: [u8; REGISTER_COUNT],
    /// Pointer register used for temporarily storing an address. Since addresses are 12 bits, only the
    /// lowest (rightmost) bits are used.
    pub(crate) index: Address,
    /// Program counter pointing to the next instruction to fetch.
    pub(crate) pc: Address,
    /// (DT) Delay timer that counts down to 0.
    pub(crate) delay_timer: u8,
    /// (ST) Sound timer that counts down to 0. When it has a non-zero value, a beep is played.
    pub(crate) sound_timer: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            v: [0; REGISTER_COUNT],
            index: 0,
            pc: MEM_START as Address,
            delay_timer: 0,
            sound_timer: 0,
        }
    }
}

impl Registers {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline(always)]
    pub fn get(&self, x: u8) -> u8 {
        self.v[x as usize & 0xF]
    }

    #[inline(always)]
    pub fn set(&mut self, x: u8, value: u8) {
        self.v[x as usize & 0xF] = value;
    }

    #[inline(always)]
    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG_REGISTER] = flag as u8;
    }

    /// Set the address register, keeping it within 12 bits.
    #[inline(always)]
    pub fn set_index(&mut self, address: usize) {
        self.index = (address & ADDRESS_MASK) as Address;
    }

    /// Set the program counter, keeping it within 12 bits.
    #[inline(always)]
    pub fn jump(&mut self, address: usize) {
        self.pc = (address & ADDRESS_MASK) as Address;
    }

    /// Move past the next instruction.
    #[inline(always)]
    pub fn skip(&mut self) {
        self.jump(self.pc as usize + 2);
    }

    /// Count down both timers by one 60 Hz period, stopping at zero.
    #[inline]
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_initial_state() {
        let regs = Registers::new();
        assert_eq!(regs.pc, 0x200);
        assert_eq!(regs.index, 0);
        assert!(regs.v.iter().all(|v| *v == 0));
    }

    #[test]
    fn test_timer_decay() {
        let mut regs = Registers::new();
        regs.delay_timer = 5;
        regs.sound_timer = 2;

        for _ in 0..5 {
            regs.tick_timers();
        }
        assert_eq!(regs.delay_timer, 0);
        assert_eq!(regs.sound_timer, 0);

        regs.tick_timers();
        assert_eq!(regs.delay_timer, 0);
        assert_eq!(regs.sound_timer, 0);
    }

    #[test]
    fn test_address_registers_wrap() {
        let mut regs = Registers::new();
        regs.set_index(0xFFF + 3);
        assert_eq!(regs.index, 0x002);

        regs.jump(0xFFE);
        regs.skip();
        assert_eq!(regs.pc, 0x000);
    }
}
