//! CPU and memory state.
use crate::{
    constants::*, display::Display, font::FONTSET, keypad::Keypad, memory::Memory,
    opcode::Opcode, registers::Registers, stack::Stack,
};

/// Core state for a chip8 interpreter.
///
/// All device state lives here, owned by a single virtual machine.
#[derive(Default)]
pub struct Chip8Cpu {
    // ------------------------------------------------------------------------
    // Registers
    pub(crate) regs: Registers,
    /// Indicates that the machine is waiting for a keypress.
    pub(crate) key_wait: bool,
    /// Keyboard input state.
    pub(crate) keypad: Keypad,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory storage space.
    pub(crate) ram: Memory,
    /// Stack of return pointers used for jumping when a routine call finishes.
    pub(crate) stack: Stack,
    /// Screen buffer that is drawn too.
    pub(crate) display: Display,
}

impl Chip8Cpu {
    pub fn new() -> Self {
        let mut cpu = Self::default();
        cpu.install_font(&FONTSET);
        cpu
    }

    /// Erase the contents of the memory buffers `ram`, `stack` and `display`.
    pub(crate) fn clear_memory(&mut self) {
        self.ram.clear();
        self.stack.clear();
        self.display.clear();
    }

    /// Put registers, stack, display and keypad back to their power-on state.
    /// Memory is left untouched.
    pub(crate) fn reset(&mut self) {
        self.regs = Registers::new();
        self.stack.clear();
        self.display.clear();
        self.keypad.clear();
        self.key_wait = false;
    }

    pub(crate) fn install_font(&mut self, fontset: &[u8; FONTSET_DATA_LENGTH]) {
        for (i, byte) in fontset.iter().enumerate() {
            self.ram.write(FONTSET_START + i, *byte);
        }
    }

    /// Extract the instruction at the current program counter.
    #[inline(always)]
    pub fn instr(&self) -> Opcode {
        Opcode(self.ram.read_word(self.regs.pc as usize))
    }

    pub fn pc(&self) -> Address {
        self.regs.pc
    }

    pub fn index(&self) -> Address {
        self.regs.index
    }

    pub fn register(&self, x: u8) -> u8 {
        self.regs.get(x)
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.regs.v
    }

    pub fn delay_timer(&self) -> u8 {
        self.regs.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.regs.sound_timer
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn memory(&self) -> &Memory {
        &self.ram
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Whether execution is parked on a `Fx0A` key wait.
    pub fn is_key_wait(&self) -> bool {
        self.key_wait
    }

    /// Sound should play for as long as the sound timer is non-zero.
    #[inline]
    pub fn is_sound_active(&self) -> bool {
        self.regs.sound_timer > 0
    }
}
