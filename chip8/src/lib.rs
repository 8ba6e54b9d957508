mod clock;
pub mod constants;
mod cpu;
mod display;
mod error;
pub mod font;
mod keypad;
mod memory;
mod opcode;
mod registers;
mod stack;
mod vm;

pub use self::{
    clock::Clock,
    display::{Chip8DisplayBuffer, Display},
    error::{Chip8Error, Chip8Result},
    keypad::{InvalidKeyCode, KeyCode, Keypad},
    memory::Memory,
    opcode::{Instr, Opcode},
    registers::Registers,
    stack::{Stack, StackError},
    vm::Hz,
};

/// Crate version, reported by frontends.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        cpu::Chip8Cpu,
        display::Display,
        error::{Chip8Error, Chip8Result},
        keypad::KeyCode,
        vm::{Chip8Conf, Chip8Vm, Flow, Hz},
    };
}
