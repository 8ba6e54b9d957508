//! Result and errors.
use std::fmt::{self, Display, Formatter};

use crate::constants::Address;

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug)]
pub enum Chip8Error {
    /// Fetched instruction does not decode to any known operation.
    UnknownOpcode { opcode: u16, pc: Address },
    /// Subroutine call with the call stack already full.
    StackOverflow { pc: Address },
    /// Subroutine return with an empty call stack.
    StackUnderflow { pc: Address },
    /// Attempt to load a bytecode program that can't fit in memory.
    RomTooLarge { size: usize, max: usize },
    /// Address computation escaped the 12-bit address space.
    AddressOutOfRange(usize),
    /// Fontset data was rejected.
    Font(String),
}

impl Chip8Error {
    /// Address of the instruction that faulted, if this is a runtime error.
    pub fn pc(&self) -> Option<Address> {
        match self {
            Self::UnknownOpcode { pc, .. }
            | Self::StackOverflow { pc }
            | Self::StackUnderflow { pc } => Some(*pc),
            _ => None,
        }
    }
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode { opcode, pc } => {
                write!(f, "unknown opcode {opcode:04X} at {pc:04X}")
            }
            Self::StackOverflow { pc } => write!(f, "call stack overflow at {pc:04X}"),
            Self::StackUnderflow { pc } => write!(f, "call stack underflow at {pc:04X}"),
            Self::RomTooLarge { size, max } => write!(
                f,
                "program too large for VM memory: {size} bytes, limit is {max}"
            ),
            Self::AddressOutOfRange(addr) => write!(f, "address {addr:#X} out of range"),
            Self::Font(msg) => write!(f, "font error: {msg}"),
        }
    }
}

impl std::error::Error for Chip8Error {}
