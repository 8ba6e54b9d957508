//! Main memory.
use std::ops::Index;

use crate::{
    constants::*,
    error::{Chip8Error, Chip8Result},
};

/// Flat 4 KiB byte store holding the font, the program image and working data.
///
/// Every address is masked to 12 bits, so reads and writes never leave the buffer.
pub struct Memory {
    ram: Box<[u8; MEM_SIZE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            ram: Box::new([0; MEM_SIZE]),
        }
    }
}

impl Memory {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline(always)]
    pub fn read(&self, address: usize) -> u8 {
        self.ram[address & ADDRESS_MASK]
    }

    #[inline(always)]
    pub fn write(&mut self, address: usize, value: u8) {
        self.ram[address & ADDRESS_MASK] = value;
    }

    /// Big-endian 16-bit word at `address`. The second byte wraps to 0x000.
    #[inline(always)]
    pub fn read_word(&self, address: usize) -> u16 {
        ((self.read(address) as u16) << 8) | self.read(address + 1) as u16
    }

    /// Copy `data` into memory starting at `start`.
    ///
    /// The start address is masked like any other access, but the block itself
    /// must fit entirely; it is never truncated or wrapped.
    pub fn load_block(&mut self, start: usize, data: &[u8]) -> Chip8Result<()> {
        let start = start & ADDRESS_MASK;
        let end = start + data.len();
        if end > MEM_SIZE {
            return Err(Chip8Error::AddressOutOfRange(end));
        }

        self.ram[start..end].copy_from_slice(data);

        Ok(())
    }

    /// Install a program image at `MEM_START`.
    pub fn load_program(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if !check_program_size(bytecode) {
            return Err(Chip8Error::RomTooLarge {
                size: bytecode.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }

        self.load_block(MEM_START, bytecode)
    }

    /// Erase the whole address space.
    pub fn clear(&mut self) {
        self.ram.fill(0);
    }
}

impl Index<usize> for Memory {
    type Output = u8;

    fn index(&self, address: usize) -> &Self::Output {
        &self.ram[address & ADDRESS_MASK]
    }
}

#[inline]
pub fn check_program_size(bytecode: &[u8]) -> bool {
    bytecode.len() <= MAX_PROGRAM_SIZE
}
