//! Call stack of subroutine return addresses.
use crate::constants::*;

/// Fixed capacity return address stack.
///
/// The stack pointer is owned here, and is both the slot the next push
/// writes to and the current depth.
pub struct Stack {
    slots: [Address; STACK_SIZE],
    sp: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    Overflow,
    Underflow,
}

impl Default for Stack {
    fn default() -> Self {
        Self {
            slots: [0; STACK_SIZE],
            sp: 0,
        }
    }
}

impl Stack {
    pub fn new() -> Self {
        Default::default()
    }

    /// Write the address at the stack pointer, then advance the pointer.
    pub fn push(&mut self, address: Address) -> Result<(), StackError> {
        if self.sp >= STACK_SIZE {
            return Err(StackError::Overflow);
        }

        self.slots[self.sp] = address;
        self.sp += 1;

        Ok(())
    }

    /// Step the pointer back, then read the address it points at.
    pub fn pop(&mut self) -> Result<Address, StackError> {
        if self.sp == 0 {
            return Err(StackError::Underflow);
        }

        self.sp -= 1;

        Ok(self.slots[self.sp])
    }

    /// Current nesting depth.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.sp
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    pub fn clear(&mut self) {
        self.slots.fill(0);
        self.sp = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stack_round_trip() {
        let mut stack = Stack::new();
        let addresses: Vec<Address> = (0..STACK_SIZE as u16).map(|i| 0x200 + i * 2).collect();

        for addr in &addresses {
            stack.push(*addr).unwrap();
        }
        assert_eq!(stack.len(), STACK_SIZE);
        assert_eq!(stack.push(0x300), Err(StackError::Overflow));
        assert_eq!(stack.len(), STACK_SIZE);

        for addr in addresses.iter().rev() {
            assert_eq!(stack.pop(), Ok(*addr));
        }
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), Err(StackError::Underflow));
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_stack_top_slot() {
        let mut stack = Stack::new();
        stack.push(0x202).unwrap();
        stack.push(0x20A).unwrap();
        assert_eq!(stack.pop(), Ok(0x20A));
        stack.push(0x2F0).unwrap();
        assert_eq!(stack.pop(), Ok(0x2F0));
        assert_eq!(stack.pop(), Ok(0x202));
    }
}
