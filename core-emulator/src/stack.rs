//! Bounded return-address stack used by the call and return instructions.

use crate::common::Fault;

/// Maximum number of nested calls.
pub const CALL_STACK_SIZE: usize = 1024;

#[derive(Clone)]
pub struct CallStack {
    pointer: usize,
    data: [u16; CALL_STACK_SIZE],
}

impl CallStack {
    pub fn new() -> Self {
        Self {
            pointer: 0,
            data: [0; CALL_STACK_SIZE],
        }
    }

    /// Pushes a return address. A full stack is left untouched.
    pub fn push(&mut self, addr: u16) -> Result<(), Fault> {
        let slot = self
            .data
            .get_mut(self.pointer)
            .ok_or(Fault::StackOutOfBounds)?;
        *slot = addr;
        self.pointer += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        if self.pointer == 0 {
            return Err(Fault::StackOutOfBounds);
        }
        self.pointer -= 1;
        Ok(self.data[self.pointer])
    }

    pub fn len(&self) -> usize {
        self.pointer
    }

    pub fn is_empty(&self) -> bool {
        self.pointer == 0
    }

    pub fn is_full(&self) -> bool {
        self.pointer == CALL_STACK_SIZE
    }

    /// Live return addresses, oldest first.
    pub fn as_slice(&self) -> &[u16] {
        &self.data[..self.pointer]
    }

    pub fn clear(&mut self) {
        self.pointer = 0;
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
