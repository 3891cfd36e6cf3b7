use crate::{Fault, Memory};

use super::Console;

impl Console {
    pub fn clear_memory(&mut self) {
        for item in &mut self.memory {
            *item = 0;
        }
    }
}

impl Memory for Console {
    fn read_byte(&self, addr: u16) -> Result<u8, Fault> {
        self.memory
            .get(addr as usize)
            .copied()
            .ok_or(Fault::MemoryOutOfBounds(addr))
    }

    fn write_byte(&mut self, addr: u16, byte: u8) -> Result<(), Fault> {
        let cell = self
            .memory
            .get_mut(addr as usize)
            .ok_or(Fault::MemoryOutOfBounds(addr))?;
        *cell = byte;
        Ok(())
    }
}
