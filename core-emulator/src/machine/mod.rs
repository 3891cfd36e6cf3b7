use console_asm::{CompileError, compile};
use thiserror::Error;

use crate::stack::CallStack;

pub const REGISTER_COUNT: usize = 8;
pub const MEMORY_SIZE: usize = 2usize.pow(16);

/// How the next ROM byte is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeMode {
    /// Bytes are dispatched as instructions.
    Normal,

    /// Bytes are inert data, skipped until the unignore sentinel.
    SkippingData,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("rom is empty")]
    EmptyRom,

    #[error("rom is {0} bytes, larger than the 32-bit limit")]
    RomTooLarge(usize),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// A console machine executing one ROM.
#[derive(Clone)]
pub struct Console {
    pub registers: [u8; REGISTER_COUNT],
    pub memory: [u8; MEMORY_SIZE],
    pub call_stack: CallStack,
    rom: Box<[u8]>,
    rom_cursor: usize,
    mode: DecodeMode,
    halted: bool,
}

impl Console {
    pub fn new_with_rom(rom: impl Into<Box<[u8]>>) -> Result<Self, LoadError> {
        let rom = rom.into();
        if rom.is_empty() {
            return Err(LoadError::EmptyRom);
        }
        if u32::try_from(rom.len()).is_err() {
            return Err(LoadError::RomTooLarge(rom.len()));
        }

        Ok(Self {
            registers: [0; REGISTER_COUNT],
            memory: [0; MEMORY_SIZE],
            call_stack: CallStack::new(),
            rom,
            rom_cursor: 0,
            mode: DecodeMode::Normal,
            halted: false,
        })
    }

    pub fn new_with_source(code: &str) -> Result<Self, LoadError> {
        let rom = compile(code.as_bytes())?;
        Self::new_with_rom(rom)
    }

    /// Returns the machine to its freshly loaded state, keeping the ROM.
    pub fn reset(&mut self) {
        self.registers = [0; REGISTER_COUNT];
        self.clear_memory();
        self.call_stack.clear();
        self.rom_cursor = 0;
        self.mode = DecodeMode::Normal;
        self.halted = false;
    }

    /// Reads a register, masking the index to the register file as instructions do.
    pub fn register(&self, index: u8) -> u8 {
        self.registers[register_index(index)]
    }

    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    pub fn rom_cursor(&self) -> usize {
        self.rom_cursor
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

fn register_index(encoded: u8) -> usize {
    (encoded & 0x07) as usize
}

mod exec;
pub use exec::*;

mod mem;
