use thiserror::Error;

/// The result of a single [`step`](crate::Console::step) or [`frame`](crate::Console::frame).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// Keep stepping.
    Continue,

    /// A `nxt` instruction ended the current frame.
    NextFrame,

    /// The machine is stopped. Every later step returns this too.
    Halted,

    InvalidInstruction,
    EndOfRom,
    MemoryOutOfBounds,
    StackOutOfBounds,
}

impl Status {
    /// The numeric status codes hosts have historically branched on.
    pub const fn code(self) -> u8 {
        match self {
            Status::Continue => 0,
            Status::NextFrame => 1,
            Status::Halted => 2,
            Status::InvalidInstruction => 3,
            Status::EndOfRom => 4,
            Status::MemoryOutOfBounds => 5,
            Status::StackOutOfBounds => 6,
        }
    }

    /// Whether the machine can still make progress after returning this.
    pub const fn is_running(self) -> bool {
        matches!(self, Status::Continue | Status::NextFrame)
    }

    /// Whether this status reports a fault rather than an orderly stop.
    pub const fn is_fault(self) -> bool {
        !self.is_running() && !matches!(self, Status::Halted)
    }
}

/// Something that stops the machine in the middle of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("read past the end of the rom")]
    EndOfRom,

    #[error("invalid instruction {0:#04x}")]
    InvalidInstruction(u8),

    #[error("memory address {0:#06x} out of bounds")]
    MemoryOutOfBounds(u16),

    #[error("call stack out of bounds")]
    StackOutOfBounds,
}

impl From<Fault> for Status {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::EndOfRom => Status::EndOfRom,
            Fault::InvalidInstruction(_) => Status::InvalidInstruction,
            Fault::MemoryOutOfBounds(_) => Status::MemoryOutOfBounds,
            Fault::StackOutOfBounds => Status::StackOutOfBounds,
        }
    }
}

/// Byte-addressed memory with a 16-bit address space. Accesses are bounds-checked against the
/// actual capacity.
pub trait Memory {
    fn read_byte(&self, addr: u16) -> Result<u8, Fault>;
    fn write_byte(&mut self, addr: u16, byte: u8) -> Result<(), Fault>;

    /// Reads a big-endian short. The second byte wraps around to address 0.
    fn read_short(&self, addr: u16) -> Result<u16, Fault> {
        Ok(u16::from_be_bytes([
            self.read_byte(addr)?,
            self.read_byte(addr.wrapping_add(1))?,
        ]))
    }

    fn write_short(&mut self, addr: u16, short: u16) -> Result<(), Fault> {
        let [hi, lo] = short.to_be_bytes();
        self.write_byte(addr, hi)?;
        self.write_byte(addr.wrapping_add(1), lo)
    }
}
