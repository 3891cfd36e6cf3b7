use console_asm::{Condition, Opcode, isa::{JUMP_MIN, UNIGNORE}};
use tracing::{debug, trace};

use crate::{Fault, Memory, Status, host::{Host, HostEvent}};

use super::{Console, DecodeMode, register_index};

/// How a [`Console::run`] ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Frames started, including the one that stopped the run.
    pub frames: u64,

    /// Status of the last frame.
    pub status: Status,
}

impl Console {
    /// Runs one frame per host tick until the machine stops or the host exits.
    pub fn run(&mut self, host: &mut impl Host) -> RunOutcome {
        let mut frames = 0;
        loop {
            let status = self.frame();
            frames += 1;

            if status != Status::NextFrame {
                return RunOutcome { frames, status };
            }

            match host.wait_for_tick(frames) {
                HostEvent::Tick => {}
                HostEvent::Exit => return RunOutcome { frames, status },
            }
        }
    }

    /// Steps until the end of the current frame, returning the status that ended it.
    pub fn frame(&mut self) -> Status {
        loop {
            match self.step() {
                Status::Continue => {}
                status => return status,
            }
        }
    }

    /// Executes one instruction, or skips one data byte.
    pub fn step(&mut self) -> Status {
        if self.halted {
            return Status::Halted;
        }

        let result = match self.mode {
            DecodeMode::Normal => self.execute_one_instruction(),
            DecodeMode::SkippingData => self.skip_data(),
        };

        match result {
            Ok(status) => status,
            Err(fault) => {
                debug!(%fault, cursor = self.rom_cursor, "console halted");
                self.halted = true;
                fault.into()
            }
        }
    }

    fn skip_data(&mut self) -> Result<Status, Fault> {
        if self.fetch()? == UNIGNORE {
            self.mode = DecodeMode::Normal;
        }
        Ok(Status::Continue)
    }

    fn execute_one_instruction(&mut self) -> Result<Status, Fault> {
        let start = self.rom_cursor;
        let ins = self.fetch()?;

        let Ok(opcode) = Opcode::try_from(ins) else {
            self.rom_cursor = start;
            return Err(Fault::InvalidInstruction(ins));
        };
        trace!(%opcode, cursor = start, "execute");

        use Opcode::*;
        match opcode {
            Nop => {}

            NextFrame => return Ok(Status::NextFrame),

            CopyRegisterToMemory => {
                let reg = self.fetch_register()?;
                let addr = self.fetch_short()?;
                self.write_byte(addr, self.registers[reg])?;
            }

            CopyMemoryToRegister => {
                let reg = self.fetch_register()?;
                let addr = self.fetch_short()?;
                self.registers[reg] = self.read_byte(addr)?;
            }

            SetRegister => {
                let reg = self.fetch_register()?;
                self.registers[reg] = self.fetch()?;
            }

            SetMemory => {
                let addr = self.fetch_short()?;
                let byte = self.fetch()?;
                self.write_byte(addr, byte)?;
            }

            SetRegisterRegister => {
                let src = self.fetch_register()?;
                let dst = self.fetch_register()?;
                self.registers[dst] = self.registers[src];
            }

            Add | Sub | Mul | Div | Mod | Xor | And | Or | Xnor | Nand | Nor | ShiftLeft
            | ShiftRight => {
                let a = self.fetch_register()?;
                let b = self.fetch_register()?;
                let dst = self.fetch_register()?;
                let (a, b) = (self.registers[a], self.registers[b]);

                self.registers[dst] = match opcode {
                    Add => a.wrapping_add(b),
                    Sub => a.wrapping_sub(b),
                    Mul => a.wrapping_mul(b),
                    Div => a.checked_div(b).unwrap_or(0),
                    Mod => a.checked_rem(b).unwrap_or(0),
                    Xor => a ^ b,
                    And => a & b,
                    Or => a | b,
                    Xnor => !(a ^ b),
                    Nand => !(a | b),
                    Nor => !(a & b),
                    ShiftLeft => a.checked_shl(b as u32).unwrap_or(0),
                    ShiftRight => a.checked_shr(b as u32).unwrap_or(0),
                    _ => unreachable!(),
                };
            }

            Not => {
                let src = self.fetch_register()?;
                let dst = self.fetch_register()?;
                self.registers[dst] = !self.registers[src];
            }

            Call | CallIfEqual | CallIfNotEqual | CallIfGreater | CallIfLess
            | CallIfGreaterOrEqual | CallIfLessOrEqual | Jump | JumpIfEqual | JumpIfNotEqual
            | JumpIfGreater | JumpIfLess | JumpIfGreaterOrEqual | JumpIfLessOrEqual => {
                let condition = opcode.condition();
                let taken = self.fetch_condition(condition)?;
                let target = self.fetch_short()?;

                if taken {
                    if opcode as u8 >= JUMP_MIN {
                        self.jump_to(target)?;
                    } else {
                        self.call(target)?;
                    }
                }
            }

            Return | ReturnIfEqual | ReturnIfNotEqual | ReturnIfGreater | ReturnIfLess
            | ReturnIfGreaterOrEqual | ReturnIfLessOrEqual => {
                if self.fetch_condition(opcode.condition())? {
                    self.rom_cursor = self.call_stack.pop()? as usize;
                }
            }

            Ignore => self.mode = DecodeMode::SkippingData,

            Halt => {
                debug!(cursor = start, "console halted");
                self.rom_cursor = start;
                self.halted = true;
                return Ok(Status::Halted);
            }
        }

        Ok(Status::Continue)
    }

    /// Reads the next ROM byte. The cursor never moves past the end of the ROM.
    fn fetch(&mut self) -> Result<u8, Fault> {
        let byte = *self.rom.get(self.rom_cursor).ok_or(Fault::EndOfRom)?;
        self.rom_cursor += 1;
        Ok(byte)
    }

    fn fetch_register(&mut self) -> Result<usize, Fault> {
        Ok(register_index(self.fetch()?))
    }

    fn fetch_short(&mut self) -> Result<u16, Fault> {
        Ok(u16::from_be_bytes([self.fetch()?, self.fetch()?]))
    }

    /// Evaluates `condition`, fetching its two register operands unless it is unconditional.
    fn fetch_condition(&mut self, condition: Condition) -> Result<bool, Fault> {
        if condition == Condition::Always {
            return Ok(true);
        }

        let a = self.fetch_register()?;
        let b = self.fetch_register()?;
        Ok(condition.holds(self.registers[a], self.registers[b]))
    }

    fn jump_to(&mut self, target: u16) -> Result<(), Fault> {
        let target = target as usize;
        if target > self.rom.len() {
            return Err(Fault::EndOfRom);
        }
        self.rom_cursor = target;
        Ok(())
    }

    fn call(&mut self, target: u16) -> Result<(), Fault> {
        if target as usize > self.rom.len() {
            return Err(Fault::EndOfRom);
        }

        let return_addr = u16::try_from(self.rom_cursor).map_err(|_| Fault::StackOutOfBounds)?;
        self.call_stack.push(return_addr)?;
        self.rom_cursor = target as usize;
        Ok(())
    }
}
