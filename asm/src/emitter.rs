use tracing::trace;

use crate::{
    error::{CompileError, CompileErrorKind, Position},
    isa::{ArgType, IGNORE, Opcode, UNIGNORE},
    labels::LabelTable,
    lexer::TokenSink,
};

/// An instruction whose argument slots are still being filled.
#[derive(Clone, Copy, Debug)]
struct Pending {
    opcode: Opcode,
    next_arg: usize,
    start: Position,
}

/// Turns words into ROM bytes, one instruction at a time.
///
/// Label operands are emitted as two zero bytes and patched by [`Emitter::into_rom`] once every
/// definition is known.
#[derive(Debug, Default)]
pub struct Emitter {
    rom: Vec<u8>,
    labels: LabelTable,
    pending: Option<Pending>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Resolves label references and returns the finished ROM.
    pub fn into_rom(mut self) -> Result<Vec<u8>, CompileError> {
        self.labels.resolve(&mut self.rom)?;
        Ok(self.rom)
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<(), CompileError> {
        self.rom.try_reserve(bytes.len())?;
        self.rom.extend_from_slice(bytes);
        Ok(())
    }

    fn instruction_or_label(&mut self, word: &str, start: Position) -> Result<(), CompileError> {
        if let Some(opcode) = Opcode::from_mnemonic(word) {
            trace!(%opcode, offset = self.rom.len(), "instruction");
            self.emit(&[opcode as u8])?;
            if !opcode.args().is_empty() {
                self.pending = Some(Pending {
                    opcode,
                    next_arg: 0,
                    start,
                });
            }
            Ok(())
        } else if let Some(name) = word.strip_prefix(':') {
            let offset = self.rom.len();
            self.labels.define(name, offset, start)
        } else {
            Err(CompileError::at(
                CompileErrorKind::UnknownWord(word.to_owned()),
                start,
            ))
        }
    }

    fn argument(&mut self, pending: Pending, word: &str, start: Position) -> Result<(), CompileError> {
        let invalid = |kind: fn(String) -> CompileErrorKind| {
            CompileError::at(kind(word.to_owned()), start)
        };

        match pending.opcode.args()[pending.next_arg] {
            // Either `name` or `:name` refers to the label defined by `:name`
            ArgType::Label => {
                let name = word.strip_prefix(':').unwrap_or(word);
                let offset = self.rom.len();
                self.labels.reference(name, offset, start)?;
                self.emit(&[0, 0])?;
            }

            _ if word.starts_with(':') => {
                return Err(invalid(CompileErrorKind::LabelDefinitionInArgument));
            }

            ArgType::Register => {
                let register = parse_register(word)
                    .ok_or_else(|| invalid(CompileErrorKind::InvalidRegister))?;
                self.emit(&[register])?;
            }

            ArgType::Byte => {
                let byte = parse_hex(word, 2).ok_or_else(|| invalid(CompileErrorKind::InvalidByte))?;
                self.emit(&[byte as u8])?;
            }

            ArgType::Word => {
                let short = parse_hex(word, 4).ok_or_else(|| invalid(CompileErrorKind::InvalidWord))?;
                self.emit(&short.to_be_bytes())?;
            }
        }

        let next_arg = pending.next_arg + 1;
        self.pending = if next_arg < pending.opcode.args().len() {
            Some(Pending { next_arg, ..pending })
        } else {
            None
        };

        Ok(())
    }
}

impl TokenSink for Emitter {
    fn word(&mut self, word: &str, start: Position) -> Result<(), CompileError> {
        match self.pending {
            Some(pending) => self.argument(pending, word, start),
            None => self.instruction_or_label(word, start),
        }
    }

    fn begin_string(&mut self, start: Position) -> Result<(), CompileError> {
        if let Some(pending) = self.pending {
            return Err(CompileError::at(
                CompileErrorKind::StringInArgument(pending.opcode),
                start,
            ));
        }
        self.emit(&[IGNORE])
    }

    fn string_byte(&mut self, byte: u8) -> Result<(), CompileError> {
        self.emit(&[byte])
    }

    fn end_string(&mut self) -> Result<(), CompileError> {
        self.emit(&[UNIGNORE])
    }

    fn finish(&mut self, _end: Position) -> Result<(), CompileError> {
        match self.pending {
            Some(pending) => Err(CompileError::at(
                CompileErrorKind::MissingArgument(pending.opcode),
                pending.start,
            )),
            None => Ok(()),
        }
    }
}

/// A single digit naming one of the eight registers.
fn parse_register(word: &str) -> Option<u8> {
    match word.as_bytes() {
        [digit @ b'0'..=b'7'] => Some(digit - b'0'),
        _ => None,
    }
}

/// Exactly `digits` hex digits.
fn parse_hex(word: &str, digits: usize) -> Option<u16> {
    if word.len() != digits || !word.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(word, 16).ok()
}
