//! Assembler for the console's instruction language.
//!
//! Source is a stream of lowercase three-letter mnemonics, each followed by its operands:
//!
//! ```text
//! :loop               // label definition
//!     srb 1 2a        // register 1 = 0x2a
//!     smr 1 0400      // memory[0x0400] = register 1
//!     "hi\n"          // inline data, skipped at run time
//!     nxt
//!     jmp loop
//! ```
//!
//! [`compile`] turns one such source unit into a flat ROM, with no header or padding.

mod error;
pub use error::*;

pub mod isa;
pub use isa::{ArgType, Condition, Opcode};

mod labels;
pub use labels::*;

mod lexer;
pub use lexer::{TokenSink, tokenize};

mod emitter;
pub use emitter::*;

use std::{fs, path::Path};

use tracing::debug;

/// Compiles a complete source unit into ROM bytes.
pub fn compile(source: &[u8]) -> Result<Vec<u8>, CompileError> {
    let mut emitter = Emitter::new();
    tokenize(source, &mut emitter)?;

    let rom = emitter.into_rom()?;
    debug!(source_len = source.len(), rom_len = rom.len(), "compiled rom");
    Ok(rom)
}

/// Reads the source file at `path` and compiles it.
pub fn assemble_file(path: impl AsRef<Path>) -> Result<Vec<u8>, AssembleFileError> {
    let source = fs::read(path.as_ref())?;
    Ok(compile(&source)?)
}
