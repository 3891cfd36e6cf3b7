use std::{collections::TryReserveError, fmt, io};

use thiserror::Error;

use crate::isa::Opcode;

/// A location in source text. Lines and columns both start at 1, and columns count bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}C{}", self.line, self.column)
    }
}

/// Failure to compile a source unit. Compilation stops at the first one.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{position}: {kind}")]
    At {
        kind: CompileErrorKind,
        position: Position,
    },

    /// A growable buffer could not be extended.
    #[error("out of memory: {0}")]
    Allocation(#[from] TryReserveError),
}

impl CompileError {
    pub(crate) fn at(kind: CompileErrorKind, position: Position) -> Self {
        CompileError::At { kind, position }
    }

    pub fn kind(&self) -> Option<&CompileErrorKind> {
        match self {
            CompileError::At { kind, .. } => Some(kind),
            CompileError::Allocation(_) => None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            CompileError::At { position, .. } => Some(*position),
            CompileError::Allocation(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompileErrorKind {
    #[error("unknown word `{0}`")]
    UnknownWord(String),

    #[error("invalid register `{0}`, expected a digit from 0 to 7")]
    InvalidRegister(String),

    #[error("invalid byte `{0}`, expected 2 hex digits")]
    InvalidByte(String),

    #[error("invalid word `{0}`, expected 4 hex digits")]
    InvalidWord(String),

    #[error("invalid escape sequence")]
    InvalidEscape,

    #[error("invalid character `{}`", .0.escape_ascii())]
    InvalidCharacter(u8),

    #[error("label `{name}` is already defined at {previous}")]
    DuplicateLabel { name: String, previous: Position },

    #[error("empty label name")]
    EmptyLabel,

    #[error("label `{0}` is not defined")]
    UnresolvedLabel(String),

    /// Labels are encoded in 16 bits, so none may be defined past offset 0xffff.
    #[error("label `{0}` lies beyond the 16-bit address space")]
    LabelOutOfRange(String),

    #[error("string literal where an argument to `{0}` was expected")]
    StringInArgument(Opcode),

    #[error("label definition `{0}` where an argument was expected")]
    LabelDefinitionInArgument(String),

    #[error("`{0}` is missing arguments")]
    MissingArgument(Opcode),

    #[error("unterminated string literal")]
    UnterminatedString,
}

/// Failure of [`assemble_file`](crate::assemble_file).
#[derive(Debug, Error)]
pub enum AssembleFileError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Compile(#[from] CompileError),
}
