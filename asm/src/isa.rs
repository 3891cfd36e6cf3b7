//! The instruction set shared by the assembler and the emulator core.
//!
//! Every instruction is a one-byte opcode followed by its operands, in the order they are written
//! in source. The `opcodes!` table below is the single definition of opcode values, mnemonics
//! and operand signatures.

use std::fmt;

/// Opens an inert data region. Emitted before the bytes of a string literal.
pub const IGNORE: u8 = 0xfe;

/// Closes an inert data region. Shares its value with `nop`.
pub const UNIGNORE: u8 = 0x00;

/// Call and jump opcodes share a dispatch routine. Opcodes at or above this value move the
/// cursor without touching the call stack.
pub const JUMP_MIN: u8 = 0xbf;

/// The kind of operand occupying one argument slot of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgType {
    /// A register number, one byte.
    Register,

    /// An immediate byte, written as two hex digits.
    Byte,

    /// An absolute memory address, written as four hex digits and encoded big-endian.
    Word,

    /// A label name, encoded as the big-endian ROM offset of its definition.
    Label,
}

impl ArgType {
    /// Number of ROM bytes this operand occupies.
    pub const fn encoded_len(self) -> usize {
        match self {
            ArgType::Register | ArgType::Byte => 1,
            ArgType::Word | ArgType::Label => 2,
        }
    }
}

/// Comparison applied to two registers by the conditional call, jump and return instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    Always,
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl Condition {
    pub fn holds(self, a: u8, b: u8) -> bool {
        match self {
            Condition::Always => true,
            Condition::Equal => a == b,
            Condition::NotEqual => a != b,
            Condition::Greater => a > b,
            Condition::Less => a < b,
            Condition::GreaterOrEqual => a >= b,
            Condition::LessOrEqual => a <= b,
        }
    }
}

macro_rules! opcodes {
    (@mnemonic _) => { None };
    (@mnemonic $mnemonic:literal) => { Some($mnemonic) };

    (
        $(
            $(#[$doc:meta])*
            $name:ident = $value:literal, $mnemonic:tt => [$($arg:ident),*]
        ),* $(,)?
    ) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name = $value,
            )*
        }

        impl TryFrom<u8> for Opcode {
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Opcode::$name), )*
                    _ => Err(value),
                }
            }
        }

        impl Opcode {
            /// Every opcode, in table order.
            pub const ALL: &'static [Opcode] = &[$( Opcode::$name ),*];

            /// The source mnemonic, or `None` for opcodes only the assembler itself emits.
            pub const fn mnemonic(self) -> Option<&'static str> {
                match self {
                    $( Opcode::$name => opcodes!(@mnemonic $mnemonic), )*
                }
            }

            /// Operand slots, in source and ROM order.
            pub const fn args(self) -> &'static [ArgType] {
                match self {
                    $( Opcode::$name => &[$( ArgType::$arg ),*], )*
                }
            }
        }
    };
}

opcodes! {
    // Control
    /// nop ; does nothing
    Nop = 0x00, "nop" => [],
    /// nxt ; ends the current frame
    NextFrame = 0x01, "nxt" => [],

    // Moves
    /// smr reg addr ; memory[addr] = reg
    CopyRegisterToMemory = 0x02, "smr" => [Register, Word],
    /// srm reg addr ; reg = memory[addr]
    CopyMemoryToRegister = 0x03, "srm" => [Register, Word],
    /// srb reg byte ; reg = byte
    SetRegister = 0x04, "srb" => [Register, Byte],
    /// smb addr byte ; memory[addr] = byte
    SetMemory = 0x05, "smb" => [Word, Byte],
    /// srr src dst ; dst = src
    SetRegisterRegister = 0x06, "srr" => [Register, Register],

    // Arithmetic, all wrapping
    /// add a b dst ; dst = a + b
    Add = 0x10, "add" => [Register, Register, Register],
    /// sub a b dst ; dst = a - b
    Sub = 0x11, "sub" => [Register, Register, Register],
    /// mul a b dst ; dst = a * b
    Mul = 0x12, "mul" => [Register, Register, Register],
    /// div a b dst ; dst = a / b, or 0 when b is 0
    Div = 0x13, "div" => [Register, Register, Register],
    /// mod a b dst ; dst = a % b, or 0 when b is 0
    Mod = 0x14, "mod" => [Register, Register, Register],

    // Bitwise. `nan` and `nor` invert OR and AND respectively; ROMs depend on this.
    /// xor a b dst ; dst = a ^ b
    Xor = 0x20, "xor" => [Register, Register, Register],
    /// and a b dst ; dst = a & b
    And = 0x21, "and" => [Register, Register, Register],
    /// orr a b dst ; dst = a | b
    Or = 0x22, "orr" => [Register, Register, Register],
    /// xnr a b dst ; dst = !(a ^ b)
    Xnor = 0x23, "xnr" => [Register, Register, Register],
    /// nan a b dst ; dst = !(a | b)
    Nand = 0x24, "nan" => [Register, Register, Register],
    /// nor a b dst ; dst = !(a & b)
    Nor = 0x25, "nor" => [Register, Register, Register],
    /// not src dst ; dst = !src
    Not = 0x26, "not" => [Register, Register],
    /// bsl a b dst ; dst = a << b, or 0 when b >= 8
    ShiftLeft = 0x27, "bsl" => [Register, Register, Register],
    /// bsr a b dst ; dst = a >> b, or 0 when b >= 8
    ShiftRight = 0x29, "bsr" => [Register, Register, Register],

    // Calls
    /// psh label ; call label
    Call = 0x9f, "psh" => [Label],
    /// teq a b label ; call label if a == b
    CallIfEqual = 0xa0, "teq" => [Register, Register, Label],
    /// tnq a b label ; call label if a != b
    CallIfNotEqual = 0xa1, "tnq" => [Register, Register, Label],
    /// tgt a b label ; call label if a > b
    CallIfGreater = 0xa2, "tgt" => [Register, Register, Label],
    /// tlt a b label ; call label if a < b
    CallIfLess = 0xa3, "tlt" => [Register, Register, Label],
    /// tge a b label ; call label if a >= b
    CallIfGreaterOrEqual = 0xa4, "tge" => [Register, Register, Label],
    /// tle a b label ; call label if a <= b
    CallIfLessOrEqual = 0xa5, "tle" => [Register, Register, Label],

    // Returns
    /// pop ; return
    Return = 0xaf, "pop" => [],
    /// peq a b ; return if a == b
    ReturnIfEqual = 0xb0, "peq" => [Register, Register],
    /// pnq a b ; return if a != b
    ReturnIfNotEqual = 0xb1, "pnq" => [Register, Register],
    /// pgt a b ; return if a > b
    ReturnIfGreater = 0xb2, "pgt" => [Register, Register],
    /// plt a b ; return if a < b
    ReturnIfLess = 0xb3, "plt" => [Register, Register],
    /// pge a b ; return if a >= b
    ReturnIfGreaterOrEqual = 0xb4, "pge" => [Register, Register],
    /// ple a b ; return if a <= b
    ReturnIfLessOrEqual = 0xb5, "ple" => [Register, Register],

    // Jumps
    /// jmp label ; jump to label
    Jump = 0xbf, "jmp" => [Label],
    /// jeq a b label ; jump to label if a == b
    JumpIfEqual = 0xc0, "jeq" => [Register, Register, Label],
    /// jnq a b label ; jump to label if a != b
    JumpIfNotEqual = 0xc1, "jnq" => [Register, Register, Label],
    /// jgt a b label ; jump to label if a > b
    JumpIfGreater = 0xc2, "jgt" => [Register, Register, Label],
    /// jlt a b label ; jump to label if a < b
    JumpIfLess = 0xc3, "jlt" => [Register, Register, Label],
    /// jge a b label ; jump to label if a >= b
    JumpIfGreaterOrEqual = 0xc4, "jge" => [Register, Register, Label],
    /// jle a b label ; jump to label if a <= b
    JumpIfLessOrEqual = 0xc5, "jle" => [Register, Register, Label],

    /// Starts skipping data bytes until the next [`UNIGNORE`]
    Ignore = 0xfe, _ => [],
    /// hlt ; stops the machine for good
    Halt = 0xff, "hlt" => [],
}

impl Opcode {
    /// Looks up the opcode written as `word` in source.
    pub fn from_mnemonic(word: &str) -> Option<Opcode> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|opcode| opcode.mnemonic() == Some(word))
    }

    /// The comparison guarding a call, jump or return. Every other opcode is unconditional.
    pub const fn condition(self) -> Condition {
        use Opcode::*;

        match self {
            CallIfEqual | ReturnIfEqual | JumpIfEqual => Condition::Equal,
            CallIfNotEqual | ReturnIfNotEqual | JumpIfNotEqual => Condition::NotEqual,
            CallIfGreater | ReturnIfGreater | JumpIfGreater => Condition::Greater,
            CallIfLess | ReturnIfLess | JumpIfLess => Condition::Less,
            CallIfGreaterOrEqual | ReturnIfGreaterOrEqual | JumpIfGreaterOrEqual => {
                Condition::GreaterOrEqual
            }
            CallIfLessOrEqual | ReturnIfLessOrEqual | JumpIfLessOrEqual => Condition::LessOrEqual,
            _ => Condition::Always,
        }
    }

    /// Total encoded length of the instruction, opcode byte included.
    pub fn encoded_len(self) -> usize {
        1 + self.args().iter().map(|arg| arg.encoded_len()).sum::<usize>()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(mnemonic) => f.write_str(mnemonic),
            None => write!(f, "{:#04x}", *self as u8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_round_trip() {
        for &opcode in Opcode::ALL {
            assert_eq!(Opcode::try_from(opcode as u8), Ok(opcode));
            if let Some(mnemonic) = opcode.mnemonic() {
                assert_eq!(mnemonic.len(), 3);
                assert_eq!(Opcode::from_mnemonic(mnemonic), Some(opcode));
            }
        }
    }

    #[test]
    fn test_invalid_opcodes() {
        assert_eq!(Opcode::try_from(0x07), Err(0x07));
        assert_eq!(Opcode::try_from(0x28), Err(0x28));
        assert_eq!(Opcode::try_from(0xc6), Err(0xc6));
        assert_eq!(Opcode::from_mnemonic("brk"), None);
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(Opcode::try_from(IGNORE), Ok(Opcode::Ignore));
        assert_eq!(Opcode::Ignore.mnemonic(), None);
        assert_eq!(Opcode::try_from(UNIGNORE), Ok(Opcode::Nop));
    }

    #[test]
    fn test_jump_threshold() {
        for &opcode in Opcode::ALL {
            let value = opcode as u8;
            let is_jump = matches!(opcode.args().last(), Some(ArgType::Label)) && value >= JUMP_MIN;
            assert_eq!(is_jump, (JUMP_MIN..=0xc5).contains(&value), "{opcode}");
        }
    }

    #[test]
    fn test_conditions() {
        assert_eq!(Opcode::JumpIfLessOrEqual.condition(), Condition::LessOrEqual);
        assert_eq!(Opcode::ReturnIfNotEqual.condition(), Condition::NotEqual);
        assert_eq!(Opcode::Call.condition(), Condition::Always);
        assert!(Condition::LessOrEqual.holds(3, 3));
        assert!(!Condition::Greater.holds(3, 3));
        assert!(Condition::GreaterOrEqual.holds(4, 3));
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(Opcode::Halt.encoded_len(), 1);
        assert_eq!(Opcode::SetMemory.encoded_len(), 4);
        assert_eq!(Opcode::JumpIfEqual.encoded_len(), 5);
        assert_eq!(Opcode::Add.encoded_len(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(Opcode::Add.to_string(), "add");
        assert_eq!(Opcode::Ignore.to_string(), "0xfe");
    }
}
