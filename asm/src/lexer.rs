//! Single-pass tokenizer.
//!
//! The lexer walks the source one byte at a time and hands words and string literal bytes to a
//! [`TokenSink`] as soon as they are complete. Comments are consumed here and never reach the
//! sink.
//!
//! Words are made of lowercase letters, digits and underscores, optionally led by a `:`. A `/`
//! is buffered into the current word only so that `//` and `/*` can be recognised; it is rejected
//! if it survives into a flushed word.

use crate::error::{CompileError, CompileErrorKind, Position};

/// Receives tokens from the lexer, in source order.
pub trait TokenSink {
    /// A complete word, and the position of its first byte.
    fn word(&mut self, word: &str, start: Position) -> Result<(), CompileError>;

    /// An opening `"` at `start`.
    fn begin_string(&mut self, start: Position) -> Result<(), CompileError>;

    /// One byte of string data, with escapes already decoded.
    fn string_byte(&mut self, byte: u8) -> Result<(), CompileError>;

    /// The closing `"` of a string.
    fn end_string(&mut self) -> Result<(), CompileError>;

    /// The end of the input, positioned just past its last byte.
    fn finish(&mut self, end: Position) -> Result<(), CompileError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Normal,
    String(Escape),
    LineComment,
    BlockComment { star: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Escape {
    None,
    Pending,
    Hex { value: u8, digits: u8 },
}

/// Tokenizes the whole of `source` into `sink`.
pub fn tokenize<S: TokenSink>(source: &[u8], sink: &mut S) -> Result<(), CompileError> {
    let mut lexer = Lexer::new(sink);
    for &byte in source {
        lexer.feed(byte)?;
    }
    lexer.finish()
}

struct Lexer<'s, S> {
    sink: &'s mut S,
    mode: Mode,
    word: String,
    word_start: Position,
    string_start: Position,
    position: Position,
}

impl<'s, S: TokenSink> Lexer<'s, S> {
    fn new(sink: &'s mut S) -> Self {
        Self {
            sink,
            mode: Mode::Normal,
            word: String::new(),
            word_start: Position::START,
            string_start: Position::START,
            position: Position::START,
        }
    }

    fn feed(&mut self, byte: u8) -> Result<(), CompileError> {
        let at = self.position;

        match self.mode {
            Mode::Normal => self.normal(byte, at)?,
            Mode::String(escape) => self.string(byte, escape, at)?,
            Mode::LineComment => {
                if byte == b'\n' || byte == b'\r' {
                    self.mode = Mode::Normal;
                }
            }
            Mode::BlockComment { star } => {
                self.mode = match byte {
                    b'/' if star => Mode::Normal,
                    b'*' => Mode::BlockComment { star: true },
                    _ => Mode::BlockComment { star: false },
                };
            }
        }

        if byte == b'\n' {
            self.position.line += 1;
            self.position.column = 1;
        } else {
            self.position.column += 1;
        }

        Ok(())
    }

    fn normal(&mut self, byte: u8, at: Position) -> Result<(), CompileError> {
        match byte {
            b' ' | b'\t' | b'\r' | b'\n' | b'\0' => self.flush()?,

            b'"' => {
                self.flush()?;
                self.sink.begin_string(at)?;
                self.string_start = at;
                self.mode = Mode::String(Escape::None);
            }

            // The `/` buffered by the previous byte opened a comment, not a word
            b'/' if self.word.ends_with('/') => {
                self.word.pop();
                self.flush()?;
                self.mode = Mode::LineComment;
            }
            b'*' if self.word.ends_with('/') => {
                self.word.pop();
                self.flush()?;
                self.mode = Mode::BlockComment { star: false };
            }

            b':' if self.word.is_empty() => self.push(byte, at),
            b'a'..=b'z' | b'0'..=b'9' | b'_' | b'/' => self.push(byte, at),

            _ => {
                return Err(CompileError::at(
                    CompileErrorKind::InvalidCharacter(byte),
                    at,
                ));
            }
        }

        Ok(())
    }

    fn string(&mut self, byte: u8, escape: Escape, at: Position) -> Result<(), CompileError> {
        match escape {
            Escape::None => match byte {
                b'\\' => self.mode = Mode::String(Escape::Pending),
                b'"' => {
                    self.sink.end_string()?;
                    self.mode = Mode::Normal;
                }
                _ => self.sink.string_byte(byte)?,
            },

            Escape::Pending => {
                let decoded = match byte {
                    b'a' => 0x07,
                    b'b' => 0x08,
                    b'e' => 0x1b,
                    b'f' => 0x0c,
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'v' => 0x0b,
                    b'x' => {
                        self.mode = Mode::String(Escape::Hex { value: 0, digits: 0 });
                        return Ok(());
                    }
                    other => other,
                };
                self.sink.string_byte(decoded)?;
                self.mode = Mode::String(Escape::None);
            }

            Escape::Hex { value, digits } => {
                let nibble = (byte as char)
                    .to_digit(16)
                    .ok_or_else(|| CompileError::at(CompileErrorKind::InvalidEscape, at))?;
                let value = (value << 4) | nibble as u8;

                if digits == 1 {
                    self.sink.string_byte(value)?;
                    self.mode = Mode::String(Escape::None);
                } else {
                    self.mode = Mode::String(Escape::Hex { value, digits: 1 });
                }
            }
        }

        Ok(())
    }

    fn push(&mut self, byte: u8, at: Position) {
        if self.word.is_empty() {
            self.word_start = at;
        }
        self.word.push(byte as char);
    }

    fn flush(&mut self) -> Result<(), CompileError> {
        if self.word.is_empty() {
            return Ok(());
        }

        let word = std::mem::take(&mut self.word);

        // Words never span lines, so the offending column is an offset from the word's start
        if let Some(index) = word.find('/') {
            let position = Position::new(self.word_start.line, self.word_start.column + index);
            return Err(CompileError::at(
                CompileErrorKind::InvalidCharacter(b'/'),
                position,
            ));
        }

        self.sink.word(&word, self.word_start)
    }

    fn finish(mut self) -> Result<(), CompileError> {
        if let Mode::String(_) = self.mode {
            return Err(CompileError::at(
                CompileErrorKind::UnterminatedString,
                self.string_start,
            ));
        }

        self.flush()?;
        self.sink.finish(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Event {
        Word(String, Position),
        BeginString(Position),
        Byte(u8),
        EndString,
        Finish(Position),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl TokenSink for Recorder {
        fn word(&mut self, word: &str, start: Position) -> Result<(), CompileError> {
            self.events.push(Event::Word(word.to_owned(), start));
            Ok(())
        }

        fn begin_string(&mut self, start: Position) -> Result<(), CompileError> {
            self.events.push(Event::BeginString(start));
            Ok(())
        }

        fn string_byte(&mut self, byte: u8) -> Result<(), CompileError> {
            self.events.push(Event::Byte(byte));
            Ok(())
        }

        fn end_string(&mut self) -> Result<(), CompileError> {
            self.events.push(Event::EndString);
            Ok(())
        }

        fn finish(&mut self, end: Position) -> Result<(), CompileError> {
            self.events.push(Event::Finish(end));
            Ok(())
        }
    }

    fn lex(source: &str) -> Result<Vec<Event>, CompileError> {
        let mut recorder = Recorder::default();
        tokenize(source.as_bytes(), &mut recorder)?;
        Ok(recorder.events)
    }

    fn words(source: &str) -> Vec<String> {
        lex(source)
            .unwrap()
            .into_iter()
            .filter_map(|event| match event {
                Event::Word(word, _) => Some(word),
                _ => None,
            })
            .collect()
    }

    fn error_at(source: &str) -> (CompileErrorKind, Position) {
        match lex(source) {
            Err(CompileError::At { kind, position }) => (kind, position),
            other => panic!("expected a positioned error, got {other:?}"),
        }
    }

    #[test]
    fn test_words_and_positions() {
        assert_eq!(
            lex("srb 1\n  :loop\tff").unwrap(),
            vec![
                Event::Word("srb".into(), Position::new(1, 1)),
                Event::Word("1".into(), Position::new(1, 5)),
                Event::Word(":loop".into(), Position::new(2, 3)),
                Event::Word("ff".into(), Position::new(2, 9)),
                Event::Finish(Position::new(2, 11)),
            ]
        );
    }

    #[test]
    fn test_nul_is_whitespace() {
        assert_eq!(words("nop\0hlt"), ["nop", "hlt"]);
    }

    #[test]
    fn test_line_comments() {
        assert_eq!(words("nop // hlt hlt\nadd"), ["nop", "add"]);
        assert_eq!(words("nop// hlt\radd"), ["nop", "add"]);
        assert_eq!(words("// only a comment"), Vec::<String>::new());
    }

    #[test]
    fn test_block_comments() {
        assert_eq!(words("nop /* hlt\n hlt */ add"), ["nop", "add"]);
        assert_eq!(words("nop/*hlt*/add"), ["nop", "add"]);
        assert_eq!(words("a /*/ still comment */ b"), ["a", "b"]);
        assert_eq!(words("a /* ** / **/ b"), ["a", "b"]);
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            lex("\"ab\" x").unwrap(),
            vec![
                Event::BeginString(Position::new(1, 1)),
                Event::Byte(b'a'),
                Event::Byte(b'b'),
                Event::EndString,
                Event::Word("x".into(), Position::new(1, 6)),
                Event::Finish(Position::new(1, 7)),
            ]
        );
    }

    #[test]
    fn test_string_flushes_word() {
        let events = lex("nop\"\"").unwrap();
        assert_eq!(events[0], Event::Word("nop".into(), Position::new(1, 1)));
        assert_eq!(events[1], Event::BeginString(Position::new(1, 4)));
    }

    #[test]
    fn test_comment_markers_inside_strings() {
        let events = lex("\"// /* \"").unwrap();
        let bytes: Vec<u8> = events
            .into_iter()
            .filter_map(|event| match event {
                Event::Byte(byte) => Some(byte),
                _ => None,
            })
            .collect();
        assert_eq!(bytes, b"// /* ");
    }

    #[test]
    fn test_escapes() {
        let events = lex(r#""\a\b\e\f\n\r\t\v\x41\x7f\q\\\"""#).unwrap();
        let bytes: Vec<u8> = events
            .into_iter()
            .filter_map(|event| match event {
                Event::Byte(byte) => Some(byte),
                _ => None,
            })
            .collect();
        assert_eq!(
            bytes,
            [0x07, 0x08, 0x1b, 0x0c, b'\n', b'\r', b'\t', 0x0b, 0x41, 0x7f, b'q', b'\\', b'"']
        );
    }

    #[test]
    fn test_invalid_hex_escape() {
        assert_eq!(
            error_at("\"\\x4g\""),
            (CompileErrorKind::InvalidEscape, Position::new(1, 5))
        );
        assert_eq!(
            error_at("\"\\x\""),
            (CompileErrorKind::InvalidEscape, Position::new(1, 4))
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            error_at("nop\n  \"abc"),
            (CompileErrorKind::UnterminatedString, Position::new(2, 3))
        );
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            error_at("nop\nHLT"),
            (CompileErrorKind::InvalidCharacter(b'H'), Position::new(2, 1))
        );
        assert_eq!(
            error_at("ab:c"),
            (CompileErrorKind::InvalidCharacter(b':'), Position::new(1, 3))
        );
        assert_eq!(
            error_at("nop *"),
            (CompileErrorKind::InvalidCharacter(b'*'), Position::new(1, 5))
        );
    }

    #[test]
    fn test_stray_slash() {
        assert_eq!(
            error_at("  hl/t"),
            (CompileErrorKind::InvalidCharacter(b'/'), Position::new(1, 5))
        );
        assert_eq!(
            error_at("a/ b"),
            (CompileErrorKind::InvalidCharacter(b'/'), Position::new(1, 2))
        );
    }
}
