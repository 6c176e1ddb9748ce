use std::fmt;

use memchr::memchr_iter;

/// What the parser was looking for when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Value,
    ObjectKey,
    ObjectKeyOrEnd,
    Colon,
    CommaOrObjectEnd,
    CommaOrArrayEnd,
    EscapeSequence,
    HexDigit,
    LowSurrogate,
    Number,
    EndOfInput,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Expected::Value => "a value",
            Expected::ObjectKey => "an object key",
            Expected::ObjectKeyOrEnd => "an object key or '}'",
            Expected::Colon => "':'",
            Expected::CommaOrObjectEnd => "',' or '}'",
            Expected::CommaOrArrayEnd => "',' or ']'",
            Expected::EscapeSequence => "a valid escape sequence",
            Expected::HexDigit => "a hexadecimal digit",
            Expected::LowSurrogate => "a low surrogate escape",
            Expected::Number => "a valid number",
            Expected::EndOfInput => "end of input",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("expected {expected}, found {}", describe_found(.found))]
    UnexpectedToken {
        expected: Expected,
        found: Option<u8>,
    },
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
    #[error("arena allocation of {requested} bytes failed")]
    AllocationFailure { requested: usize },
}

fn describe_found(found: &Option<u8>) -> String {
    match *found {
        Some(byte) if byte.is_ascii_graphic() => format!("'{}'", byte as char),
        Some(byte) => format!("byte 0x{byte:02x}"),
        None => "end of input".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Resolves a byte offset into a 1-based line and byte column.
    pub fn from_offset(input: &[u8], offset: usize) -> Self {
        let offset = offset.min(input.len());
        let head = &input[..offset];
        let mut line = 1;
        let mut line_start = 0;
        for idx in memchr_iter(b'\n', head) {
            line += 1;
            line_start = idx + 1;
        }
        Self {
            offset,
            line,
            column: offset - line_start + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub location: Option<Location>,
}

impl Error {
    pub fn syntax(kind: ErrorKind, input: &[u8], offset: usize) -> Self {
        Self {
            kind,
            location: Some(Location::from_offset(input, offset)),
        }
    }

    pub fn unexpected(expected: Expected, input: &[u8], offset: usize) -> Self {
        let found = input.get(offset).copied();
        let kind = match found {
            Some(_) => ErrorKind::UnexpectedToken { expected, found },
            None => ErrorKind::UnexpectedEndOfInput,
        };
        Self::syntax(kind, input, offset)
    }

    pub fn allocation(requested: usize) -> Self {
        Self {
            kind: ErrorKind::AllocationFailure { requested },
            location: None,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn offset(&self) -> Option<usize> {
        self.location.map(|location| location.offset)
    }

    pub fn is_syntax(&self) -> bool {
        !matches!(self.kind, ErrorKind::AllocationFailure { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(
                f,
                "{} at line {}, column {} (byte {})",
                self.kind, location.line, location.column, location.offset
            ),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {}
