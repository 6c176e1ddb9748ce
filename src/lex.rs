//! Lexical helpers shared by the counting and building passes.
//!
//! Both passes drive the same [`Cursor`], so whitespace, comment, string and
//! number boundaries are decided by one rule set. The counting pass uses the
//! checked methods; the building pass uses the `*_validated` variants, which
//! assume the bytes already passed the counter.

use memchr::{memchr, memchr2, memmem};

use crate::constants::{is_number_byte, is_whitespace_byte, KEYWORDS};
use crate::error::{ErrorKind, Expected};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Null,
    True,
    False,
}

impl Literal {
    fn from_keyword(keyword: &[u8]) -> Option<Self> {
        match keyword {
            b"null" => Some(Literal::Null),
            b"true" => Some(Literal::True),
            b"false" => Some(Literal::False),
            _ => None,
        }
    }
}

/// A single decoded escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    Byte(u8),
    Char(char),
}

impl Escape {
    fn decoded_len(self) -> usize {
        match self {
            Escape::Byte(_) => 1,
            Escape::Char(ch) => ch.len_utf8(),
        }
    }

    fn write_into(self, out: &mut Vec<u8>) {
        match self {
            Escape::Byte(byte) => out.push(byte),
            Escape::Char(ch) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscapeError {
    /// Input ended inside the escape.
    Truncated,
    Invalid(Expected, usize),
}

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    comments: bool,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a [u8], comments: bool) -> Self {
        Self {
            input,
            pos: 0,
            comments,
        }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    pub fn bump(&mut self) {
        self.pos = (self.pos + 1).min(self.input.len());
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn error(&self, expected: Expected) -> Error {
        Error::unexpected(expected, self.input, self.pos)
    }

    /// Skips whitespace and, when enabled, `//` and `/* */` comments.
    pub fn skip_trivia(&mut self) -> Result<()> {
        let bytes = self.input;
        while let Some(&byte) = bytes.get(self.pos) {
            if is_whitespace_byte(byte) {
                self.pos += 1;
                continue;
            }
            if byte != b'/' || !self.comments {
                return Ok(());
            }
            match bytes.get(self.pos + 1) {
                Some(b'/') => {
                    let body = self.pos + 2;
                    self.pos = match memchr(b'\n', &bytes[body..]) {
                        Some(offset) => body + offset + 1,
                        None => bytes.len(),
                    };
                }
                Some(b'*') => {
                    let start = self.pos;
                    let body = start + 2;
                    match memmem::find(&bytes[body..], b"*/") {
                        Some(offset) => self.pos = body + offset + 2,
                        None => {
                            self.pos = bytes.len();
                            return Err(Error::syntax(
                                ErrorKind::UnterminatedComment,
                                bytes,
                                start,
                            ));
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
        Ok(())
    }

    pub fn skip_trivia_validated(&mut self) {
        // An unterminated comment leaves the cursor at end of input, which is all
        // the building pass needs.
        let _ = self.skip_trivia();
    }

    pub fn literal(&mut self) -> Option<Literal> {
        let rest = &self.input[self.pos..];
        let keyword = KEYWORDS.iter().find(|keyword| rest.starts_with(keyword))?;
        self.pos += keyword.len();
        Literal::from_keyword(keyword)
    }

    fn number_end(&self) -> usize {
        let bytes = self.input;
        let mut end = self.pos;
        while end < bytes.len() && is_number_byte(bytes[end]) {
            end += 1;
        }
        end
    }

    /// Consumes the maximal run of number bytes and checks that it decodes.
    pub fn scan_number(&mut self) -> Result<()> {
        let start = self.pos;
        let end = self.number_end();
        if decode_number_run(&self.input[start..end]).is_none() {
            return Err(Error::syntax(
                ErrorKind::UnexpectedToken {
                    expected: Expected::Number,
                    found: self.input.get(start).copied(),
                },
                self.input,
                start,
            ));
        }
        self.pos = end;
        Ok(())
    }

    pub fn decode_number_validated(&mut self) -> f64 {
        let start = self.pos;
        let end = self.number_end();
        self.pos = end;
        let value = decode_number_run(&self.input[start..end]);
        debug_assert!(value.is_some(), "number run was not validated");
        value.unwrap_or(f64::NAN)
    }

    /// Consumes a quoted string starting at the opening quote and returns the
    /// number of bytes its decoded form occupies, terminator excluded.
    pub fn scan_string(&mut self) -> Result<usize> {
        let bytes = self.input;
        let open = self.pos;
        let mut idx = open + 1;
        let mut decoded = 0;
        loop {
            let Some(offset) = memchr2(b'\\', b'"', &bytes[idx.min(bytes.len())..]) else {
                self.pos = bytes.len();
                return Err(Error::syntax(ErrorKind::UnterminatedString, bytes, open));
            };
            let hit = idx + offset;
            decoded += offset;
            if bytes[hit] == b'"' {
                self.pos = hit + 1;
                return Ok(decoded);
            }
            match read_escape(bytes, hit) {
                Ok((escape, next)) => {
                    decoded += escape.decoded_len();
                    idx = next;
                }
                Err(EscapeError::Truncated) => {
                    self.pos = bytes.len();
                    return Err(Error::syntax(ErrorKind::UnterminatedString, bytes, open));
                }
                Err(EscapeError::Invalid(expected, at)) => {
                    self.pos = at;
                    return Err(Error::unexpected(expected, bytes, at));
                }
            }
        }
    }

    /// Appends the decoded bytes of a validated string to `out`.
    pub fn decode_string_validated(&mut self, out: &mut Vec<u8>) {
        let bytes = self.input;
        let mut idx = self.pos + 1;
        while idx < bytes.len() {
            let Some(offset) = memchr2(b'\\', b'"', &bytes[idx..]) else {
                out.extend_from_slice(&bytes[idx..]);
                idx = bytes.len();
                break;
            };
            let hit = idx + offset;
            out.extend_from_slice(&bytes[idx..hit]);
            if bytes[hit] == b'"' {
                idx = hit + 1;
                break;
            }
            match read_escape(bytes, hit) {
                Ok((escape, next)) => {
                    escape.write_into(out);
                    idx = next;
                }
                Err(_) => {
                    idx = bytes.len();
                    break;
                }
            }
        }
        self.pos = idx;
    }

    fn skip_string_validated(&mut self) {
        let bytes = self.input;
        let mut idx = self.pos + 1;
        while let Some(offset) = memchr2(b'\\', b'"', &bytes[idx.min(bytes.len())..]) {
            let hit = idx + offset;
            if bytes[hit] == b'"' {
                self.pos = hit + 1;
                return;
            }
            idx = hit + 2;
        }
        self.pos = bytes.len();
    }

    /// Counts the immediate children of the container whose opening bracket was
    /// just consumed, without moving this cursor.
    ///
    /// Nested containers, strings and comments are skipped over; only commas at
    /// depth zero separate children.
    pub fn count_children(&self) -> usize {
        let mut probe = *self;
        probe.skip_trivia_validated();
        match probe.peek() {
            None | Some(b'}') | Some(b']') => return 0,
            Some(_) => {}
        }
        let mut count = 1;
        let mut depth = 0usize;
        while let Some(byte) = probe.peek() {
            match byte {
                b'"' => {
                    probe.skip_string_validated();
                    continue;
                }
                b'/' if probe.comments => {
                    let before = probe.pos;
                    probe.skip_trivia_validated();
                    if probe.pos == before {
                        probe.bump();
                    }
                    continue;
                }
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                b',' if depth == 0 => count += 1,
                _ => {}
            }
            probe.bump();
        }
        count
    }
}

fn decode_number_run(run: &[u8]) -> Option<f64> {
    std::str::from_utf8(run).ok()?.parse::<f64>().ok()
}

/// Reads the escape whose backslash sits at `backslash`, returning the escape
/// and the offset just past it.
fn read_escape(bytes: &[u8], backslash: usize) -> std::result::Result<(Escape, usize), EscapeError> {
    let at = backslash + 1;
    let Some(&marker) = bytes.get(at) else {
        return Err(EscapeError::Truncated);
    };
    let byte = match marker {
        b'"' => b'"',
        b'\\' => b'\\',
        b'/' => b'/',
        b'b' => 0x08,
        b'f' => 0x0c,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'u' => return read_unicode_escape(bytes, backslash),
        _ => return Err(EscapeError::Invalid(Expected::EscapeSequence, at)),
    };
    Ok((Escape::Byte(byte), at + 1))
}

fn read_unicode_escape(
    bytes: &[u8],
    backslash: usize,
) -> std::result::Result<(Escape, usize), EscapeError> {
    let high = read_hex4(bytes, backslash + 2)?;
    let mut next = backslash + 6;
    let code = match high {
        0xD800..=0xDBFF => {
            match (bytes.get(next), bytes.get(next + 1)) {
                (Some(b'\\'), Some(b'u')) => {}
                (None, _) | (Some(b'\\'), None) => return Err(EscapeError::Truncated),
                _ => return Err(EscapeError::Invalid(Expected::LowSurrogate, next)),
            }
            let low = read_hex4(bytes, next + 2)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(EscapeError::Invalid(Expected::LowSurrogate, next));
            }
            next += 6;
            0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
        }
        0xDC00..=0xDFFF => {
            return Err(EscapeError::Invalid(Expected::EscapeSequence, backslash + 1))
        }
        _ => u32::from(high),
    };
    let ch = char::from_u32(code)
        .ok_or(EscapeError::Invalid(Expected::EscapeSequence, backslash + 1))?;
    Ok((Escape::Char(ch), next))
}

fn read_hex4(bytes: &[u8], start: usize) -> std::result::Result<u16, EscapeError> {
    let mut value: u16 = 0;
    for idx in start..start + 4 {
        let Some(&byte) = bytes.get(idx) else {
            return Err(EscapeError::Truncated);
        };
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(EscapeError::Invalid(Expected::HexDigit, idx)),
        };
        value = (value << 4) | u16::from(digit);
    }
    Ok(value)
}
