pub const KEYWORDS: &[&[u8]] = &[b"null", b"true", b"false"];

pub const DEFAULT_MAX_DEPTH: usize = 256;

pub(crate) const STRING_TERMINATOR: u8 = 0;

#[inline]
pub fn is_whitespace_byte(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
pub fn is_number_byte(byte: u8) -> bool {
    matches!(byte, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')
}
