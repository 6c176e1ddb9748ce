//! First pass: validate the input and count exactly what the arena must hold.

use smallvec::SmallVec;

use crate::error::{ErrorKind, Expected};
use crate::lex::Cursor;
use crate::{Error, ParseOptions, Result};

/// Exact sizes of the three arena regions for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// One per value, containers included.
    pub nodes: usize,
    /// One per object key/value pair.
    pub entries: usize,
    /// Decoded string and key bytes, plus one terminator per string.
    pub string_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

pub fn count(input: &[u8], options: &ParseOptions) -> Result<Stats> {
    let mut counter = Counter {
        cursor: Cursor::new(input, options.comments),
        stats: Stats::default(),
    };
    counter.run(options.max_depth)?;
    Ok(counter.stats)
}

struct Counter<'a> {
    cursor: Cursor<'a>,
    stats: Stats,
}

impl Counter<'_> {
    fn run(&mut self, max_depth: usize) -> Result<()> {
        let mut open: SmallVec<[Container; 32]> = SmallVec::new();

        'value: loop {
            self.cursor.skip_trivia()?;
            let Some(byte) = self.cursor.peek() else {
                return Err(self.cursor.error(Expected::Value));
            };
            self.stats.nodes += 1;

            match byte {
                b'{' | b'[' => {
                    if open.len() >= max_depth {
                        return Err(Error::syntax(
                            ErrorKind::NestingTooDeep { limit: max_depth },
                            self.cursor.input(),
                            self.cursor.pos(),
                        ));
                    }
                    self.cursor.bump();
                    self.cursor.skip_trivia()?;
                    let close = if byte == b'{' { b'}' } else { b']' };
                    if self.cursor.peek() == Some(close) {
                        self.cursor.bump();
                    } else if byte == b'{' {
                        if self.cursor.peek() != Some(b'"') {
                            return Err(self.cursor.error(Expected::ObjectKeyOrEnd));
                        }
                        open.push(Container::Object);
                        self.key()?;
                        continue 'value;
                    } else {
                        open.push(Container::Array);
                        continue 'value;
                    }
                }
                b'"' => {
                    self.string()?;
                }
                b'-' | b'0'..=b'9' => self.cursor.scan_number()?,
                _ => {
                    if self.cursor.literal().is_none() {
                        return Err(self.cursor.error(Expected::Value));
                    }
                }
            }

            // A value just ended: close every container it completes, then
            // either start the next sibling or finish.
            loop {
                self.cursor.skip_trivia()?;
                let Some(&container) = open.last() else {
                    break 'value;
                };
                match (container, self.cursor.peek()) {
                    (Container::Array, Some(b',')) => {
                        self.cursor.bump();
                        continue 'value;
                    }
                    (Container::Array, Some(b']')) | (Container::Object, Some(b'}')) => {
                        self.cursor.bump();
                        open.pop();
                    }
                    (Container::Object, Some(b',')) => {
                        self.cursor.bump();
                        self.cursor.skip_trivia()?;
                        if self.cursor.peek() != Some(b'"') {
                            return Err(self.cursor.error(Expected::ObjectKey));
                        }
                        self.key()?;
                        continue 'value;
                    }
                    (Container::Array, _) => {
                        return Err(self.cursor.error(Expected::CommaOrArrayEnd));
                    }
                    (Container::Object, _) => {
                        return Err(self.cursor.error(Expected::CommaOrObjectEnd));
                    }
                }
            }
        }

        if !self.cursor.is_eof() {
            return Err(self.cursor.error(Expected::EndOfInput));
        }
        Ok(())
    }

    fn string(&mut self) -> Result<()> {
        let decoded = self.cursor.scan_string()?;
        self.stats.string_bytes += decoded + 1;
        Ok(())
    }

    /// Consumes `"key" :` and records the entry its value will fill.
    fn key(&mut self) -> Result<()> {
        self.string()?;
        self.cursor.skip_trivia()?;
        if self.cursor.peek() != Some(b':') {
            return Err(self.cursor.error(Expected::Colon));
        }
        self.cursor.bump();
        self.stats.entries += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stats(nodes: usize, entries: usize, string_bytes: usize) -> Stats {
        Stats {
            nodes,
            entries,
            string_bytes,
        }
    }

    fn count_default(input: &str) -> Result<Stats> {
        count(input.as_bytes(), &ParseOptions::default())
    }

    #[rstest]
    #[case("null", stats(1, 0, 0))]
    #[case("3.14", stats(1, 0, 0))]
    #[case("\"ab\\tc\"", stats(1, 0, 5))]
    #[case("[]", stats(1, 0, 0))]
    #[case("{}", stats(1, 0, 0))]
    #[case("{\"a\":1,\"b\":[2,3]}", stats(5, 2, 4))]
    #[case("[[1,2],[3,4]]", stats(7, 0, 0))]
    #[case("// note\n{\"x\": true}", stats(2, 1, 2))]
    #[case("{\"k\": {\"n\": null, \"s\": \"\"}}", stats(4, 3, 7))]
    #[case("[\"\\u00e9\", \"\\u20ac\", \"\\ud83d\\ude00\"]", stats(4, 0, 12))]
    #[case(" /* lead */ [ true , false ] // trail", stats(3, 0, 0))]
    fn counts_are_exact(#[case] input: &str, #[case] expected: Stats) {
        let actual = count_default(input).unwrap_or_else(|err| panic!("count failed: {err}"));
        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case("", ErrorKind::UnexpectedEndOfInput, 0)]
    #[case("   ", ErrorKind::UnexpectedEndOfInput, 3)]
    #[case("[1,", ErrorKind::UnexpectedEndOfInput, 3)]
    #[case(
        "{\"a\": }",
        ErrorKind::UnexpectedToken { expected: Expected::Value, found: Some(b'}') },
        6
    )]
    #[case(
        "{\"a\" 1}",
        ErrorKind::UnexpectedToken { expected: Expected::Colon, found: Some(b'1') },
        5
    )]
    #[case(
        "{a: 1}",
        ErrorKind::UnexpectedToken { expected: Expected::ObjectKeyOrEnd, found: Some(b'a') },
        1
    )]
    #[case(
        "{\"a\": 1,}",
        ErrorKind::UnexpectedToken { expected: Expected::ObjectKey, found: Some(b'}') },
        8
    )]
    #[case(
        "[1,]",
        ErrorKind::UnexpectedToken { expected: Expected::Value, found: Some(b']') },
        3
    )]
    #[case(
        "[1 2]",
        ErrorKind::UnexpectedToken { expected: Expected::CommaOrArrayEnd, found: Some(b'2') },
        3
    )]
    #[case(
        "{\"a\": 1 \"b\": 2}",
        ErrorKind::UnexpectedToken { expected: Expected::CommaOrObjectEnd, found: Some(b'"') },
        8
    )]
    #[case(
        "[1] 2",
        ErrorKind::UnexpectedToken { expected: Expected::EndOfInput, found: Some(b'2') },
        4
    )]
    #[case(
        "tru",
        ErrorKind::UnexpectedToken { expected: Expected::Value, found: Some(b't') },
        0
    )]
    #[case(
        "[-]",
        ErrorKind::UnexpectedToken { expected: Expected::Number, found: Some(b'-') },
        1
    )]
    #[case("[\"open", ErrorKind::UnterminatedString, 1)]
    #[case("[1 /* open", ErrorKind::UnterminatedComment, 3)]
    fn errors_identify_kind_and_offset(
        #[case] input: &str,
        #[case] kind: ErrorKind,
        #[case] offset: usize,
    ) {
        let err = count_default(input).expect_err("input should be rejected");
        assert_eq!(err.kind, kind);
        assert_eq!(err.offset(), Some(offset));
    }

    #[rstest]
    fn depth_limit_is_enforced() {
        let input = format!("{}{}", "[".repeat(5), "]".repeat(5));
        let options = ParseOptions::default().with_max_depth(4);
        let err = count(input.as_bytes(), &options).expect_err("too deep");
        assert_eq!(err.kind, ErrorKind::NestingTooDeep { limit: 4 });
        assert_eq!(err.offset(), Some(4));

        let options = ParseOptions::default().with_max_depth(5);
        assert_eq!(count(input.as_bytes(), &options).expect("fits").nodes, 5);
    }

    #[rstest]
    fn deep_nesting_does_not_recurse() {
        let depth = 200_000;
        let input = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let options = ParseOptions::default().with_max_depth(depth);
        let stats = count(input.as_bytes(), &options).expect("deep input");
        assert_eq!(stats.nodes, depth);
    }

    #[rstest]
    fn comments_can_be_disabled() {
        let options = ParseOptions::default().with_comments(false);
        let err = count(b"// x\n1", &options).expect_err("comments off");
        assert_eq!(
            err.kind,
            ErrorKind::UnexpectedToken {
                expected: Expected::Value,
                found: Some(b'/')
            }
        );
        assert!(count(b" 1 ", &options).is_ok());
    }
}
