//! Indented, human-readable rendering of a parsed tree, for debugging.

use std::fmt::{self, Write};

use crate::arena::Node;
use crate::document::ValueRef;
use crate::num::number::format_number;

const INDENT: &str = "  ";

enum Task<'a> {
    Value(ValueRef<'a>, usize),
    Key(&'a [u8], usize),
    Close(char, usize),
}

pub fn dump(value: ValueRef<'_>) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_dump(&mut out, value);
    out
}

/// Writes one line per scalar, bracket and key, two spaces per level.
pub fn write_dump<W: Write>(out: &mut W, value: ValueRef<'_>) -> fmt::Result {
    let mut tasks = vec![Task::Value(value, 0)];
    while let Some(task) = tasks.pop() {
        match task {
            Task::Value(value, depth) => {
                write_indent(out, depth)?;
                match value.node() {
                    Node::Null => out.write_str("null\n")?,
                    Node::Bool(flag) => writeln!(out, "{flag}")?,
                    Node::Number(number) => writeln!(out, "{}", format_number(*number))?,
                    Node::String(_) => {
                        write_quoted(out, value.as_bytes().unwrap_or_default())?;
                        out.write_char('\n')?;
                    }
                    Node::Array(_) => {
                        out.write_str("[\n")?;
                        tasks.push(Task::Close(']', depth));
                        for item in value.items().rev() {
                            tasks.push(Task::Value(item, depth + 1));
                        }
                    }
                    Node::Object(_) => {
                        out.write_str("{\n")?;
                        tasks.push(Task::Close('}', depth));
                        for (key, item) in value.entries().rev() {
                            tasks.push(Task::Value(item, depth + 2));
                            tasks.push(Task::Key(key, depth + 1));
                        }
                    }
                }
            }
            Task::Key(key, depth) => {
                write_indent(out, depth)?;
                write_quoted(out, key)?;
                out.write_str(":\n")?;
            }
            Task::Close(bracket, depth) => {
                write_indent(out, depth)?;
                out.write_char(bracket)?;
                out.write_char('\n')?;
            }
        }
    }
    Ok(())
}

fn write_indent<W: Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_str(INDENT)?;
    }
    Ok(())
}

fn write_quoted<W: Write>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    out.write_char('"')?;
    out.write_str(&String::from_utf8_lossy(bytes))?;
    out.write_char('"')
}
