//! A two-pass parser for JSON with `//` and `/* */` comments.
//!
//! The first pass validates the input and counts exactly how many value nodes,
//! object entries and decoded string bytes the tree needs. The second pass
//! reserves stores of exactly that size and fills them without ever growing
//! them. Array elements always occupy one unbroken run of node slots.
//!
//! ```
//! let doc = jsonc_arena::parse(br#"{"a": 1, "b": [2, 3]} // trailing note"#)?;
//! let b = doc.root().get_key("b").expect("key b");
//! let ids: Vec<usize> = b.items().map(|item| item.id().index()).collect();
//! assert_eq!(ids[1], ids[0] + 1);
//! doc.release();
//! # Ok::<(), jsonc_arena::Error>(())
//! ```

pub mod arena;
pub mod build;
pub mod constants;
pub mod count;
pub mod document;
pub mod dump;
pub mod error;
pub mod lex;
pub mod num;
pub mod options;
pub mod parallel;

pub use crate::arena::{Entry, Node, NodeId, NodeKind, NodeRange, Span};
pub use crate::count::Stats;
pub use crate::document::{Document, Entries, Items, ValueRef};
pub use crate::error::{Error, ErrorKind, Expected, Location};
pub use crate::options::ParseOptions;
pub use crate::parallel::parse_many;

pub type Result<T> = std::result::Result<T, Error>;

pub fn parse(input: &[u8]) -> Result<Document> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_str(input: &str) -> Result<Document> {
    parse(input.as_bytes())
}

pub fn parse_with_options(input: &[u8], options: &ParseOptions) -> Result<Document> {
    let stats = count_with_options(input, options)?;
    let arena = build::build(input, &stats, options).inspect_err(|err| {
        tracing::debug!(error = %err, "arena allocation failed");
    })?;
    tracing::debug!(
        nodes = stats.nodes,
        entries = stats.entries,
        string_bytes = stats.string_bytes,
        arena_bytes = arena.byte_len(),
        "document built"
    );
    Ok(Document::new(arena))
}

pub fn count(input: &[u8]) -> Result<Stats> {
    count_with_options(input, &ParseOptions::default())
}

pub fn count_with_options(input: &[u8], options: &ParseOptions) -> Result<Stats> {
    tracing::trace!(len = input.len(), "counting input");
    count::count(input, options).inspect_err(|err| {
        tracing::debug!(error = %err, "input rejected");
    })
}

pub fn validate(input: &[u8]) -> Result<()> {
    count(input).map(|_| ())
}
