//! Exactly sized stores backing one parsed document.
//!
//! The three regions (value nodes, object entries, decoded string bytes) are
//! reserved once from the counts of the first pass and then only ever appended
//! to, so each region behaves as a forward-only bump cursor. Handles are plain
//! indices into those regions.

use std::mem::size_of;

use crate::count::Stats;
use crate::constants::STRING_TERMINATOR;
use crate::{Error, ParseOptions, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Decoded bytes in the string region. The terminator sits at `start + len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub const EMPTY: Span = Span { start: 0, len: 0 };

    pub fn end(self) -> usize {
        self.start + self.len
    }
}

/// A contiguous run of records in the node or entry region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRange {
    pub start: usize,
    pub len: usize,
}

impl NodeRange {
    pub fn end(self) -> usize {
        self.start + self.len
    }

    pub fn indices(self) -> std::ops::Range<usize> {
        self.start..self.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(f64),
    String(Span),
    /// Elements occupy `range` in the node region, one unbroken run.
    Array(NodeRange),
    /// Entries occupy `range` in the entry region.
    Object(NodeRange),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Bool(_) => NodeKind::Bool,
            Node::Number(_) => NodeKind::Number,
            Node::String(_) => NodeKind::String,
            Node::Array(_) => NodeKind::Array,
            Node::Object(_) => NodeKind::Object,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub key: Span,
    pub value: NodeId,
}

impl Entry {
    const VACANT: Entry = Entry {
        key: Span::EMPTY,
        value: NodeId(0),
    };
}

#[derive(Debug)]
pub struct Arena {
    nodes: Vec<Node>,
    entries: Vec<Entry>,
    strings: Vec<u8>,
    reserved: Stats,
}

impl Arena {
    /// Total bytes needed for a document with the given counts, or `None` on overflow.
    pub fn byte_size(stats: &Stats) -> Option<usize> {
        let nodes = stats.nodes.checked_mul(size_of::<Node>())?;
        let entries = stats.entries.checked_mul(size_of::<Entry>())?;
        nodes.checked_add(entries)?.checked_add(stats.string_bytes)
    }

    pub fn with_stats(stats: &Stats, options: &ParseOptions) -> Result<Self> {
        let requested = Self::byte_size(stats).ok_or(Error::allocation(usize::MAX))?;
        if options.max_arena_bytes.is_some_and(|limit| requested > limit) {
            return Err(Error::allocation(requested));
        }
        let mut nodes = Vec::new();
        let mut entries = Vec::new();
        let mut strings = Vec::new();
        nodes
            .try_reserve_exact(stats.nodes)
            .map_err(|_| Error::allocation(requested))?;
        entries
            .try_reserve_exact(stats.entries)
            .map_err(|_| Error::allocation(requested))?;
        strings
            .try_reserve_exact(stats.string_bytes)
            .map_err(|_| Error::allocation(requested))?;
        Ok(Self {
            nodes,
            entries,
            strings,
            reserved: *stats,
        })
    }

    pub(crate) fn reserve_node(&mut self) -> NodeId {
        debug_assert!(self.nodes.len() < self.reserved.nodes, "node region exhausted");
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::Null);
        id
    }

    pub(crate) fn reserve_nodes(&mut self, count: usize) -> NodeRange {
        debug_assert!(
            self.nodes.len() + count <= self.reserved.nodes,
            "node region exhausted"
        );
        let start = self.nodes.len();
        self.nodes.resize(start + count, Node::Null);
        NodeRange { start, len: count }
    }

    pub(crate) fn reserve_entries(&mut self, count: usize) -> NodeRange {
        debug_assert!(
            self.entries.len() + count <= self.reserved.entries,
            "entry region exhausted"
        );
        let start = self.entries.len();
        self.entries.resize(start + count, Entry::VACANT);
        NodeRange { start, len: count }
    }

    pub(crate) fn set_node(&mut self, id: NodeId, node: Node) {
        self.nodes[id.0] = node;
    }

    pub(crate) fn set_entry(&mut self, index: usize, entry: Entry) {
        self.entries[index] = entry;
    }

    /// Appends decoded bytes through `fill`, then the terminator.
    pub(crate) fn push_string(&mut self, fill: impl FnOnce(&mut Vec<u8>)) -> Span {
        let start = self.strings.len();
        fill(&mut self.strings);
        let len = self.strings.len() - start;
        self.strings.push(STRING_TERMINATOR);
        debug_assert!(
            self.strings.len() <= self.reserved.string_bytes,
            "string region exhausted"
        );
        Span { start, len }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_in(&self, range: NodeRange) -> &[Entry] {
        &self.entries[range.indices()]
    }

    pub fn strings(&self) -> &[u8] {
        &self.strings
    }

    pub fn str_bytes(&self, span: Span) -> &[u8] {
        &self.strings[span.start..span.end()]
    }

    /// Decoded bytes followed by their terminator.
    pub fn str_bytes_with_terminator(&self, span: Span) -> &[u8] {
        &self.strings[span.start..=span.end()]
    }

    /// Counts actually consumed so far.
    pub fn used(&self) -> Stats {
        Stats {
            nodes: self.nodes.len(),
            entries: self.entries.len(),
            string_bytes: self.strings.len(),
        }
    }

    pub fn reserved(&self) -> Stats {
        self.reserved
    }

    pub fn byte_len(&self) -> usize {
        Self::byte_size(&self.used()).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(nodes: usize, entries: usize, string_bytes: usize) -> Stats {
        Stats {
            nodes,
            entries,
            string_bytes,
        }
    }

    #[rstest::rstest]
    fn byte_size_sums_regions() {
        let expected = 3 * size_of::<Node>() + 2 * size_of::<Entry>() + 7;
        assert_eq!(Arena::byte_size(&stats(3, 2, 7)), Some(expected));
    }

    #[rstest::rstest]
    fn byte_size_detects_overflow() {
        assert_eq!(Arena::byte_size(&stats(usize::MAX, 0, 0)), None);
    }

    #[rstest::rstest]
    fn limit_rejects_oversized_arena() {
        let options = ParseOptions::default().with_max_arena_bytes(Some(8));
        let err = Arena::with_stats(&stats(4, 0, 0), &options).expect_err("over limit");
        assert_eq!(
            err.kind,
            crate::ErrorKind::AllocationFailure {
                requested: 4 * size_of::<Node>()
            }
        );
    }

    #[rstest::rstest]
    fn reservations_bump_forward() {
        let mut arena =
            Arena::with_stats(&stats(4, 1, 3), &ParseOptions::default()).expect("arena");
        let root = arena.reserve_node();
        let run = arena.reserve_nodes(2);
        let single = arena.reserve_node();
        assert_eq!(root.index(), 0);
        assert_eq!(run, NodeRange { start: 1, len: 2 });
        assert_eq!(single.index(), 3);

        let entries = arena.reserve_entries(1);
        assert_eq!(entries, NodeRange { start: 0, len: 1 });

        let span = arena.push_string(|out| out.extend_from_slice(b"ab"));
        assert_eq!(span, Span { start: 0, len: 2 });
        assert_eq!(arena.str_bytes(span), b"ab");
        assert_eq!(arena.str_bytes_with_terminator(span), b"ab\0");
        assert_eq!(arena.used(), arena.reserved());
    }
}
