use std::fmt;
use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::arena::{Arena, Entry, Node, NodeId, NodeKind};
use crate::count::Stats;

/// A parsed tree together with the arena that owns every node, entry and string in it.
#[derive(Debug)]
pub struct Document {
    arena: Arena,
}

impl Document {
    pub(crate) fn new(arena: Arena) -> Self {
        Self { arena }
    }

    pub fn root(&self) -> ValueRef<'_> {
        ValueRef {
            arena: &self.arena,
            id: NodeId(0),
        }
    }

    pub fn value(&self, id: NodeId) -> Option<ValueRef<'_>> {
        (id.0 < self.arena.nodes().len()).then_some(ValueRef {
            arena: &self.arena,
            id,
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.nodes().get(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        self.arena.nodes()
    }

    pub fn entries(&self) -> &[Entry] {
        self.arena.entries()
    }

    /// Every decoded string, each followed by a zero terminator, in fill order.
    pub fn string_region(&self) -> &[u8] {
        self.arena.strings()
    }

    pub fn stats(&self) -> Stats {
        self.arena.used()
    }

    pub fn arena_bytes(&self) -> usize {
        self.arena.byte_len()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Indented debug rendering of the whole tree. See [`crate::dump::dump`].
    pub fn dump(&self) -> String {
        crate::dump::dump(self.root())
    }

    /// Releases the whole arena in one step.
    pub fn release(self) {
        tracing::trace!(bytes = self.arena_bytes(), "releasing document arena");
        drop(self);
    }
}

/// A borrowed view of one value inside a [`Document`].
#[derive(Clone, Copy)]
pub struct ValueRef<'a> {
    arena: &'a Arena,
    id: NodeId,
}

impl<'a> ValueRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &'a Node {
        self.arena.node(self.id)
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    pub fn is_null(&self) -> bool {
        matches!(self.node(), Node::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.node() {
            Node::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.node() {
            Node::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Decoded string bytes, terminator excluded.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self.node() {
            Node::String(span) => Some(self.arena.str_bytes(*span)),
            _ => None,
        }
    }

    /// Decoded string bytes including the trailing zero terminator.
    pub fn as_c_bytes(&self) -> Option<&'a [u8]> {
        match self.node() {
            Node::String(span) => Some(self.arena.str_bytes_with_terminator(*span)),
            _ => None,
        }
    }

    /// The string as UTF-8, if it is a string and its bytes are valid UTF-8.
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.as_bytes()?).ok()
    }

    /// Element count for arrays, entry count for objects, byte length for strings.
    pub fn len(&self) -> usize {
        match self.node() {
            Node::Array(range) | Node::Object(range) => range.len,
            Node::String(span) => span.len,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> Items<'a> {
        let range = match self.node() {
            Node::Array(range) => range.indices(),
            _ => 0..0,
        };
        Items {
            arena: self.arena,
            range,
        }
    }

    pub fn entries(&self) -> Entries<'a> {
        let entries: &'a [Entry] = match self.node() {
            Node::Object(range) => self.arena.entries_in(*range),
            _ => &[],
        };
        Entries {
            arena: self.arena,
            entries: entries.iter(),
        }
    }

    pub fn get(&self, index: usize) -> Option<ValueRef<'a>> {
        match self.node() {
            Node::Array(range) if index < range.len => Some(ValueRef {
                arena: self.arena,
                id: NodeId(range.start + index),
            }),
            _ => None,
        }
    }

    /// First entry whose key equals `key`.
    pub fn get_key(&self, key: &str) -> Option<ValueRef<'a>> {
        self.entries()
            .find(|(name, _)| *name == key.as_bytes())
            .map(|(_, value)| value)
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueRef")
            .field("id", &self.id)
            .field("node", self.node())
            .finish()
    }
}

/// Structural equality: same shapes, keys in the same order, equal scalars.
impl PartialEq for ValueRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: SmallVec<[(Self, Self); 16]> = SmallVec::new();
        pending.push((*self, *other));
        while let Some((left, right)) = pending.pop() {
            match (left.node(), right.node()) {
                (Node::Null, Node::Null) => {}
                (Node::Bool(a), Node::Bool(b)) if a == b => {}
                (Node::Number(a), Node::Number(b)) if a == b => {}
                (Node::String(_), Node::String(_)) if left.as_bytes() == right.as_bytes() => {}
                (Node::Array(a), Node::Array(b)) if a.len == b.len => {
                    pending.extend(left.items().zip(right.items()));
                }
                (Node::Object(a), Node::Object(b)) if a.len == b.len => {
                    for ((left_key, left_value), (right_key, right_value)) in
                        left.entries().zip(right.entries())
                    {
                        if left_key != right_key {
                            return false;
                        }
                        pending.push((left_value, right_value));
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

/// Array elements in source order. Their ids are consecutive.
#[derive(Debug, Clone)]
pub struct Items<'a> {
    arena: &'a Arena,
    range: std::ops::Range<usize>,
}

impl<'a> Iterator for Items<'a> {
    type Item = ValueRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.range.next()?;
        Some(ValueRef {
            arena: self.arena,
            id: NodeId(index),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for Items<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = self.range.next_back()?;
        Some(ValueRef {
            arena: self.arena,
            id: NodeId(index),
        })
    }
}

impl ExactSizeIterator for Items<'_> {}

impl FusedIterator for Items<'_> {}

/// Object entries in source order as `(key bytes, value)`.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    arena: &'a Arena,
    entries: std::slice::Iter<'a, Entry>,
}

impl<'a> Entries<'a> {
    fn pair(&self, entry: &Entry) -> (&'a [u8], ValueRef<'a>) {
        (
            self.arena.str_bytes(entry.key),
            ValueRef {
                arena: self.arena,
                id: entry.value,
            },
        )
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a [u8], ValueRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(self.pair(entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl DoubleEndedIterator for Entries<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next_back()?;
        Some(self.pair(entry))
    }
}

impl ExactSizeIterator for Entries<'_> {}

impl FusedIterator for Entries<'_> {}
