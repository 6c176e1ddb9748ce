//! Second pass: populate an exactly sized arena from input the counter accepted.
//!
//! Every slot is reserved by whoever discovers the value, then filled. Arrays
//! reserve all element slots as one run before filling the first element, so
//! siblings stay adjacent even though their descendants are appended later.
//! Objects reserve their entry records up front but reserve each value slot
//! only right before filling it.

use smallvec::SmallVec;

use crate::arena::{Arena, Entry, Node, NodeId, NodeRange};
use crate::count::Stats;
use crate::lex::{Cursor, Literal};
use crate::{ParseOptions, Result};

#[derive(Debug, Clone, Copy)]
enum Frame {
    Array { items: NodeRange, next: usize },
    Object { entries: NodeRange, next: usize },
}

/// Builds the tree for `input`, which must be the exact buffer `stats` was
/// counted from. The only failure is allocating the arena.
pub fn build(input: &[u8], stats: &Stats, options: &ParseOptions) -> Result<Arena> {
    let arena = Arena::with_stats(stats, options)?;
    let mut builder = Builder {
        cursor: Cursor::new(input, options.comments),
        arena,
    };
    builder.run();
    debug_assert_eq!(
        builder.arena.used(),
        *stats,
        "counter and builder disagree on arena usage"
    );
    Ok(builder.arena)
}

struct Builder<'a> {
    cursor: Cursor<'a>,
    arena: Arena,
}

impl Builder<'_> {
    fn run(&mut self) {
        let mut frames: SmallVec<[Frame; 32]> = SmallVec::new();
        let mut slot = self.arena.reserve_node();

        loop {
            if let Some(frame) = self.fill(slot) {
                frames.push(frame);
            }

            slot = loop {
                let Some(frame) = frames.last_mut() else {
                    return;
                };
                match frame {
                    Frame::Array { items, next } if *next < items.len => {
                        let index = items.start + *next;
                        if *next > 0 {
                            self.skip_comma();
                        }
                        *next += 1;
                        break NodeId(index);
                    }
                    Frame::Object { entries, next } if *next < entries.len => {
                        let index = entries.start + *next;
                        if *next > 0 {
                            self.skip_comma();
                        }
                        *next += 1;
                        break self.entry(index);
                    }
                    Frame::Array { .. } | Frame::Object { .. } => {
                        self.close();
                        frames.pop();
                    }
                }
            };
        }
    }

    /// Fills a reserved slot with the value at the cursor. Containers only get
    /// their child storage reserved here; their children are filled by `run`.
    fn fill(&mut self, slot: NodeId) -> Option<Frame> {
        self.cursor.skip_trivia_validated();
        let node = match self.cursor.peek() {
            Some(b'{') => {
                self.cursor.bump();
                let entries = self.arena.reserve_entries(self.cursor.count_children());
                self.arena.set_node(slot, Node::Object(entries));
                return Some(Frame::Object { entries, next: 0 });
            }
            Some(b'[') => {
                self.cursor.bump();
                let items = self.arena.reserve_nodes(self.cursor.count_children());
                self.arena.set_node(slot, Node::Array(items));
                return Some(Frame::Array { items, next: 0 });
            }
            Some(b'"') => {
                let cursor = &mut self.cursor;
                Node::String(
                    self.arena
                        .push_string(|out| cursor.decode_string_validated(out)),
                )
            }
            Some(b'-' | b'0'..=b'9') => Node::Number(self.cursor.decode_number_validated()),
            _ => match self.cursor.literal() {
                Some(Literal::True) => Node::Bool(true),
                Some(Literal::False) => Node::Bool(false),
                Some(Literal::Null) | None => Node::Null,
            },
        };
        self.arena.set_node(slot, node);
        None
    }

    /// Decodes `"key" :` into entry `index` and reserves the slot for its value.
    fn entry(&mut self, index: usize) -> NodeId {
        self.cursor.skip_trivia_validated();
        let cursor = &mut self.cursor;
        let key = self
            .arena
            .push_string(|out| cursor.decode_string_validated(out));
        self.cursor.skip_trivia_validated();
        self.cursor.bump();
        let value = self.arena.reserve_node();
        self.arena.set_entry(index, Entry { key, value });
        value
    }

    fn skip_comma(&mut self) {
        self.cursor.skip_trivia_validated();
        if self.cursor.peek() == Some(b',') {
            self.cursor.bump();
        }
    }

    fn close(&mut self) {
        self.cursor.skip_trivia_validated();
        self.cursor.bump();
    }
}
