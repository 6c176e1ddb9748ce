use crate::constants::DEFAULT_MAX_DEPTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest container nesting accepted before failing with `NestingTooDeep`.
    pub max_depth: usize,
    /// Accept `//` and `/* */` comments wherever whitespace is legal.
    pub comments: bool,
    /// Upper bound on the arena size in bytes. `None` means no bound beyond the allocator's.
    pub max_arena_bytes: Option<usize>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    pub fn with_max_arena_bytes(mut self, max_arena_bytes: Option<usize>) -> Self {
        self.max_arena_bytes = max_arena_bytes;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            comments: true,
            max_arena_bytes: None,
        }
    }
}
