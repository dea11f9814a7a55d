use text_size::{TextRange, TextSize};

/// A located text range: byte range plus the 0-indexed line/column of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub range: TextRange,
    pub line: u32,
    pub col: u32,
}

impl Span {
    pub fn new(range: TextRange, line: u32, col: u32) -> Self {
        Self { range, line, col }
    }

    pub fn start(&self) -> TextSize {
        self.range.start()
    }

    pub fn end(&self) -> TextSize {
        self.range.end()
    }

    pub fn len(&self) -> TextSize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Check if an offset falls within this span.
    ///
    /// The end offset counts as inside: an editor cursor placed right after
    /// the last character of a name still refers to that name.
    pub fn contains(&self, offset: TextSize) -> bool {
        self.range.contains_inclusive(offset)
    }

    /// Check if another range lies entirely within this span.
    pub fn contains_range(&self, range: TextRange) -> bool {
        self.range.contains_range(range)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        if other.start() < self.start() {
            Span::new(self.range.cover(other.range), other.line, other.col)
        } else {
            Span::new(self.range.cover(other.range), self.line, self.col)
        }
    }
}
