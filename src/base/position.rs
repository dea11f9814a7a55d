//! Line/column tracking for source text.
//!
//! Offsets are byte offsets (`TextSize`); lines and columns are 0-indexed
//! for LSP compatibility. Columns count bytes from the start of the line.

use text_size::{TextRange, TextSize};

use super::Span;

/// A position in source code (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Maps byte offsets to line/column pairs and back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineIndex {
    /// Offset of the first byte of every line.
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(idx as u32 + 1));
            }
        }
        Self {
            line_starts,
            len: TextSize::new(text.len() as u32),
        }
    }

    /// Number of lines (an empty text has one line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Total length of the indexed text.
    pub fn len(&self) -> TextSize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == TextSize::new(0)
    }

    /// Convert an offset to a line/column. Offsets past the end clamp to the end.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(self.len);
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts.get(line).copied().unwrap_or_default();
        LineCol {
            line: line as u32,
            col: u32::from(offset - line_start),
        }
    }

    /// Convert a line/column back to an offset.
    ///
    /// Lines past the end clamp to the end of the text; columns past the end
    /// of their line clamp to the line break.
    pub fn offset(&self, pos: LineCol) -> TextSize {
        let Some(&start) = self.line_starts.get(pos.line as usize) else {
            return self.len;
        };
        let line_end = self
            .line_starts
            .get(pos.line as usize + 1)
            .map(|next| *next - TextSize::new(1))
            .unwrap_or(self.len);
        (start + TextSize::new(pos.col)).min(line_end)
    }

    /// Build a [`Span`] for a range of this text.
    pub fn span(&self, range: TextRange) -> Span {
        let start = self.line_col(range.start());
        Span::new(range, start.line, start.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_roundtrip_on_multiline_text() {
        let index = LineIndex::new("ab\ncde\n\nf");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_col(TextSize::new(0)), LineCol::new(0, 0));
        assert_eq!(index.line_col(TextSize::new(4)), LineCol::new(1, 1));
        assert_eq!(index.line_col(TextSize::new(7)), LineCol::new(2, 0));
        assert_eq!(index.line_col(TextSize::new(8)), LineCol::new(3, 0));
        assert_eq!(index.offset(LineCol::new(1, 1)), TextSize::new(4));
    }

    #[test]
    fn test_offsets_clamp() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.line_col(TextSize::new(99)), LineCol::new(1, 2));
        assert_eq!(index.offset(LineCol::new(0, 40)), TextSize::new(2));
        assert_eq!(index.offset(LineCol::new(9, 0)), TextSize::new(5));
    }

    #[test]
    fn test_span_records_start_position() {
        let index = LineIndex::new("let a\nlet b");
        let span = index.span(TextRange::new(TextSize::new(10), TextSize::new(11)));
        assert_eq!((span.line, span.col), (1, 4));
        assert_eq!(span.len(), TextSize::new(1));
    }
}
