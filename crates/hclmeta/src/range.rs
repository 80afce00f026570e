//! byte spans to file/line/column ranges
//!
//! The parser only records byte offsets. [RangeMapper] indexes the line starts of a source text once and
//! turns spans into [SourceRange]s with 1-based lines and columns (columns count characters, not bytes).
use crate::error::ConversionError;
use serde::Serialize;
use std::ops::Range;

/// A single point in a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub byte: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRange {
    pub filename: String,
    pub start: Position,
    pub end: Position,
}

#[derive(Debug)]
pub struct RangeMapper<'s> {
    filename: String,
    source: &'s str,
    /// byte offset of the first character of every line
    line_starts: Vec<usize>,
}

impl<'s> RangeMapper<'s> {
    pub fn new(filename: impl Into<String>, source: &'s str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(index, _)| index + 1))
            .collect();

        Self {
            filename: filename.into(),
            source,
            line_starts,
        }
    }

    /// Map a span to a [SourceRange]
    ///
    /// Fails when the span is reversed or reaches past the end of the source.
    pub fn range(&self, span: &Range<usize>) -> Result<SourceRange, ConversionError> {
        self.check(span)?;

        Ok(SourceRange {
            filename: self.filename.clone(),
            start: self.position(span.start),
            end: self.position(span.end),
        })
    }

    /// Verbatim source text covered by a span
    pub fn slice(&self, span: &Range<usize>) -> Result<&'s str, ConversionError> {
        self.check(span)?;

        self.source
            .get(span.clone())
            .ok_or_else(|| ConversionError::SpanOutOfBounds {
                start: span.start,
                end: span.end,
                len: self.source.len(),
            })
    }

    fn check(&self, span: &Range<usize>) -> Result<(), ConversionError> {
        if span.start > span.end || span.end > self.source.len() {
            return Err(ConversionError::SpanOutOfBounds {
                start: span.start,
                end: span.end,
                len: self.source.len(),
            });
        }

        Ok(())
    }

    fn position(&self, byte: usize) -> Position {
        let line_index = match self.line_starts.binary_search(&byte) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let line_start = self.line_starts[line_index];

        // a byte offset inside a multi-byte character counts as that character
        let column = self.source[line_start..]
            .char_indices()
            .take_while(|(offset, _)| line_start + offset < byte)
            .count();

        Position {
            byte,
            line: line_index + 1,
            column: column + 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn positions_are_one_based() {
        let mapper = RangeMapper::new("main.tf", "a = 1\nbb = 2\n");

        let range = mapper.range(&(6..13)).unwrap();

        assert_eq!(range.filename, "main.tf");
        assert_eq!(
            range.start,
            Position {
                byte: 6,
                line: 2,
                column: 1
            }
        );
        assert_eq!(
            range.end,
            Position {
                byte: 13,
                line: 3,
                column: 1
            }
        );
    }

    #[test]
    fn columns_count_characters() {
        let mapper = RangeMapper::new("", "x = \"ä\" # ok");

        // `ä` takes two bytes, so `#` at byte 9 is the 9th character
        let range = mapper.range(&(9..10)).unwrap();

        assert_eq!(range.start.line, 1);
        assert_eq!(range.start.column, 9);
        assert_eq!(range.end.column, 10);
    }

    #[test]
    fn empty_span_at_end_of_source() {
        let source = "one\ntwo";
        let mapper = RangeMapper::new("", source);

        let range = mapper.range(&(source.len()..source.len())).unwrap();

        assert_eq!(range.start, range.end);
        assert_eq!(range.start.line, 2);
        assert_eq!(range.start.column, 4);
    }

    #[test]
    fn out_of_bounds_spans_are_rejected() {
        let mapper = RangeMapper::new("", "short");

        assert!(matches!(
            mapper.range(&(2..10)),
            Err(ConversionError::SpanOutOfBounds { len: 5, .. })
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = 4..1;
        assert!(mapper.slice(&reversed).is_err());
    }

    #[test]
    fn slice_returns_verbatim_text() {
        let mapper = RangeMapper::new("", "a = \"b\"");

        assert_eq!(mapper.slice(&(4..7)).unwrap(), "\"b\"");
    }
}
