//! Span types for tracking source locations.

use chumsky::span::SimpleSpan;

/// A span representing a byte range in the source text.
///
/// This is an alias for chumsky's `SimpleSpan`, a half-open range
/// `[start, end)` of byte offsets.
pub type Span = SimpleSpan<usize>;

/// A value with an associated source span.
pub type Spanned<T> = (T, Span);

/// Extension trait for creating spanned values.
pub trait WithSpan: Sized {
    /// Attach a span to this value.
    fn with_span(self, span: Span) -> Spanned<Self> {
        (self, span)
    }
}

impl<T> WithSpan for T {}

/// Build a span from a byte range.
pub(crate) fn span(start: usize, end: usize) -> Span {
    use chumsky::span::Span as _;
    Span::new((), start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanned_value() {
        let spanned = "hello".to_owned().with_span(span(0, 5));
        assert_eq!(spanned.0, "hello");
        assert_eq!(spanned.1.start, 0);
        assert_eq!(spanned.1.end, 5);
    }
}
