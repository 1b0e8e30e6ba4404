use alloc::sync::Arc;

use crate::types::ErrorLocationProvider;

/// A span of the markup being scanned.
///
/// The parser rewrites its working buffer whenever a user macro expands, so a
/// location keeps a shared snapshot of the buffer it was taken from rather
/// than an offset into the caller's original string.
///
/// The struct is immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    /// Snapshot of the buffer the span refers to.
    pub input: Arc<str>,
    /// Zero-based inclusive byte offset.
    pub start: usize,
    /// Zero-based exclusive byte offset.
    pub end: usize,
}

impl SourceLocation {
    /// Creates a location covering `start..end` of `input`.
    ///
    /// ```
    /// use texmml::types::SourceLocation;
    /// use std::sync::Arc;
    ///
    /// let loc = SourceLocation::new(Arc::from("x^2"), 0, 3);
    /// assert_eq!(loc.text(), "x^2");
    /// ```
    #[must_use]
    pub const fn new(input: Arc<str>, start: usize, end: usize) -> Self {
        Self { input, start, end }
    }

    /// Convenience constructor that copies `input` into a fresh [`Arc`].
    #[must_use]
    pub fn from_str(input: &str, start: usize, end: usize) -> Self {
        Self::new(Arc::from(input), start, end)
    }

    /// Inclusive start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// The full buffer the span was taken from.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The covered text, or an empty string when the span is out of range or
    /// splits a character.
    #[must_use]
    pub fn text(&self) -> &str {
        self.input.get(self.start..self.end).unwrap_or_default()
    }
}

impl ErrorLocationProvider for SourceLocation {
    fn loc(&self) -> Option<&SourceLocation> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_slice() {
        let loc = SourceLocation::from_str(r"\frac{a}{b}", 0, 5);
        assert_eq!(loc.text(), r"\frac");
        assert_eq!(loc.input(), r"\frac{a}{b}");
    }

    #[test]
    fn test_out_of_range_text_is_empty() {
        let loc = SourceLocation::from_str("ab", 1, 9);
        assert_eq!(loc.text(), "");
        let loc = SourceLocation::from_str("\u{3b1}\u{3b2}", 1, 2);
        assert_eq!(loc.text(), "");
    }
}
