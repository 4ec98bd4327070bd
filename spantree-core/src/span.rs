use std::ops::Range;

/// Span in a rendered source (byte offsets).
pub type Span = Range<usize>;

/// Byte offset of every char boundary in a string, for turning char offsets
/// into [`Span`] endpoints.
#[derive(Debug, Clone)]
pub struct CharIndex {
    boundaries: Vec<usize>,
}

impl CharIndex {
    pub fn new(source: &str) -> Self {
        let boundaries = source
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(source.len()))
            .collect();
        Self { boundaries }
    }

    /// Length of the indexed string in chars.
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Byte offset reached by advancing `chars` chars from the start, or
    /// `None` past the end.
    pub fn byte_offset(&self, chars: usize) -> Option<usize> {
        self.boundaries.get(chars).copied()
    }
}
