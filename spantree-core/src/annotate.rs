//! Span annotation.
//!
//! Computes, for every node, the half-open range of chars it occupies in the
//! text [`Serializer`](crate::serialize::Serializer) renders with the same
//! [`Format`]. Nothing is re-rendered: each node is placed with a running
//! cursor over its parent's delimiters and its siblings' lengths.
//!
//! Offsets are char offsets. [`rebase`](crate::ranged::rebase) turns them into
//! byte spans over the rendered source.

use std::ops::Range;

use crate::format::{Delimiters, Format, text_len};
use crate::term::{Keyed, Layer, Shape, Term};

/// Places every node of a tree in its rendered text.
#[derive(Debug, Clone, Default)]
pub struct SpanAnnotator {
    format: Format,
}

/// Char lengths of one [`Delimiters`] set.
#[derive(Debug, Clone, Copy)]
struct DelimiterLens {
    prefix: usize,
    separator: usize,
    suffix: usize,
}

impl DelimiterLens {
    fn of(delimiters: &Delimiters) -> Self {
        Self {
            prefix: text_len(&delimiters.prefix),
            separator: text_len(&delimiters.separator),
            suffix: text_len(&delimiters.suffix),
        }
    }
}

impl SpanAnnotator {
    pub fn new(format: Format) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Annotate every node with its char range in the rendered tree.
    ///
    /// The root always spans `0..text_len(rendered)`.
    pub fn annotate<A>(&self, term: &Term<A>) -> Term<Range<usize>> {
        let indexed = DelimiterLens::of(&self.format.indexed);
        let keyed = DelimiterLens::of(&self.format.keyed);

        term.fold(|layer: Layer<'_, Term<Range<usize>>>| match layer {
            Layer::Leaf(text) => Term::new(0..text_len(text), Shape::Leaf(text.to_string())),

            Layer::Indexed(children) => {
                let mut cursor = indexed.prefix;
                let mut placed = Vec::with_capacity(children.len());
                for child in children {
                    if !placed.is_empty() {
                        cursor += indexed.separator;
                    }
                    let len = child.annotation().len();
                    placed.push(child.shifted(cursor));
                    cursor += len;
                }
                Term::new(0..cursor + indexed.suffix, Shape::Indexed(placed))
            }

            Layer::Keyed(entries) => {
                let mut cursor = keyed.prefix;
                let mut placed = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    if !placed.is_empty() {
                        cursor += keyed.separator;
                    }
                    // The value starts after `"key": `.
                    cursor += self.format.key_lead_len(key);
                    let len = value.annotation().len();
                    placed.push((key.to_string(), value.shifted(cursor)));
                    cursor += len;
                }
                Term::new(
                    0..cursor + keyed.suffix,
                    Shape::Keyed(Keyed::from_unique(placed)),
                )
            }
        })
    }
}

/// Annotate with the default [`Format`].
pub fn annotate<A>(term: &Term<A>) -> Term<Range<usize>> {
    SpanAnnotator::default().annotate(term)
}

impl Term<Range<usize>> {
    /// Move every range in the tree `offset` units to the right.
    pub fn shifted(self, offset: usize) -> Self {
        self.map_into(|range| range.start + offset..range.end + offset)
    }
}
