//! Terms paired with their rendered source.
//!
//! A [`RangedTerm`] is the artifact handed to downstream consumers: every node
//! carries the byte [`Span`] it occupies in `source`, so `&source[span]` is
//! always that node's own rendering.

use std::ops::Range;

use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::annotate::SpanAnnotator;
use crate::format::Format;
use crate::serialize::Serializer;
use crate::span::{CharIndex, Span};
use crate::term::{Layer, Term};

/// A span-annotated tree together with the text its spans point into.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangedTerm {
    pub term: Term<Span>,
    pub source: String,
}

/// Error converting char offsets into byte spans.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RebaseError {
    #[error("offset {offset} is past the end of a {len}-char source")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("range {start}..{end} ends before it starts")]
    InvertedRange { start: usize, end: usize },
}

/// A node whose span does not cover its own rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("root span {span:?} does not cover the {len}-byte source")]
    RootCoverage { span: Span, len: usize },

    #[error("span {span:?} is not a valid slice of the source")]
    InvalidSlice { span: Span },

    #[error("span {span:?} covers {found:?} but the subtree renders as {expected:?}")]
    Mismatch {
        span: Span,
        expected: String,
        found: String,
    },

    #[error("child span {child:?} is not inside its parent span {parent:?}")]
    Escapes { parent: Span, child: Span },
}

/// Convert char-offset ranges into byte spans over `source`.
///
/// Each endpoint is found by advancing that many chars from the start of
/// `source`.
pub fn rebase(term: &Term<Range<usize>>, source: &str) -> Result<Term<Span>, RebaseError> {
    let index = CharIndex::new(source);
    let byte_offset = |offset: usize| {
        index
            .byte_offset(offset)
            .ok_or(RebaseError::OffsetOutOfBounds {
                offset,
                len: index.char_len(),
            })
    };

    term.try_map(|range| {
        if range.start > range.end {
            return Err(RebaseError::InvertedRange {
                start: range.start,
                end: range.end,
            });
        }
        Ok(byte_offset(range.start)?..byte_offset(range.end)?)
    })
}

impl RangedTerm {
    /// Render `term` with `format` and attach every node's byte span.
    pub fn arrange<A>(term: &Term<A>, format: &Format) -> Result<Self, RebaseError> {
        let source = Serializer::new(format.clone()).serialize(term);
        let offsets = SpanAnnotator::new(format.clone()).annotate(term);
        let term = rebase(&offsets, &source)?;

        trace!(
            "arranged {} nodes over {} bytes of source",
            term.node_count(),
            source.len()
        );
        Ok(Self { term, source })
    }

    /// [`RangedTerm::arrange`] with the default [`Format`].
    pub fn from_term<A>(term: &Term<A>) -> Result<Self, RebaseError> {
        Self::arrange(term, &Format::default())
    }

    /// The slice of `source` a node of this tree spans.
    pub fn text_of(&self, node: &Term<Span>) -> Option<&str> {
        self.source.get(node.annotation().clone())
    }

    /// Every span in pre-order.
    pub fn spans(&self) -> Vec<Span> {
        self.term
            .subterms()
            .map(|node| node.annotation().clone())
            .collect()
    }

    /// Check that every span slices out exactly its subtree's rendering, that
    /// children sit inside their parent, and that the root covers the source.
    pub fn verify(&self, format: &Format) -> Result<(), VerifyError> {
        let root = self.term.annotation();
        if *root != (0..self.source.len()) {
            return Err(VerifyError::RootCoverage {
                span: root.clone(),
                len: self.source.len(),
            });
        }

        let serializer = Serializer::new(format.clone());
        let mut first_error = None;

        self.term.fold_annotated(|span, layer| {
            if first_error.is_none() {
                first_error = check_children(span, &layer).err();
            }
            let expected = serializer.render_layer(layer.map(|(_, text)| text));
            if first_error.is_none() {
                first_error = match self.source.get(span.clone()) {
                    None => Some(VerifyError::InvalidSlice { span: span.clone() }),
                    Some(found) if found != expected => Some(VerifyError::Mismatch {
                        span: span.clone(),
                        expected: expected.clone(),
                        found: found.to_string(),
                    }),
                    Some(_) => None,
                };
            }
            expected
        });

        first_error.map_or(Ok(()), Err)
    }
}

fn check_children(parent: &Span, layer: &Layer<'_, (&Span, String)>) -> Result<(), VerifyError> {
    let children: Vec<&Span> = match layer {
        Layer::Leaf(_) => return Ok(()),
        Layer::Indexed(children) => children.iter().map(|(span, _)| *span).collect(),
        Layer::Keyed(entries) => entries.iter().map(|(_, (span, _))| *span).collect(),
    };

    let mut floor = parent.start;
    for child in children {
        if child.start < floor || child.end > parent.end {
            return Err(VerifyError::Escapes {
                parent: parent.clone(),
                child: child.clone(),
            });
        }
        floor = child.end;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrange_single_leaf() {
        let ranged = RangedTerm::from_term(&Term::leaf("x")).unwrap();
        assert_eq!(ranged.source, "x");
        assert_eq!(ranged.spans(), vec![0..1]);
    }

    #[test]
    fn test_rebase_multibyte() {
        let term = Term::indexed([Term::leaf("é"), Term::leaf("🦀")]);
        let ranged = RangedTerm::from_term(&term).unwrap();

        let texts: Vec<_> = ranged
            .term
            .subterms()
            .map(|node| ranged.text_of(node).unwrap())
            .collect();
        assert_eq!(texts, vec![ranged.source.as_str(), "é", "🦀"]);
        // 'é' is 2 bytes, so the separator after it starts at byte 5.
        assert_eq!(ranged.spans(), vec![0..14, 3..5, 8..12]);
    }

    #[test]
    fn test_rebase_rejects_out_of_bounds() {
        let offsets = Term::new(0..4, crate::term::Shape::Leaf("abcd".into()));
        assert_eq!(
            rebase(&offsets, "ab"),
            Err(RebaseError::OffsetOutOfBounds { offset: 4, len: 2 })
        );
    }

    #[test]
    fn test_rebase_rejects_inverted_range() {
        #[allow(clippy::reversed_empty_ranges)]
        let offsets = Term::new(2..1, crate::term::Shape::Leaf(String::new()));
        assert_eq!(
            rebase(&offsets, "abc"),
            Err(RebaseError::InvertedRange { start: 2, end: 1 })
        );
    }

    #[test]
    fn test_verify_accepts_arranged_tree() {
        let term = Term::keyed([
            ("a", Term::indexed([Term::leaf("1"), Term::leaf("2")])),
            ("bb", Term::leaf("3")),
        ]);
        let format = Format::balanced();
        let ranged = RangedTerm::arrange(&term, &format).unwrap();
        assert_eq!(ranged.verify(&format), Ok(()));
    }

    #[test]
    fn test_verify_reports_mismatch() {
        let term = Term::indexed([Term::leaf("a"), Term::leaf("b")]);
        let mut ranged = RangedTerm::from_term(&term).unwrap();
        // Point the first child at the second child's text.
        ranged.term = ranged
            .term
            .map(|span| if *span == (3..4) { 7..8 } else { span.clone() });

        assert!(matches!(
            ranged.verify(&Format::default()),
            Err(VerifyError::Mismatch { .. })
        ));
    }

    #[test]
    fn test_verify_reports_root_coverage() {
        let mut ranged = RangedTerm::from_term(&Term::leaf("abc")).unwrap();
        ranged.term = ranged.term.map(|_| 0..2);
        assert_eq!(
            ranged.verify(&Format::default()),
            Err(VerifyError::RootCoverage { span: 0..2, len: 3 })
        );
    }
}
