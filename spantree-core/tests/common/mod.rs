//! Shared test utilities for spantree tests.
//!
//! Provides helper functions for:
//! - Arranging trees into ranged terms
//! - Checking every span against an independent rendering of its subtree

#![allow(dead_code)]

use spantree_core::{Format, Layer, RangedTerm, Serializer, Span, Term, text_len};

// ============================================================================
// Tree Helpers
// ============================================================================

/// A small tree using every shape, nested three levels deep.
pub fn sample_tree() -> Term<()> {
    Term::indexed([
        Term::leaf("first"),
        Term::keyed([
            ("name", Term::leaf("value")),
            ("items", Term::indexed([Term::leaf("x"), Term::indexed([])])),
        ]),
        Term::keyed(Vec::<(String, Term<()>)>::new()),
    ])
}

/// Arrange a tree with the default format.
pub fn arrange(term: &Term<()>) -> RangedTerm {
    arrange_with(term, &Format::default())
}

/// Arrange a tree with a specific format.
pub fn arrange_with(term: &Term<()>, format: &Format) -> RangedTerm {
    RangedTerm::arrange(term, format).expect("Generated spans should fit the source")
}

/// All spans of a ranged term in pre-order.
pub fn spans(ranged: &RangedTerm) -> Vec<Span> {
    ranged.spans()
}

/// Root length under a fixed 4-char allowance per keyed entry, ignoring the
/// key itself. Only right when every key is empty.
pub fn fixed_allowance_len(term: &Term<()>) -> usize {
    term.fold(|layer: Layer<'_, usize>| match layer {
        Layer::Leaf(text) => text_len(text),
        Layer::Indexed(children) => {
            3 + children.iter().sum::<usize>() + 3 * children.len().saturating_sub(1) + 2
        }
        Layer::Keyed(entries) => {
            3 + entries.iter().map(|(_, len)| len + 4).sum::<usize>()
                + 3 * entries.len().saturating_sub(1)
                + 2
        }
    })
}

// ============================================================================
// Span Assertions
// ============================================================================

/// Assert that every node's span slices out exactly that node's own rendering.
///
/// Renders each subtree separately instead of relying on `RangedTerm::verify`.
pub fn assert_spans_match(ranged: &RangedTerm, format: &Format) {
    let serializer = Serializer::new(format.clone());
    assert_eq!(
        ranged.term.annotation(),
        &(0..ranged.source.len()),
        "Root span should cover the whole source"
    );
    for node in ranged.term.subterms() {
        let span = node.annotation().clone();
        let found = ranged
            .source
            .get(span.clone())
            .unwrap_or_else(|| panic!("Span {:?} should slice the source", span));
        assert_eq!(
            found,
            serializer.serialize(node),
            "Span {:?} of {:?}",
            span,
            ranged.source
        );
    }
}
