//! Property tests over randomly generated trees.
//!
//! These tests use `proptest` to verify, for all shapes and nesting depths:
//! 1. **Every span slices its own subtree** out of the full rendering
//! 2. **The root covers the whole source**
//! 3. **Mapping annotations preserves shape**
//! 4. **Generation terminates within its bounds** for every size hint

mod common;

use common::assert_spans_match;
use proptest::prelude::*;
use spantree_core::{
    Format, GeneratorConfig, KeyStyle, RangedTerm, Term, TermGenerator, TextAlphabet,
    ranged_strategy, serialize, term_strategy,
};

fn ascii_config() -> GeneratorConfig {
    GeneratorConfig::default()
        .with_size_hint(4)
        .with_max_depth(5)
        .with_max_nodes(64)
}

fn unicode_config() -> GeneratorConfig {
    ascii_config().with_alphabet(TextAlphabet::Unicode)
}

// ============================================================================
// Span Properties
// ============================================================================

proptest! {
    #[test]
    fn spans_slice_subtrees_legacy(ranged in ranged_strategy(&ascii_config(), Format::legacy())) {
        assert_spans_match(&ranged, &Format::legacy());
    }

    #[test]
    fn spans_slice_subtrees_unicode(ranged in ranged_strategy(&unicode_config(), Format::legacy())) {
        assert_spans_match(&ranged, &Format::legacy());
    }

    #[test]
    fn spans_slice_subtrees_balanced(ranged in ranged_strategy(&unicode_config(), Format::balanced())) {
        assert_spans_match(&ranged, &Format::balanced());
    }

    #[test]
    fn spans_slice_subtrees_escaped_keys(
        ranged in ranged_strategy(
            &unicode_config(),
            Format::legacy().with_key_style(KeyStyle::Escaped),
        )
    ) {
        let format = Format::legacy().with_key_style(KeyStyle::Escaped);
        prop_assert_eq!(ranged.verify(&format), Ok(()));
    }

    #[test]
    fn root_covers_whole_source(term in term_strategy(&unicode_config())) {
        let ranged = RangedTerm::from_term(&term).unwrap();
        prop_assert_eq!(ranged.term.annotation().clone(), 0..ranged.source.len());
        prop_assert_eq!(ranged.source, serialize(&term));
    }

    #[test]
    fn ranged_tree_keeps_shape(term in term_strategy(&ascii_config())) {
        let ranged = RangedTerm::from_term(&term).unwrap();
        prop_assert!(ranged.term.same_shape(&term));
    }
}

// ============================================================================
// Structural Properties
// ============================================================================

proptest! {
    #[test]
    fn map_preserves_shape(term in term_strategy(&ascii_config()), tag in any::<u16>()) {
        let mapped = term.map(|_| tag);
        prop_assert!(mapped.same_shape(&term));
        prop_assert_eq!(mapped.node_count(), term.node_count());
        prop_assert!(mapped.subterms().all(|node| *node.annotation() == tag));
        prop_assert_eq!(serialize(&mapped), serialize(&term));
    }

    #[test]
    fn map_round_trips_to_original(term in term_strategy(&unicode_config())) {
        let numbered = {
            let mut next = 0usize;
            term.map(|_| {
                next += 1;
                next
            })
        };
        let restored: Term<()> = numbered.map(|_| ());
        prop_assert_eq!(restored, term);
    }

    #[test]
    fn generation_terminates_within_bounds(size_hint in 0usize..12, seed in any::<u64>()) {
        let config = GeneratorConfig::default()
            .with_max_depth(6)
            .with_max_nodes(200);
        let term = TermGenerator::with_seed(config, seed)
            .generate_sized(size_hint)
            .unwrap();
        prop_assert!(term.depth() <= 6);
        prop_assert!(term.node_count() <= 200);
    }

    #[test]
    fn generated_trees_arrange_cleanly(seed in any::<u64>()) {
        let format = Format::balanced();
        let mut generator = TermGenerator::with_seed(unicode_config(), seed);
        let ranged = generator.generate_ranged(&format).unwrap();
        assert_spans_match(&ranged, &format);
    }
}
