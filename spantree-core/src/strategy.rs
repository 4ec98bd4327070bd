//! `proptest` strategies for terms.
//!
//! Mirrors [`TermGenerator`](crate::generate::TermGenerator) on top of
//! `prop_recursive`, so proptest drives generation and shrinking itself.

use proptest::prelude::*;

use crate::format::Format;
use crate::generate::{GeneratorConfig, TextAlphabet, UNICODE_EXTRAS};
use crate::ranged::RangedTerm;
use crate::term::Term;

/// Text drawn from the configured alphabet, up to `max_text_len` chars.
pub fn text_strategy(config: &GeneratorConfig) -> BoxedStrategy<String> {
    let ascii = proptest::char::range(' ', '~');
    let chars = match config.alphabet {
        TextAlphabet::Ascii => ascii.boxed(),
        TextAlphabet::Unicode => {
            prop_oneof![3 => ascii, 1 => prop::sample::select(UNICODE_EXTRAS)].boxed()
        }
    };
    prop::collection::vec(chars, 0..=config.max_text_len)
        .prop_map(|chars| chars.into_iter().collect::<String>())
        .boxed()
}

/// Unannotated trees bounded by `config`'s depth, node budget and size hint.
///
/// Keyed children are collected last-write-wins, so colliding keys collapse
/// into one entry.
pub fn term_strategy(config: &GeneratorConfig) -> BoxedStrategy<Term<()>> {
    let text = text_strategy(config);
    let branch = config.size_hint;
    let levels = saturating_u32(config.max_depth.saturating_sub(1));
    let leaf = text.clone().prop_map(Term::leaf);

    leaf.prop_recursive(
        levels,
        saturating_u32(config.max_nodes),
        saturating_u32(branch),
        move |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..=branch).prop_map(Term::indexed),
                prop::collection::vec((text.clone(), inner), 0..=branch).prop_map(Term::keyed),
            ]
        },
    )
    .boxed()
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Arranged trees rendered with `format`.
pub fn ranged_strategy(config: &GeneratorConfig, format: Format) -> BoxedStrategy<RangedTerm> {
    term_strategy(config)
        .prop_filter_map("tree could not be arranged", move |term| {
            RangedTerm::arrange(&term, &format).ok()
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_saturate_instead_of_wrapping() {
        assert_eq!(saturating_u32(7), 7);
        assert_eq!(saturating_u32(u32::MAX as usize), u32::MAX);
        if let Some(past) = (u32::MAX as usize).checked_add(1) {
            assert_eq!(saturating_u32(past), u32::MAX);
        }
    }

    proptest! {
        #[test]
        fn term_strategy_respects_depth(term in term_strategy(&GeneratorConfig::default().with_max_depth(3))) {
            prop_assert!(term.depth() <= 3);
        }

        #[test]
        fn term_strategy_accepts_oversized_node_budget(
            term in term_strategy(&GeneratorConfig::default().with_max_nodes(usize::MAX).with_max_depth(3))
        ) {
            prop_assert!(term.depth() <= 3);
        }

        #[test]
        fn text_strategy_respects_length(text in text_strategy(&GeneratorConfig::default().with_max_text_len(5))) {
            prop_assert!(text.chars().count() <= 5);
        }

        #[test]
        fn unicode_text_is_drawn_from_alphabet(
            text in text_strategy(&GeneratorConfig::default().with_alphabet(TextAlphabet::Unicode))
        ) {
            prop_assert!(text.chars().all(|c| (' '..='~').contains(&c) || UNICODE_EXTRAS.contains(&c)));
        }
    }
}
