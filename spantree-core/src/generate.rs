//! Random term generation.
//!
//! Produces unannotated trees of bounded size for property tests:
//! - Each node picks uniformly between leaf, indexed and keyed
//! - Composites draw a child count uniformly in `0..=size_hint`
//! - Every level reuses the same size hint, so size is bounded by an explicit
//!   depth cap and a total node budget rather than by the hint
//!
//! Generation is deterministic for a given seed.

use log::{debug, trace};
use rand::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::format::Format;
use crate::ranged::{RangedTerm, RebaseError};
use crate::term::Term;

/// Non-ASCII and whitespace chars mixed into [`TextAlphabet::Unicode`] text.
pub(crate) const UNICODE_EXTRAS: &[char] = &[
    '\n', '\t', '"', '\\', 'é', 'ß', 'λ', '中', '🦀', '\u{301}', '\u{1}',
];

/// What to do when a composite node is picked at the depth cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DepthPolicy {
    /// Generate a leaf instead.
    #[default]
    Truncate,
    /// Abort with [`GenerateError::DepthExceeded`].
    Fail,
}

/// Chars that leaf text and keys are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TextAlphabet {
    /// Printable ASCII, quotes and backslashes included.
    #[default]
    Ascii,
    /// Printable ASCII plus multi-byte chars, combining marks and control chars.
    Unicode,
}

/// Bounds and choices for [`TermGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratorConfig {
    /// Upper bound (inclusive) for the child count of composite nodes.
    pub size_hint: usize,
    /// Maximum tree depth; a lone leaf has depth 1. At least 1.
    pub max_depth: usize,
    /// Maximum number of nodes in one tree. At least 1.
    pub max_nodes: usize,
    /// Upper bound (inclusive) for leaf text and key length, in chars.
    pub max_text_len: usize,
    pub alphabet: TextAlphabet,
    pub depth_policy: DepthPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            size_hint: 4,
            max_depth: 6,
            max_nodes: 256,
            max_text_len: 8,
            alphabet: TextAlphabet::Ascii,
            depth_policy: DepthPolicy::Truncate,
        }
    }
}

impl GeneratorConfig {
    pub fn with_size_hint(mut self, size_hint: usize) -> Self {
        self.size_hint = size_hint;
        self
    }

    /// Values below 1 are raised to 1: the root is always generated.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    /// Values below 1 are raised to 1: the root is always generated.
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes.max(1);
        self
    }

    pub fn with_max_text_len(mut self, max_text_len: usize) -> Self {
        self.max_text_len = max_text_len;
        self
    }

    pub fn with_alphabet(mut self, alphabet: TextAlphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn with_depth_policy(mut self, depth_policy: DepthPolicy) -> Self {
        self.depth_policy = depth_policy;
        self
    }

    /// Raise zero limits set directly on the fields (or deserialized) to 1.
    fn normalized(self) -> Self {
        let (max_depth, max_nodes) = (self.max_depth, self.max_nodes);
        self.with_max_depth(max_depth).with_max_nodes(max_nodes)
    }
}

/// Error that can occur during generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("generated tree exceeded the depth limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("could not place generated tree: {0}")]
    Rebase(#[from] RebaseError),
}

/// Random generator of unannotated terms.
pub struct TermGenerator<R: Rng = StdRng> {
    config: GeneratorConfig,
    rng: R,
}

impl TermGenerator<StdRng> {
    /// Create a generator seeded from OS randomness.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config: config.normalized(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a generator with a specific seed for reproducible trees.
    pub fn with_seed(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config: config.normalized(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

enum Pick {
    Leaf,
    Indexed,
    Keyed,
}

impl<R: Rng> TermGenerator<R> {
    /// Create a generator with a custom RNG.
    pub fn with_rng(config: GeneratorConfig, rng: R) -> Self {
        Self {
            config: config.normalized(),
            rng,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a tree using the configured size hint.
    pub fn generate(&mut self) -> Result<Term<()>, GenerateError> {
        self.generate_sized(self.config.size_hint)
    }

    /// Generate a tree whose composites have at most `size_hint` children.
    pub fn generate_sized(&mut self, size_hint: usize) -> Result<Term<()>, GenerateError> {
        // The root's own slot is taken up front.
        let mut budget = self.config.max_nodes.saturating_sub(1);
        let term = self.node(size_hint, 1, &mut budget)?;

        trace!(
            "generated tree with {} nodes, depth {}",
            term.node_count(),
            term.depth()
        );
        Ok(term)
    }

    /// Generate a tree and place it in its rendering with `format`.
    pub fn generate_ranged(&mut self, format: &Format) -> Result<RangedTerm, GenerateError> {
        let term = self.generate()?;
        Ok(RangedTerm::arrange(&term, format)?)
    }

    /// Generate one node at `depth`. Its own slot is already counted in the
    /// budget; each child's slot is reserved before the child is built.
    fn node(
        &mut self,
        size_hint: usize,
        depth: usize,
        budget: &mut usize,
    ) -> Result<Term<()>, GenerateError> {
        let pick = match self.rng.random_range(0..3u8) {
            0 => Pick::Leaf,
            1 => Pick::Indexed,
            _ => Pick::Keyed,
        };
        if matches!(pick, Pick::Leaf) {
            return Ok(Term::leaf(self.text()));
        }

        if depth >= self.config.max_depth {
            return match self.config.depth_policy {
                DepthPolicy::Fail => Err(GenerateError::DepthExceeded {
                    limit: self.config.max_depth,
                }),
                DepthPolicy::Truncate => {
                    debug!("depth cap {} reached, generating a leaf", self.config.max_depth);
                    Ok(Term::leaf(self.text()))
                }
            };
        }

        let wanted = self.rng.random_range(0..=size_hint);
        let count = wanted.min(*budget);
        if count < wanted {
            debug!("node budget exhausted, generating {count} of {wanted} children");
        }
        *budget -= count;

        match pick {
            Pick::Indexed => {
                let mut children = Vec::with_capacity(count);
                for _ in 0..count {
                    children.push(self.node(size_hint, depth + 1, budget)?);
                }
                Ok(Term::indexed(children))
            }
            _ => {
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let key = self.text();
                    entries.push((key, self.node(size_hint, depth + 1, budget)?));
                }
                Ok(Term::keyed(entries))
            }
        }
    }

    fn text(&mut self) -> String {
        let len = self.rng.random_range(0..=self.config.max_text_len);
        (0..len).map(|_| self.char()).collect()
    }

    fn char(&mut self) -> char {
        let extra = match self.config.alphabet {
            TextAlphabet::Ascii => false,
            TextAlphabet::Unicode => self.rng.random_bool(0.25),
        };
        if extra {
            UNICODE_EXTRAS[self.rng.random_range(0..UNICODE_EXTRAS.len())]
        } else {
            self.rng.random_range(' '..='~')
        }
    }
}
