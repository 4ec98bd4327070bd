//! Annotated term trees, their text rendering, and the exact span every node
//! occupies in that rendering.
//!
//! - [`Term`]: recursive tree with a uniform annotation on every node
//! - [`Serializer`]: renders a tree with a [`Format`]
//! - [`SpanAnnotator`]: computes each node's char range without re-rendering
//! - [`RangedTerm`]: a rendered source plus a tree of byte spans into it
//! - [`TermGenerator`] and [`Shrink`]: random trees for property tests

pub mod annotate;
pub mod format;
pub mod generate;
pub mod ranged;
pub mod serialize;
pub mod shrink;
pub mod span;
#[cfg(feature = "proptest")]
pub mod strategy;
pub mod term;

// Re-exports for convenience
pub use term::{Keyed, Layer, Shape, Subterms, Term};

pub use format::{Delimiters, Format, KEY_VALUE_SEPARATOR, KeyStyle, text_len};
pub use serialize::{Serializer, serialize};
pub use annotate::{SpanAnnotator, annotate};
pub use ranged::{RangedTerm, RebaseError, VerifyError, rebase};
pub use span::{CharIndex, Span};

// Generation exports
pub use generate::{DepthPolicy, GenerateError, GeneratorConfig, TermGenerator, TextAlphabet};
pub use shrink::{Shrink, minimize};

#[cfg(feature = "proptest")]
pub use strategy::{ranged_strategy, term_strategy, text_strategy};
