//! Rendering terms to text.
//!
//! Leaves are copied verbatim. Composites wrap their rendered children in the
//! [`Delimiters`](crate::format::Delimiters) of their shape; keyed entries render as
//! `"key": value`.

use std::fmt;

use crate::format::{Format, KEY_VALUE_SEPARATOR};
use crate::term::{Layer, Term};

/// Renders terms with a fixed [`Format`].
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    format: Format,
}

impl Serializer {
    pub fn new(format: Format) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Render a whole tree. Annotations are ignored.
    pub fn serialize<A>(&self, term: &Term<A>) -> String {
        term.fold(|layer| self.render_layer(layer))
    }

    /// Render one node given its already-rendered children.
    pub fn render_layer(&self, layer: Layer<'_, String>) -> String {
        match layer {
            Layer::Leaf(text) => text.to_string(),
            Layer::Indexed(children) => self.format.indexed.wrap(children),
            Layer::Keyed(entries) => {
                let rendered = entries.into_iter().map(|(key, value)| {
                    format!("{}{KEY_VALUE_SEPARATOR}{value}", self.format.render_key(key))
                });
                self.format.keyed.wrap(rendered)
            }
        }
    }
}

/// Render with the default [`Format`].
pub fn serialize<A>(term: &Term<A>) -> String {
    Serializer::default().serialize(term)
}

impl<A> fmt::Display for Term<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::KeyStyle;

    #[test]
    fn test_leaf_is_verbatim() {
        assert_eq!(serialize(&Term::leaf("x")), "x");
        assert_eq!(serialize(&Term::leaf("a \"quoted\"\n")), "a \"quoted\"\n");
    }

    #[test]
    fn test_empty_composites() {
        assert_eq!(serialize(&Term::indexed([])), "[\n\t\n]");
        assert_eq!(serialize(&Term::keyed(Vec::<(String, Term<()>)>::new())), "[\n\t\n}");
    }

    #[test]
    fn test_indexed_children_joined() {
        let term = Term::indexed([Term::leaf("a"), Term::leaf("b")]);
        assert_eq!(serialize(&term), "[\n\ta,\n\tb\n]");
    }

    #[test]
    fn test_keyed_entries_quoted() {
        let term = Term::keyed([("k", Term::leaf("v")), ("other", Term::indexed([]))]);
        assert_eq!(serialize(&term), "[\n\t\"k\": v,\n\t\"other\": [\n\t\n]\n}");
    }

    #[test]
    fn test_balanced_format_escapes_keys() {
        let serializer = Serializer::new(Format::balanced());
        let term = Term::keyed([("say \"hi\"", Term::leaf("ok"))]);
        assert_eq!(serializer.serialize(&term), "{\n\t\"say \\\"hi\\\"\": ok\n}");
        assert_eq!(serializer.format().key_style, KeyStyle::Escaped);
    }

    #[test]
    fn test_annotations_do_not_affect_output() {
        let term = Term::indexed([Term::leaf("a")]);
        let annotated = term.map(|_| 42u32);
        assert_eq!(serialize(&term), serialize(&annotated));
        assert_eq!(annotated.to_string(), serialize(&term));
    }
}
