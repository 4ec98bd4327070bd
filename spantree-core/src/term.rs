//! Annotated term trees.
//!
//! A [`Term`] is a strict tree where every node carries an annotation of the
//! same type `A` next to its [`Shape`]. Unannotated trees use `()`; span
//! annotation produces `Term<Range<usize>>`.
//!
//! Terms are built once and never mutated in place:
//! - [`Term::map`] and [`Term::try_map`] produce a new tree with replaced annotations
//! - [`Term::fold`] and [`Term::fold_annotated`] reduce a tree bottom-up
//!
//! Keyed children keep insertion order, which is the order every traversal
//! (serialization, span annotation, folding) uses.

use std::mem;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A node of an annotated tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Term<A> {
    annotation: A,
    shape: Shape<A>,
}

/// The three shapes a [`Term`] node can take.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Shape<A> {
    /// Atomic text with no children.
    Leaf(String),
    /// An ordered list of subterms.
    Indexed(Vec<Term<A>>),
    /// A labelled record of subterms.
    Keyed(Keyed<A>),
}

/// Ordered, duplicate-free `(key, subterm)` entries of a keyed node.
///
/// Building from pairs resolves collisions last-write-wins: the entry keeps the
/// position of the first occurrence of a key and the value of the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(transparent))]
pub struct Keyed<A> {
    entries: Vec<(String, Term<A>)>,
}

/// One level of a tree whose children have already been folded into `B`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer<'a, B> {
    Leaf(&'a str),
    Indexed(Vec<B>),
    Keyed(Vec<(&'a str, B)>),
}

impl<'a, B> Layer<'a, B> {
    /// Transform every folded child, keeping keys and order.
    pub fn map<C>(self, mut f: impl FnMut(B) -> C) -> Layer<'a, C> {
        match self {
            Layer::Leaf(text) => Layer::Leaf(text),
            Layer::Indexed(children) => Layer::Indexed(children.into_iter().map(f).collect()),
            Layer::Keyed(entries) => {
                Layer::Keyed(entries.into_iter().map(|(k, v)| (k, f(v))).collect())
            }
        }
    }
}

impl<A> Term<A> {
    /// Create a node from an annotation and a shape.
    pub fn new(annotation: A, shape: Shape<A>) -> Self {
        Self { annotation, shape }
    }

    /// The annotation attached to this node.
    pub fn annotation(&self) -> &A {
        &self.annotation
    }

    pub fn shape(&self) -> &Shape<A> {
        &self.shape
    }

    pub fn into_parts(self) -> (A, Shape<A>) {
        (self.annotation, self.shape)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.shape, Shape::Leaf(_))
    }

    /// Direct subterms in serialization order. Leaves have none.
    pub fn children(&self) -> impl Iterator<Item = &Term<A>> {
        let (indexed, keyed): (&[Term<A>], &[(String, Term<A>)]) = match &self.shape {
            Shape::Leaf(_) => (&[], &[]),
            Shape::Indexed(children) => (children.as_slice(), &[]),
            Shape::Keyed(entries) => (&[], entries.entries.as_slice()),
        };
        indexed.iter().chain(keyed.iter().map(|(_, value)| value))
    }

    /// Every node of the tree in pre-order: the root first, then each child
    /// subtree in serialization order.
    pub fn subterms(&self) -> Subterms<'_, A> {
        Subterms { stack: vec![self] }
    }

    /// Bottom-up catamorphism.
    ///
    /// `combine` is called once per node, after all of that node's children
    /// have been folded. Leaves pass their text, composites pass the folded
    /// children in serialization order.
    pub fn fold<'a, B, F>(&'a self, mut combine: F) -> B
    where
        F: FnMut(Layer<'a, B>) -> B,
    {
        self.fold_with(&mut combine)
    }

    fn fold_with<'a, B, F>(&'a self, combine: &mut F) -> B
    where
        F: FnMut(Layer<'a, B>) -> B,
    {
        let layer = match &self.shape {
            Shape::Leaf(text) => Layer::Leaf(text.as_str()),
            Shape::Indexed(children) => Layer::Indexed(
                children
                    .iter()
                    .map(|child| child.fold_with(&mut *combine))
                    .collect(),
            ),
            Shape::Keyed(entries) => Layer::Keyed(
                entries
                    .iter()
                    .map(|(key, value)| (key, value.fold_with(&mut *combine)))
                    .collect(),
            ),
        };
        combine(layer)
    }

    /// Annotation-aware catamorphism.
    ///
    /// Like [`Term::fold`], but `combine` also receives the current node's
    /// annotation, and every folded child is paired with that child's own
    /// annotation.
    pub fn fold_annotated<'a, B, F>(&'a self, mut combine: F) -> B
    where
        F: FnMut(&'a A, Layer<'a, (&'a A, B)>) -> B,
    {
        self.fold_annotated_with(&mut combine)
    }

    fn fold_annotated_with<'a, B, F>(&'a self, combine: &mut F) -> B
    where
        F: FnMut(&'a A, Layer<'a, (&'a A, B)>) -> B,
    {
        let layer = match &self.shape {
            Shape::Leaf(text) => Layer::Leaf(text.as_str()),
            Shape::Indexed(children) => Layer::Indexed(
                children
                    .iter()
                    .map(|child| (&child.annotation, child.fold_annotated_with(&mut *combine)))
                    .collect(),
            ),
            Shape::Keyed(entries) => Layer::Keyed(
                entries
                    .iter()
                    .map(|(key, value)| {
                        (
                            key,
                            (&value.annotation, value.fold_annotated_with(&mut *combine)),
                        )
                    })
                    .collect(),
            ),
        };
        combine(&self.annotation, layer)
    }

    /// Replace every annotation, keeping shape, child order and keys.
    ///
    /// `transform` is applied in pre-order.
    pub fn map<B, F>(&self, mut transform: F) -> Term<B>
    where
        F: FnMut(&A) -> B,
    {
        self.map_with(&mut transform)
    }

    fn map_with<B, F>(&self, transform: &mut F) -> Term<B>
    where
        F: FnMut(&A) -> B,
    {
        let annotation = transform(&self.annotation);
        let shape = match &self.shape {
            Shape::Leaf(text) => Shape::Leaf(text.clone()),
            Shape::Indexed(children) => Shape::Indexed(
                children
                    .iter()
                    .map(|child| child.map_with(&mut *transform))
                    .collect(),
            ),
            Shape::Keyed(entries) => Shape::Keyed(Keyed::from_unique(
                entries
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.map_with(&mut *transform)))
                    .collect(),
            )),
        };
        Term::new(annotation, shape)
    }

    /// Consuming variant of [`Term::map`].
    pub fn map_into<B, F>(self, mut transform: F) -> Term<B>
    where
        F: FnMut(A) -> B,
    {
        self.map_into_with(&mut transform)
    }

    fn map_into_with<B, F>(self, transform: &mut F) -> Term<B>
    where
        F: FnMut(A) -> B,
    {
        let annotation = transform(self.annotation);
        let shape = match self.shape {
            Shape::Leaf(text) => Shape::Leaf(text),
            Shape::Indexed(children) => Shape::Indexed(
                children
                    .into_iter()
                    .map(|child| child.map_into_with(&mut *transform))
                    .collect(),
            ),
            Shape::Keyed(entries) => Shape::Keyed(Keyed::from_unique(
                entries
                    .entries
                    .into_iter()
                    .map(|(key, value)| (key, value.map_into_with(&mut *transform)))
                    .collect(),
            )),
        };
        Term::new(annotation, shape)
    }

    /// Fallible [`Term::map`]; stops at the first error in pre-order.
    pub fn try_map<B, E, F>(&self, mut transform: F) -> Result<Term<B>, E>
    where
        F: FnMut(&A) -> Result<B, E>,
    {
        self.try_map_with(&mut transform)
    }

    fn try_map_with<B, E, F>(&self, transform: &mut F) -> Result<Term<B>, E>
    where
        F: FnMut(&A) -> Result<B, E>,
    {
        let annotation = transform(&self.annotation)?;
        let shape = match &self.shape {
            Shape::Leaf(text) => Shape::Leaf(text.clone()),
            Shape::Indexed(children) => Shape::Indexed(
                children
                    .iter()
                    .map(|child| child.try_map_with(&mut *transform))
                    .collect::<Result<_, _>>()?,
            ),
            Shape::Keyed(entries) => {
                let mut mapped = Vec::with_capacity(entries.len());
                for (key, value) in entries.iter() {
                    mapped.push((key.to_string(), value.try_map_with(&mut *transform)?));
                }
                Shape::Keyed(Keyed::from_unique(mapped))
            }
        };
        Ok(Term::new(annotation, shape))
    }

    /// Total number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.fold(|layer| match layer {
            Layer::Leaf(_) => 1,
            Layer::Indexed(children) => 1 + children.iter().sum::<usize>(),
            Layer::Keyed(entries) => 1 + entries.iter().map(|(_, n)| n).sum::<usize>(),
        })
    }

    /// Height of the tree; a single leaf has depth 1.
    pub fn depth(&self) -> usize {
        self.fold(|layer| match layer {
            Layer::Leaf(_) => 1,
            Layer::Indexed(children) => 1 + children.into_iter().max().unwrap_or(0),
            Layer::Keyed(entries) => 1 + entries.into_iter().map(|(_, d)| d).max().unwrap_or(0),
        })
    }

    /// Structural equality ignoring annotations: same shapes, leaf text,
    /// child order and keys.
    pub fn same_shape<B>(&self, other: &Term<B>) -> bool {
        match (&self.shape, &other.shape) {
            (Shape::Leaf(a), Shape::Leaf(b)) => a == b,
            (Shape::Indexed(a), Shape::Indexed(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (Shape::Keyed(a), Shape::Keyed(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_shape(vb))
            }
            _ => false,
        }
    }
}

impl Term<()> {
    /// An unannotated leaf.
    pub fn leaf(text: impl Into<String>) -> Self {
        Term::new((), Shape::Leaf(text.into()))
    }

    /// An unannotated indexed node.
    pub fn indexed(children: impl IntoIterator<Item = Term<()>>) -> Self {
        Term::new((), Shape::Indexed(children.into_iter().collect()))
    }

    /// An unannotated keyed node. Duplicate keys resolve last-write-wins.
    pub fn keyed<K: Into<String>>(entries: impl IntoIterator<Item = (K, Term<()>)>) -> Self {
        Term::new((), Shape::Keyed(entries.into_iter().collect()))
    }
}

impl<A> Keyed<A> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Entries the caller already knows to be duplicate-free.
    pub(crate) fn from_unique(entries: Vec<(String, Term<A>)>) -> Self {
        debug_assert!(
            entries
                .iter()
                .enumerate()
                .all(|(i, (k, _))| entries[..i].iter().all(|(other, _)| other != k)),
            "keyed entries must be unique"
        );
        Self { entries }
    }

    pub(crate) fn entries(&self) -> &[(String, Term<A>)] {
        &self.entries
    }

    /// Insert or replace the value for `key`.
    ///
    /// A replaced entry keeps its position; the previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: Term<A>) -> Option<Term<A>> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Term<A>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in iteration (and serialization) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term<A>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Term<A>> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<A> Default for Keyed<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, K: Into<String>> FromIterator<(K, Term<A>)> for Keyed<A> {
    fn from_iter<I: IntoIterator<Item = (K, Term<A>)>>(iter: I) -> Self {
        let mut keyed = Keyed::new();
        for (key, value) in iter {
            keyed.insert(key, value);
        }
        keyed
    }
}

impl<A> IntoIterator for Keyed<A> {
    type Item = (String, Term<A>);
    type IntoIter = std::vec::IntoIter<(String, Term<A>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(feature = "serde")]
impl<'de, A: Deserialize<'de>> Deserialize<'de> for Keyed<A> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<(String, Term<A>)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

/// Pre-order iterator returned by [`Term::subterms`].
#[derive(Debug, Clone)]
pub struct Subterms<'a, A> {
    stack: Vec<&'a Term<A>>,
}

impl<'a, A> Iterator for Subterms<'a, A> {
    type Item = &'a Term<A>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let first = self.stack.len();
        self.stack.extend(node.children());
        self.stack[first..].reverse();
        Some(node)
    }
}
