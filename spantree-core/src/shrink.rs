//! Shrinking: turning a failing random input into a smaller one that still
//! fails.
//!
//! [`Shrink`] is the framework-independent half of the generator capability
//! (the other half being [`TermGenerator`](crate::generate::TermGenerator)):
//! any harness can drive it, and [`minimize`] is a ready-made greedy driver.

use log::debug;

use crate::term::{Keyed, Shape, Term};

/// A value that can propose strictly smaller versions of itself.
pub trait Shrink: Sized {
    /// Lazy, finite sequence of smaller candidates, most aggressive first.
    fn shrink(&self) -> Box<dyn Iterator<Item = Self> + '_>;
}

impl<A: Clone> Shrink for Term<A> {
    /// Candidates, in order:
    /// 1. an empty leaf in place of a composite
    /// 2. each direct child on its own
    /// 3. this node with one child removed
    /// 4. this node with one child replaced by one of that child's shrinks
    /// 5. for keyed nodes, one key shortened, unless it would collide with a
    ///    sibling key
    /// 6. for leaves, shorter text
    ///
    /// Every candidate is smaller in `(nodes, composites, text chars)`, compared
    /// lexicographically. Text chars count leaf text and keys.
    fn shrink(&self) -> Box<dyn Iterator<Item = Self> + '_> {
        let annotation = self.annotation();
        let emptied = move || Term::new(annotation.clone(), Shape::Leaf(String::new()));
        match self.shape() {
            Shape::Leaf(text) => Box::new(
                shrink_text(text)
                    .into_iter()
                    .map(move |text| Term::new(annotation.clone(), Shape::Leaf(text))),
            ),

            Shape::Indexed(children) => {
                let rebuild = move |children: Vec<Term<A>>| {
                    Term::new(annotation.clone(), Shape::Indexed(children))
                };
                let hoisted = children.iter().cloned();
                let removed = (0..children.len()).map(move |i| {
                    let mut fewer = children.clone();
                    fewer.remove(i);
                    rebuild(fewer)
                });
                let nested = (0..children.len()).flat_map(move |i| {
                    children[i].shrink().map(move |smaller| {
                        let mut replaced = children.clone();
                        replaced[i] = smaller;
                        rebuild(replaced)
                    })
                });
                Box::new(
                    std::iter::once_with(emptied)
                        .chain(hoisted)
                        .chain(removed)
                        .chain(nested),
                )
            }

            Shape::Keyed(keyed) => {
                let entries = keyed.entries();
                let rebuild = move |entries: Vec<(String, Term<A>)>| {
                    Term::new(annotation.clone(), Shape::Keyed(Keyed::from_unique(entries)))
                };
                let hoisted = entries.iter().map(|(_, value)| value.clone());
                let removed = (0..entries.len()).map(move |i| {
                    let mut fewer = entries.to_vec();
                    fewer.remove(i);
                    rebuild(fewer)
                });
                let nested = (0..entries.len()).flat_map(move |i| {
                    entries[i].1.shrink().map(move |smaller| {
                        let mut replaced = entries.to_vec();
                        replaced[i].1 = smaller;
                        rebuild(replaced)
                    })
                });
                let rekeyed = (0..entries.len()).flat_map(move |i| {
                    shrink_text(&entries[i].0)
                        .into_iter()
                        .filter(move |key| entries.iter().all(|(other, _)| other != key))
                        .map(move |key| {
                            let mut renamed = entries.to_vec();
                            renamed[i].0 = key;
                            rebuild(renamed)
                        })
                });
                Box::new(
                    std::iter::once_with(emptied)
                        .chain(hoisted)
                        .chain(removed)
                        .chain(nested)
                        .chain(rekeyed),
                )
            }
        }
    }
}

/// Shorter versions of `text`: empty, first half, all but the last char.
fn shrink_text(text: &str) -> Vec<String> {
    let len = text.chars().count();
    let mut candidates = Vec::new();
    if len == 0 {
        return candidates;
    }
    candidates.push(String::new());

    let half = len / 2;
    if half > 0 {
        candidates.push(text.chars().take(half).collect());
    }
    if len - 1 > half {
        candidates.push(text.chars().take(len - 1).collect());
    }
    candidates
}

/// Greedily shrink `value` while `still_fails` holds, taking the first failing
/// candidate each round. Returns a value none of whose candidates fail.
pub fn minimize<T, F>(value: T, mut still_fails: F) -> T
where
    T: Shrink,
    F: FnMut(&T) -> bool,
{
    let mut current = value;
    let mut steps = 0usize;
    loop {
        let next = current.shrink().find(|candidate| still_fails(candidate));
        match next {
            Some(smaller) => {
                current = smaller;
                steps += 1;
            }
            None => {
                debug!("shrinking finished after {steps} steps");
                return current;
            }
        }
    }
}
