//! Neighbor lookup over a sorted candidate list.
//!
//! Given candidates and a target, resolve the target's index (exact match,
//! else the nearest value) and report the entries immediately before and
//! after it. At either end of the list the missing neighbor is `None`; the
//! target is never repeated in a neighbor slot.

use std::collections::HashSet;
use std::hash::Hash;

/// Slot of an entry relative to the resolved target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Previous,
    Target,
    Next,
}

/// What the candidates are, which decides the slot labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Expiration dates: `before` / `target` / `after`
    Date,
    /// Strikes: `below` / `target` / `above`
    Strike,
}

impl Axis {
    pub fn label(&self, slot: Slot) -> &'static str {
        match (self, slot) {
            (_, Slot::Target) => "target",
            (Axis::Date, Slot::Previous) => "before",
            (Axis::Date, Slot::Next) => "after",
            (Axis::Strike, Slot::Previous) => "below",
            (Axis::Strike, Slot::Next) => "above",
        }
    }
}

/// Resolved target and its adjacent candidates
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbors<T> {
    pub previous: Option<T>,
    pub target: T,
    pub next: Option<T>,
    /// Index of `target` in the candidate list
    pub index: usize,
    /// True when the requested value was absent and the nearest one was used
    pub substituted: bool,
}

impl<T> Neighbors<T> {
    /// Present slots in order: previous, target, next
    pub fn slots(&self) -> impl Iterator<Item = (Slot, &T)> {
        [
            self.previous.as_ref().map(|v| (Slot::Previous, v)),
            Some((Slot::Target, &self.target)),
            self.next.as_ref().map(|v| (Slot::Next, v)),
        ]
        .into_iter()
        .flatten()
    }
}

/// Find `target` and its neighbors in `candidates`.
///
/// If `target` is not present, the candidate with the smallest `distance` is
/// used instead. Ties go to the first such candidate in iteration order.
/// Returns `None` only for an empty candidate list.
pub fn find_neighbors<T, D, F>(candidates: &[T], target: &T, distance: F) -> Option<Neighbors<T>>
where
    T: PartialEq + Clone,
    D: Ord,
    F: Fn(&T, &T) -> D,
{
    let (index, substituted) = match candidates.iter().position(|c| c == target) {
        Some(index) => (index, false),
        None => {
            let (index, _) = candidates
                .iter()
                .enumerate()
                .min_by_key(|(_, c)| distance(c, target))?;
            (index, true)
        }
    };

    let previous = index.checked_sub(1).map(|i| candidates[i].clone());
    let next = candidates.get(index + 1).cloned();

    Some(Neighbors {
        previous,
        target: candidates[index].clone(),
        next,
        index,
        substituted,
    })
}

/// Drop repeated values, keeping the first occurrence and the input order
pub fn dedup_in_order<T: Eq + Hash + Clone>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
