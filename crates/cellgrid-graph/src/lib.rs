//! # cellgrid-graph
//!
//! A directed dependency graph over opaque string keys.
//!
//! The graph is a set of ordered pairs `(s, t)`, read as "t depends on s" /
//! "s must be evaluated before t". It knows nothing about spreadsheets; nodes
//! are just strings, and a node exists only as long as it participates in at
//! least one pair.
//!
//! Terminology, for a pair `(s, t)`:
//! - `t` is a *dependent* of `s` (something that depends on s)
//! - `s` is a *dependee* of `t` (something t depends on)
//!
//! ## Example
//!
//! ```rust
//! use cellgrid_graph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_dependency("A1", "B1"); // B1 depends on A1
//! graph.add_dependency("A1", "C1");
//!
//! assert_eq!(graph.size(), 2);
//! assert!(graph.dependents("A1").any(|t| t == "B1"));
//! assert!(graph.dependees("B1").any(|s| s == "A1"));
//! ```

use ahash::{AHashMap, AHashSet};

/// A set of ordered string pairs held as two mutually consistent adjacency
/// views, so both "who depends on s" and "what does t depend on" are O(1)
/// to reach and O(degree) to enumerate.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// s -> all t such that (s, t) is in the graph
    dependents: AHashMap<String, AHashSet<String>>,
    /// t -> all s such that (s, t) is in the graph
    dependees: AHashMap<String, AHashSet<String>>,
    /// Number of ordered pairs in the graph.
    size: usize,
}

impl DependencyGraph {
    /// Create an empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of ordered pairs in the graph.
    pub fn size(&self) -> usize {
        self.size
    }

    /// True if the graph contains no pairs.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Reports whether `dependents(s)` is non-empty.
    pub fn has_dependents(&self, s: &str) -> bool {
        self.dependents.contains_key(s)
    }

    /// Reports whether `dependees(t)` is non-empty.
    pub fn has_dependees(&self, t: &str) -> bool {
        self.dependees.contains_key(t)
    }

    /// Enumerates the dependents of `s`: every `t` with `(s, t)` in the graph.
    pub fn dependents(&self, s: &str) -> impl Iterator<Item = &str> {
        self.dependents
            .get(s)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Enumerates the dependees of `t`: every `s` with `(s, t)` in the graph.
    pub fn dependees(&self, t: &str) -> impl Iterator<Item = &str> {
        self.dependees
            .get(t)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Adds the ordered pair `(s, t)` if it is not already present.
    ///
    /// Read as: `t` depends on `s`; `s` must be evaluated before `t`.
    pub fn add_dependency(&mut self, s: &str, t: &str) {
        let newly_added = self
            .dependents
            .entry(s.to_string())
            .or_default()
            .insert(t.to_string());
        if !newly_added {
            return;
        }

        self.dependees
            .entry(t.to_string())
            .or_default()
            .insert(s.to_string());
        self.size += 1;
    }

    /// Removes the ordered pair `(s, t)` if it is present.
    pub fn remove_dependency(&mut self, s: &str, t: &str) {
        let removed = self.dependents.get_mut(s).is_some_and(|set| set.remove(t));
        if !removed {
            return;
        }
        if self.dependents.get(s).is_some_and(|set| set.is_empty()) {
            self.dependents.remove(s);
        }

        if let Some(set) = self.dependees.get_mut(t) {
            set.remove(s);
            if set.is_empty() {
                self.dependees.remove(t);
            }
        }
        self.size -= 1;
    }

    /// Removes every existing pair `(s, r)`, then adds `(s, t)` for each `t`
    /// in `new_dependents`. The prior edge set is fully replaced even when
    /// the new set is empty; a node with no current dependents just skips the
    /// removal phase.
    pub fn replace_dependents<I, S>(&mut self, s: &str, new_dependents: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let old: Vec<String> = self.dependents(s).map(str::to_string).collect();
        for t in old {
            self.remove_dependency(s, &t);
        }
        for t in new_dependents {
            self.add_dependency(s, t.as_ref());
        }
    }

    /// Removes every existing pair `(r, t)`, then adds `(s, t)` for each `s`
    /// in `new_dependees`. The prior edge set is fully replaced even when the
    /// new set is empty; a node with no current dependees just skips the
    /// removal phase.
    pub fn replace_dependees<I, S>(&mut self, t: &str, new_dependees: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let old: Vec<String> = self.dependees(t).map(str::to_string).collect();
        for s in old {
            self.remove_dependency(&s, t);
        }
        for s in new_dependees {
            self.add_dependency(s.as_ref(), t);
        }
    }
}
