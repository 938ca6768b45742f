//! Adjacency input shapes for the graph builder.

use serde::{Deserialize, Serialize};

/// An unordered pair of adjacent map names.
///
/// Stored in canonical order (lexicographically smaller name first), so
/// `("A", "B")` and `("B", "A")` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AdjacencyPair {
    /// Lexicographically smaller name.
    pub low: String,
    /// Lexicographically larger name.
    pub high: String,
}

impl AdjacencyPair {
    /// Create a canonical pair from two names in any order.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Whether both ends name the same map.
    pub fn is_self_pair(&self) -> bool {
        self.low == self.high
    }
}

/// Adjacency data in either of the two accepted shapes.
///
/// Both shapes describe the same undirected relation: a pair listed once
/// (in either direction) or twice is the same edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdjacencySpec {
    /// Flat sequence of `(a, b)` pairs.
    Pairs(Vec<(String, String)>),
    /// Each map name with the names adjacent to it, in declaration order.
    Lists(Vec<(String, Vec<String>)>),
}

impl AdjacencySpec {
    /// No adjacency at all.
    pub fn empty() -> Self {
        Self::Pairs(Vec::new())
    }

    /// Build the pair shape from anything yielding name pairs.
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self::Pairs(pairs.into_iter().map(|(a, b)| (a.into(), b.into())).collect())
    }

    /// Build the list shape from anything yielding `(name, adjacent names)`.
    pub fn from_lists<I, N, L, M>(lists: I) -> Self
    where
        I: IntoIterator<Item = (N, L)>,
        N: Into<String>,
        L: IntoIterator<Item = M>,
        M: Into<String>,
    {
        Self::Lists(
            lists
                .into_iter()
                .map(|(name, adjacent)| (name.into(), adjacent.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }

    /// Every `(a, b)` pair described, in input order, directions as given.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        match self {
            Self::Pairs(pairs) => pairs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect(),
            Self::Lists(lists) => lists
                .iter()
                .flat_map(|(name, adjacent)| {
                    adjacent.iter().map(move |other| (name.as_str(), other.as_str()))
                })
                .collect(),
        }
    }

    /// Number of raw entries (before deduplication).
    pub fn len(&self) -> usize {
        match self {
            Self::Pairs(pairs) => pairs.len(),
            Self::Lists(lists) => lists.iter().map(|(_, adjacent)| adjacent.len()).sum(),
        }
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AdjacencySpec {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_unordered() {
        assert_eq!(AdjacencyPair::new("Strand", "Carcass"), AdjacencyPair::new("Carcass", "Strand"));
        assert!(AdjacencyPair::new("Bog", "Bog").is_self_pair());
    }

    #[test]
    fn test_lists_flatten_to_pairs() {
        let spec = AdjacencySpec::from_lists([("A", vec!["B", "C"]), ("B", vec!["A"])]);
        assert_eq!(spec.pairs(), vec![("A", "B"), ("A", "C"), ("B", "A")]);
        assert_eq!(spec.len(), 3);
        assert!(AdjacencySpec::empty().is_empty());
    }
}
