//! Map identity, tier and node types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{AtlasError, AtlasResult};

/// Index of a map inside an [`AtlasModel`](crate::AtlasModel) arena.
///
/// Ids are only meaningful for the model that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapId(usize);

impl MapId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Display tier of a map. Always positive.
///
/// Tiers group maps for display only; they carry no topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Tier(u32);

impl Tier {
    /// Create a tier, rejecting zero.
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Validate a tier declared for `map`.
    pub fn for_map(map: &str, value: i64) -> AtlasResult<Self> {
        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| AtlasError::InvalidTier {
                map: map.to_string(),
                value: value.to_string(),
            })
    }

    /// Parse a tier from a document key such as `"3"`.
    pub fn parse_key(key: &str) -> Option<Self> {
        key.trim().parse::<u32>().ok().and_then(Self::new)
    }

    /// Numeric value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for Tier {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("tier must be a positive integer, got {value}"))
    }
}

impl From<Tier> for u32 {
    fn from(tier: Tier) -> Self {
        tier.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declaration of a map as supplied to the builder: `(name, tier, owned)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSpec {
    /// Case-sensitive map name.
    pub name: String,
    /// Display tier.
    pub tier: Tier,
    /// Whether the player already owns (has discovered) the map.
    pub owned: bool,
}

impl MapSpec {
    /// Create a new map declaration.
    pub fn new(name: impl Into<String>, tier: Tier, owned: bool) -> Self {
        Self {
            name: name.into(),
            tier,
            owned,
        }
    }
}

/// A map held by the atlas.
///
/// `neighbors` are keys into the owning model's arena; they never keep a
/// map alive on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapNode {
    /// Arena id of this map.
    pub id: MapId,
    /// Case-sensitive map name.
    pub name: String,
    /// Display tier.
    pub tier: Tier,
    /// Whether the player already owns the map.
    pub owned: bool,
    pub(crate) neighbors: BTreeSet<MapId>,
}

impl MapNode {
    pub(crate) fn new(id: MapId, spec: MapSpec) -> Self {
        Self {
            id,
            name: spec.name,
            tier: spec.tier,
            owned: spec.owned,
            neighbors: BTreeSet::new(),
        }
    }

    /// Ids of adjacent maps, ascending.
    pub fn neighbor_ids(&self) -> impl Iterator<Item = MapId> + '_ {
        self.neighbors.iter().copied()
    }

    /// Whether `other` is adjacent to this map.
    pub fn is_adjacent_to(&self, other: MapId) -> bool {
        self.neighbors.contains(&other)
    }

    /// Number of adjacent maps.
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }
}
