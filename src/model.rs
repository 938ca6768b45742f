//! The atlas model: arena of maps, tier index and undiscovered counts.

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::error::{AtlasError, AtlasResult};
use crate::types::{AdjacencyPair, MapId, MapNode, MapSpec, Tier};

/// Outcome of linking two names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new undirected edge was added.
    Linked,
    /// The maps were already adjacent; nothing changed.
    AlreadyLinked,
    /// Both names are the same map; self-loops are never stored.
    SelfPair,
    /// At least one name is not in the atlas; the pair was skipped.
    Unresolved,
}

/// Owns every map of an atlas.
///
/// Maps live in an arena indexed by [`MapId`]. Names resolve through a
/// `BTreeMap` and the tier index keeps each tier's maps in declaration
/// order. Adjacency is always symmetric and free of self-loops.
#[derive(Debug, Clone, Default)]
pub struct AtlasModel {
    maps: Vec<MapNode>,
    by_name: BTreeMap<String, MapId>,
    tiers: BTreeMap<Tier, Vec<MapId>>,
}

impl AtlasModel {
    /// Create an empty atlas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a map, replacing any earlier map of the same name.
    ///
    /// A replaced map keeps its id and neighbors but takes the new tier and
    /// ownership, and moves to the end of its tier's list. Returns the id and
    /// whether an existing map was replaced.
    pub(crate) fn upsert(&mut self, spec: MapSpec) -> (MapId, bool) {
        if let Some(&id) = self.by_name.get(&spec.name) {
            self.detach_from_tier(id);
            let map = &mut self.maps[id.index()];
            map.tier = spec.tier;
            map.owned = spec.owned;
            self.tiers.entry(spec.tier).or_default().push(id);
            return (id, true);
        }

        let id = MapId::new(self.maps.len());
        self.by_name.insert(spec.name.clone(), id);
        self.tiers.entry(spec.tier).or_default().push(id);
        self.maps.push(MapNode::new(id, spec));
        (id, false)
    }

    fn detach_from_tier(&mut self, id: MapId) {
        let tier = self.maps[id.index()].tier;
        if let Some(list) = self.tiers.get_mut(&tier) {
            list.retain(|&other| other != id);
            if list.is_empty() {
                self.tiers.remove(&tier);
            }
        }
    }

    /// Make two named maps adjacent in both directions.
    ///
    /// Unknown names and self-pairs are skipped without error.
    pub fn link(&mut self, a: &str, b: &str) -> LinkOutcome {
        let (Some(&ia), Some(&ib)) = (self.by_name.get(a), self.by_name.get(b)) else {
            debug!(a, b, "skipping adjacency with unresolved map name");
            return LinkOutcome::Unresolved;
        };
        if ia == ib {
            debug!(map = a, "skipping self-adjacency");
            return LinkOutcome::SelfPair;
        }

        let fresh = self.maps[ia.index()].neighbors.insert(ib);
        self.maps[ib.index()].neighbors.insert(ia);
        if fresh {
            LinkOutcome::Linked
        } else {
            LinkOutcome::AlreadyLinked
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// Number of maps.
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Whether the atlas has no maps.
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Map by id.
    pub fn get(&self, id: MapId) -> Option<&MapNode> {
        self.maps.get(id.index())
    }

    /// Map by exact (case-sensitive) name.
    pub fn find(&self, name: &str) -> Option<&MapNode> {
        self.by_name.get(name).map(|id| &self.maps[id.index()])
    }

    /// Id of a map by name.
    pub fn id_of(&self, name: &str) -> Option<MapId> {
        self.by_name.get(name).copied()
    }

    /// Maps adjacent to `map`, ordered by id.
    pub fn neighbors<'a>(&'a self, map: &'a MapNode) -> impl Iterator<Item = &'a MapNode> + 'a {
        map.neighbor_ids().filter_map(move |id| self.get(id))
    }

    /// How many maps adjacent to `map` are not owned yet.
    ///
    /// Recomputed from current ownership on every call.
    pub fn undiscovered_count(&self, map: &MapNode) -> usize {
        self.neighbors(map).filter(|other| !other.owned).count()
    }

    /// Undiscovered count for a map by name.
    pub fn undiscovered_count_of(&self, name: &str) -> Option<usize> {
        self.find(name).map(|map| self.undiscovered_count(map))
    }

    /// Tier numbers present in the atlas, ascending.
    pub fn tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        self.tiers.keys().copied()
    }

    /// Maps in `tier`, in declaration order. Empty for an unknown tier.
    pub fn maps_in_tier(&self, tier: Tier) -> Vec<&MapNode> {
        self.tiers
            .get(&tier)
            .map(|ids| ids.iter().map(|id| &self.maps[id.index()]).collect())
            .unwrap_or_default()
    }

    /// Every map, tiers ascending, declaration order within a tier.
    pub fn maps(&self) -> impl Iterator<Item = &MapNode> + '_ {
        self.tiers
            .values()
            .flat_map(move |ids| ids.iter().map(move |id| &self.maps[id.index()]))
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.maps.iter().map(MapNode::degree).sum::<usize>() / 2
    }

    /// All edges as canonical name pairs, sorted.
    pub fn edges(&self) -> Vec<AdjacencyPair> {
        let mut edges: Vec<AdjacencyPair> = self
            .maps
            .iter()
            .flat_map(|map| {
                map.neighbor_ids()
                    .filter(move |other| *other > map.id)
                    .map(move |other| AdjacencyPair::new(map.name.as_str(), self.maps[other.index()].name.as_str()))
            })
            .collect();
        edges.sort();
        edges
    }

    /// Largest neighbor count of any map (0 for an empty atlas).
    ///
    /// This bounds every possible undiscovered count.
    pub fn max_degree(&self) -> usize {
        self.maps.iter().map(MapNode::degree).max().unwrap_or(0)
    }

    /// Number of maps owned so far.
    pub fn owned_count(&self) -> usize {
        self.maps.iter().filter(|map| map.owned).count()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Add a new map and connect it to the named maps.
    ///
    /// The map is appended to its tier (creating the tier if needed).
    /// Adjacent names that do not resolve are skipped, as in the builder.
    ///
    /// # Errors
    /// - [`AtlasError::DuplicateMap`] if `name` already exists.
    pub fn add_map<I, S>(&mut self, name: &str, tier: Tier, owned: bool, adjacent: I) -> AtlasResult<MapId>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.by_name.contains_key(name) {
            return Err(AtlasError::DuplicateMap(name.to_string()));
        }

        let (id, _) = self.upsert(MapSpec::new(name, tier, owned));
        let mut linked = 0usize;
        for other in adjacent {
            if self.link(name, other.as_ref()) == LinkOutcome::Linked {
                linked += 1;
            }
        }

        info!(map = name, tier = tier.get(), owned, linked, "added map");
        Ok(id)
    }

    /// Set a map's ownership flag. Returns the previous value.
    ///
    /// # Errors
    /// - [`AtlasError::UnknownMap`] if no map has that name.
    pub fn set_owned(&mut self, name: &str, owned: bool) -> AtlasResult<bool> {
        let id = self
            .id_of(name)
            .ok_or_else(|| AtlasError::UnknownMap(name.to_string()))?;
        let map = &mut self.maps[id.index()];
        let previous = std::mem::replace(&mut map.owned, owned);
        if previous != owned {
            info!(map = name, owned, "ownership changed");
        }
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(n: u32) -> Tier {
        Tier::new(n).unwrap()
    }

    fn abc() -> AtlasModel {
        let mut model = AtlasModel::new();
        model.upsert(MapSpec::new("A", tier(1), false));
        model.upsert(MapSpec::new("B", tier(1), true));
        model.upsert(MapSpec::new("C", tier(2), false));
        model.link("A", "B");
        model.link("A", "C");
        model
    }

    #[test]
    fn test_link_is_symmetric_and_idempotent() {
        let mut model = abc();
        let a = model.id_of("A").unwrap();
        let b = model.id_of("B").unwrap();

        assert!(model.get(a).unwrap().is_adjacent_to(b));
        assert!(model.get(b).unwrap().is_adjacent_to(a));

        assert_eq!(model.link("B", "A"), LinkOutcome::AlreadyLinked);
        assert_eq!(model.get(a).unwrap().degree(), 2);
        assert_eq!(model.edge_count(), 2);
    }

    #[test]
    fn test_self_pair_and_unresolved_skipped() {
        let mut model = abc();
        assert_eq!(model.link("A", "A"), LinkOutcome::SelfPair);
        assert_eq!(model.link("A", "Z"), LinkOutcome::Unresolved);
        assert_eq!(model.link("Y", "Z"), LinkOutcome::Unresolved);

        let a = model.find("A").unwrap();
        assert!(!a.is_adjacent_to(a.id));
        assert_eq!(a.degree(), 2);
    }

    #[test]
    fn test_undiscovered_counts() {
        let model = abc();
        assert_eq!(model.undiscovered_count_of("A"), Some(1));
        assert_eq!(model.undiscovered_count_of("B"), Some(1));
        assert_eq!(model.undiscovered_count_of("C"), Some(1));
        assert_eq!(model.undiscovered_count_of("Z"), None);
    }

    #[test]
    fn test_tier_order() {
        let model = abc();
        let tiers: Vec<u32> = model.tiers().map(|t| t.get()).collect();
        assert_eq!(tiers, vec![1, 2]);

        let names: Vec<&str> = model.maps_in_tier(tier(1)).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(model.maps_in_tier(tier(9)).is_empty());
    }

    #[test]
    fn test_upsert_last_write_wins() {
        let mut model = abc();
        let (id, replaced) = model.upsert(MapSpec::new("A", tier(2), true));
        assert!(replaced);
        assert_eq!(model.len(), 3);

        let a = model.get(id).unwrap();
        assert_eq!(a.tier, tier(2));
        assert!(a.owned);

        let t1: Vec<&str> = model.maps_in_tier(tier(1)).iter().map(|m| m.name.as_str()).collect();
        let t2: Vec<&str> = model.maps_in_tier(tier(2)).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(t1, vec!["B"]);
        assert_eq!(t2, vec!["C", "A"]);
    }

    #[test]
    fn test_upsert_drops_emptied_tier() {
        let mut model = abc();
        model.upsert(MapSpec::new("C", tier(1), false));
        assert_eq!(model.tiers().count(), 1);
    }

    #[test]
    fn test_add_map_rejects_duplicate() {
        let mut model = abc();
        let err = model.add_map("B", tier(3), false, ["A"]).unwrap_err();
        assert!(matches!(err, AtlasError::DuplicateMap(name) if name == "B"));
    }

    #[test]
    fn test_set_owned() {
        let mut model = abc();
        assert_eq!(model.set_owned("C", true).unwrap(), false);
        assert_eq!(model.undiscovered_count_of("A"), Some(0));
        assert!(matches!(model.set_owned("Z", true), Err(AtlasError::UnknownMap(_))));
    }

    #[test]
    fn test_edges_are_canonical() {
        let model = abc();
        let edges = model.edges();
        assert_eq!(edges, vec![AdjacencyPair::new("A", "B"), AdjacencyPair::new("A", "C")]);
    }
}
