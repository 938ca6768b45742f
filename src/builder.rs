//! Graph construction from map declarations and adjacency data.
//!
//! ## Rules
//!
//! - Maps are declared before any adjacency is resolved, so adjacency
//!   order never matters.
//! - A name declared twice: the last declaration wins (tier, ownership and
//!   position within its tier).
//! - Every adjacency entry is undirected; listing a pair in one direction,
//!   both directions or several times yields the same single edge.
//! - Self-pairs are dropped; pairs naming an undeclared map are skipped.

use tracing::{info, warn};

use crate::error::AtlasResult;
use crate::model::{AtlasModel, LinkOutcome};
use crate::snapshot::AtlasSnapshot;
use crate::types::{AdjacencySpec, MapSpec, Tier};

/// Counters describing one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Map declarations that replaced an earlier one with the same name.
    pub overridden: usize,
    /// Adjacency entries that created an edge.
    pub linked: usize,
    /// Adjacency entries that repeated an existing edge.
    pub duplicate_edges: usize,
    /// Adjacency entries naming the same map twice.
    pub self_pairs: usize,
    /// Adjacency entries naming an undeclared map.
    pub unresolved: usize,
}

/// Collects map declarations and adjacency, then builds an [`AtlasModel`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    maps: Vec<MapSpec>,
    adjacency: Vec<AdjacencySpec>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a map.
    pub fn map(mut self, spec: MapSpec) -> Self {
        self.maps.push(spec);
        self
    }

    /// Declare several maps, in order.
    pub fn maps(mut self, specs: impl IntoIterator<Item = MapSpec>) -> Self {
        self.maps.extend(specs);
        self
    }

    /// Declare a map from a raw tier value, failing fast on a bad tier.
    pub fn declare(self, name: &str, tier: i64, owned: bool) -> AtlasResult<Self> {
        let tier = Tier::for_map(name, tier)?;
        Ok(self.map(MapSpec::new(name, tier, owned)))
    }

    /// Add adjacency data. May be called several times with either shape.
    pub fn adjacency(mut self, spec: AdjacencySpec) -> Self {
        self.adjacency.push(spec);
        self
    }

    /// Build the atlas.
    pub fn build(self) -> AtlasModel {
        self.build_with_stats().0
    }

    /// Build the atlas and report what happened along the way.
    pub fn build_with_stats(self) -> (AtlasModel, BuildStats) {
        let mut model = AtlasModel::new();
        let mut stats = BuildStats::default();

        for spec in self.maps {
            let name = spec.name.clone();
            let (_, replaced) = model.upsert(spec);
            if replaced {
                warn!(map = %name, "map declared more than once; last declaration wins");
                stats.overridden += 1;
            }
        }

        for spec in &self.adjacency {
            for (a, b) in spec.pairs() {
                match model.link(a, b) {
                    LinkOutcome::Linked => stats.linked += 1,
                    LinkOutcome::AlreadyLinked => stats.duplicate_edges += 1,
                    LinkOutcome::SelfPair => stats.self_pairs += 1,
                    LinkOutcome::Unresolved => stats.unresolved += 1,
                }
            }
        }

        info!(
            maps = model.len(),
            edges = model.edge_count(),
            tiers = model.tiers().count(),
            unresolved = stats.unresolved,
            snapshot_id = %AtlasSnapshot::compute(&model).snapshot_id,
            "atlas built"
        );

        (model, stats)
    }
}

/// Build an atlas from `(name, tier, owned)` declarations and adjacency.
pub fn build(maps: impl IntoIterator<Item = MapSpec>, adjacency: AdjacencySpec) -> AtlasModel {
    GraphBuilder::new().maps(maps).adjacency(adjacency).build()
}
