//! Atlas fingerprint for detecting layout and topology changes.
//!
//! An `AtlasSnapshot` hashes everything that shapes the rendered summary:
//! the tier layout (with declaration order), ownership, and the edge set.
//! Two builds from the same documents always share a `snapshot_id`.

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use crate::model::AtlasModel;
use crate::types::AdjacencyPair;
use crate::ATLAS_SCHEMA_VERSION;

/// A deterministic fingerprint of an atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasSnapshot {
    /// Unique identifier for this snapshot (xxh64 of all components).
    pub snapshot_id: String,
    /// Total number of maps.
    pub map_count: u64,
    /// Number of owned maps.
    pub owned_count: u64,
    /// Total number of undirected edges.
    pub edge_count: u64,
    /// Schema version used for types.
    pub schema_version: String,
    /// Hash of the tier layout: `(tier, [(name, owned)])` in display order.
    pub layout_hash: String,
    /// Hash of the sorted canonical edge pairs.
    pub edge_pair_hash: String,
}

impl AtlasSnapshot {
    /// Compute a snapshot of the atlas's current state.
    pub fn compute(model: &AtlasModel) -> Self {
        let layout: Vec<(u32, Vec<(&str, bool)>)> = model
            .tiers()
            .map(|tier| {
                let maps = model
                    .maps_in_tier(tier)
                    .into_iter()
                    .map(|map| (map.name.as_str(), map.owned))
                    .collect();
                (tier.get(), maps)
            })
            .collect();
        let layout_hash = canonical_hash_hex(&layout);

        let edges: Vec<AdjacencyPair> = model.edges();
        let edge_pair_hash = canonical_hash_hex(&edges);

        let id_input = SnapshotIdInput {
            map_count: model.len() as u64,
            owned_count: model.owned_count() as u64,
            edge_count: edges.len() as u64,
            schema_version: ATLAS_SCHEMA_VERSION,
            layout_hash: &layout_hash,
            edge_pair_hash: &edge_pair_hash,
        };
        let snapshot_id = canonical_hash_hex(&id_input);

        Self {
            snapshot_id,
            map_count: id_input.map_count,
            owned_count: id_input.owned_count,
            edge_count: id_input.edge_count,
            schema_version: ATLAS_SCHEMA_VERSION.to_string(),
            layout_hash,
            edge_pair_hash,
        }
    }

    /// Whether `model` still matches this snapshot.
    pub fn verify(&self, model: &AtlasModel) -> bool {
        self.snapshot_id == Self::compute(model).snapshot_id
    }
}

/// Internal struct for computing snapshot_id hash.
#[derive(Serialize)]
struct SnapshotIdInput<'a> {
    map_count: u64,
    owned_count: u64,
    edge_count: u64,
    schema_version: &'a str,
    layout_hash: &'a str,
    edge_pair_hash: &'a str,
}
