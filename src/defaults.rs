//! Built-in dataset, used when no document paths are configured.

use crate::documents::{AtlasDocuments, OwnershipDocument, TopologyDocument};
use crate::error::AtlasResult;

/// Ownership document compiled into the binary.
pub const BUILTIN_OWNERSHIP: &str = include_str!("../data/ownership.json");

/// Topology document (edge list) compiled into the binary.
pub const BUILTIN_TOPOLOGY: &str = include_str!("../data/topology.json");

/// Parse the built-in ownership document.
pub fn builtin_ownership() -> AtlasResult<OwnershipDocument> {
    OwnershipDocument::from_json(BUILTIN_OWNERSHIP)
}

/// Parse the built-in topology document.
pub fn builtin_topology() -> AtlasResult<TopologyDocument> {
    TopologyDocument::from_json(BUILTIN_TOPOLOGY)
}

/// Both built-in documents.
pub fn builtin_documents() -> AtlasResult<AtlasDocuments> {
    Ok(AtlasDocuments::new(builtin_ownership()?, builtin_topology()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuildStats;
    use crate::render::Palette;

    #[test]
    fn test_builtin_dataset_builds_cleanly() {
        let docs = builtin_documents().unwrap();
        let (model, stats) = docs.builder().unwrap().build_with_stats();

        assert_eq!(model.len(), 65);
        assert_eq!(model.edge_count(), 76);
        assert_eq!(model.tiers().count(), 8);
        assert_eq!(stats, BuildStats { linked: 76, ..BuildStats::default() });
    }

    #[test]
    fn test_default_palette_covers_builtin_dataset() {
        let model = builtin_documents().unwrap().build().unwrap();
        assert!(Palette::default().check_covers(&model).is_ok());
    }

    #[test]
    fn test_builtin_first_tier_order() {
        let model = builtin_documents().unwrap().build().unwrap();
        let first = model.tiers().next().unwrap();
        let names: Vec<&str> = model.maps_in_tier(first).iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Frozen Cabins", "Overgrown Ruin", "Strand", "Terrace", "Whakawairua Tuahu"]
        );
    }
}
