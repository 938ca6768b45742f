//! # atlas-tracker
//!
//! Discovery tracking for a tiered atlas of maps.
//!
//! The tracker answers one question per map:
//!
//! > How many of the maps adjacent to this one are still undiscovered?
//!
//! ## Core Contract
//!
//! 1. Build an undirected, symmetric adjacency graph from map declarations
//!    plus either a pair list or per-map adjacency lists
//! 2. Group maps by tier, keeping declaration order within each tier
//! 3. Compute each map's undiscovered neighbor count on demand
//!
//! ## Architecture
//!
//! ```text
//! Ownership doc ─┐
//!                ├→ AtlasDocuments → GraphBuilder → AtlasModel → render → stdout
//! Topology doc  ─┘                                      ↓
//!                                          add_map / set_owned → documents → disk
//! ```
//!
//! ## Tolerance Guarantees
//!
//! - Adjacency naming an unknown map is skipped, never an error
//! - Self-pairs are dropped
//! - A map declared twice takes its last declaration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;
pub mod model;
pub mod builder;
pub mod canonical;
pub mod snapshot;
pub mod documents;
pub mod defaults;
pub mod render;
pub mod prompt;
pub mod settings;

// Re-exports
pub use error::{AtlasError, AtlasResult};
pub use types::{MapId, Tier, MapSpec, MapNode, AdjacencyPair, AdjacencySpec};
pub use model::{AtlasModel, LinkOutcome};
pub use builder::{GraphBuilder, BuildStats, build};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use snapshot::AtlasSnapshot;
pub use documents::{AtlasDocuments, OwnershipDocument, TopologyDocument, TopologyEntry, TierBuckets};
pub use defaults::{builtin_documents, BUILTIN_OWNERSHIP, BUILTIN_TOPOLOGY};
pub use render::{
    Palette, Highlight, RenderOptions, TierSummary, MapEntry,
    summarize, format_tier, render_lines, DEFAULT_PALETTE,
};
pub use prompt::{prompt_new_map, NewMap};
pub use settings::{Settings, LogFormat};

/// Schema version for fingerprinted atlas data.
/// Increment on breaking changes to the snapshot layout.
pub const ATLAS_SCHEMA_VERSION: &str = "atlas_v1";
