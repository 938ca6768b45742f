//! Core types for the atlas graph.

pub mod map;
pub mod adjacency;

pub use map::{MapId, Tier, MapSpec, MapNode};
pub use adjacency::{AdjacencyPair, AdjacencySpec};
