//! Ownership and topology documents.
//!
//! ## Shapes
//!
//! | Document | Shape | Example |
//! |----------|-------|---------|
//! | Ownership | bucketed | `{"owned": {"1": ["Strand"]}, "not_owned": {"2": ["Carcass"]}}` |
//! | Ownership | flat | `{"Strand": true, "Carcass": false}` |
//! | Topology | edge list | `[["Strand", "Carcass"]]` |
//! | Topology | self-describing | `{"Strand": {"tier": 1, "adjacent": ["Carcass"]}}` |
//!
//! ## Merging
//!
//! - A self-describing topology fixes the roster order (its key order) and
//!   its tiers supersede the ownership document's. Maps it does not list
//!   but the ownership document does are appended afterwards.
//! - With an edge-list topology the roster is the ownership document:
//!   owned tiers ascending, then not-owned tiers ascending.
//! - A map missing from the ownership document is not owned.
//! - A map with no tier in either document is a configuration error.
//!
//! ## Saving
//!
//! Each document is written to a temporary file next to its target and
//! renamed into place. [`AtlasDocuments::save`] stages both files before
//! renaming either, so a failed save leaves both targets untouched.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::builder::GraphBuilder;
use crate::error::{AtlasError, AtlasResult};
use crate::model::AtlasModel;
use crate::types::{AdjacencySpec, MapSpec, Tier};

/// Tier number → map names in declaration order.
pub type TierBuckets = BTreeMap<Tier, Vec<String>>;

// ─────────────────────────────────────────────────────────────────────────────
// Ownership document
// ─────────────────────────────────────────────────────────────────────────────

/// Which maps the player owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOwnership", into = "RawOwnership")]
pub enum OwnershipDocument {
    /// Owned and not-owned buckets, each keyed by tier.
    Bucketed {
        /// Maps already owned.
        owned: TierBuckets,
        /// Maps not owned yet.
        not_owned: TierBuckets,
    },
    /// One ownership flag per name, in declaration order; tiers come
    /// from the topology.
    Flat(Vec<(String, bool)>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawOwnership {
    Bucketed(RawBuckets),
    Flat(serde_json::Map<String, serde_json::Value>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBuckets {
    #[serde(default, alias = "have")]
    owned: BTreeMap<String, Vec<String>>,
    #[serde(default, alias = "dont_have", alias = "not-owned")]
    not_owned: BTreeMap<String, Vec<String>>,
}

fn parse_buckets(raw: BTreeMap<String, Vec<String>>) -> AtlasResult<TierBuckets> {
    let mut buckets = TierBuckets::new();
    for (key, names) in raw {
        let tier = Tier::parse_key(&key).ok_or_else(|| AtlasError::InvalidTier {
            map: names.first().cloned().unwrap_or_else(|| "<empty tier>".to_string()),
            value: key.clone(),
        })?;
        // "01" and "1" land in the same bucket.
        buckets.entry(tier).or_default().extend(names);
    }
    Ok(buckets)
}

fn unparse_buckets(buckets: TierBuckets) -> BTreeMap<String, Vec<String>> {
    buckets
        .into_iter()
        .map(|(tier, names)| (tier.to_string(), names))
        .collect()
}

impl TryFrom<RawOwnership> for OwnershipDocument {
    type Error = AtlasError;

    fn try_from(raw: RawOwnership) -> Result<Self, Self::Error> {
        match raw {
            RawOwnership::Bucketed(buckets) => Ok(Self::Bucketed {
                owned: parse_buckets(buckets.owned)?,
                not_owned: parse_buckets(buckets.not_owned)?,
            }),
            RawOwnership::Flat(flags) => flags
                .into_iter()
                .map(|(name, value)| -> AtlasResult<(String, bool)> {
                    let owned = serde_json::from_value(value).map_err(AtlasError::ownership)?;
                    Ok((name, owned))
                })
                .collect::<AtlasResult<Vec<_>>>()
                .map(Self::Flat),
        }
    }
}

impl From<OwnershipDocument> for RawOwnership {
    fn from(doc: OwnershipDocument) -> Self {
        match doc {
            OwnershipDocument::Bucketed { owned, not_owned } => Self::Bucketed(RawBuckets {
                owned: unparse_buckets(owned),
                not_owned: unparse_buckets(not_owned),
            }),
            OwnershipDocument::Flat(flags) => Self::Flat(
                flags
                    .into_iter()
                    .map(|(name, owned)| (name, serde_json::Value::Bool(owned)))
                    .collect(),
            ),
        }
    }
}

/// One entry of the ownership roster.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OwnershipEntry {
    name: String,
    tier: Option<Tier>,
    owned: bool,
}

impl OwnershipDocument {
    /// Parse from JSON text.
    pub fn from_json(text: &str) -> AtlasResult<Self> {
        serde_json::from_str(text).map_err(AtlasError::ownership)
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> AtlasResult<String> {
        serde_json::to_string_pretty(self).map_err(AtlasError::ownership)
    }

    /// Read from a file.
    pub fn load(path: &Path) -> AtlasResult<Self> {
        Self::from_json(&read_file(path)?)
    }

    /// Write to a file as pretty JSON.
    pub fn save(&self, path: &Path) -> AtlasResult<()> {
        commit(path, stage(path, &self.to_json_pretty()?)?)
    }

    /// Roster in declaration order.
    fn entries(&self) -> Vec<OwnershipEntry> {
        match self {
            Self::Bucketed { owned, not_owned } => [(owned, true), (not_owned, false)]
                .into_iter()
                .flat_map(|(buckets, is_owned)| {
                    buckets.iter().flat_map(move |(tier, names)| {
                        names.iter().map(move |name| OwnershipEntry {
                            name: name.clone(),
                            tier: Some(*tier),
                            owned: is_owned,
                        })
                    })
                })
                .collect(),
            Self::Flat(flags) => flags
                .iter()
                .map(|(name, owned)| OwnershipEntry {
                    name: name.clone(),
                    tier: None,
                    owned: *owned,
                })
                .collect(),
        }
    }
}

impl Default for OwnershipDocument {
    fn default() -> Self {
        Self::Bucketed {
            owned: TierBuckets::new(),
            not_owned: TierBuckets::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Topology document
// ─────────────────────────────────────────────────────────────────────────────

/// One map of a self-describing topology.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopologyEntry {
    /// Tier, if the topology assigns one.
    pub tier: Option<Tier>,
    /// Names of adjacent maps.
    pub adjacent: Vec<String>,
}

/// How maps connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTopology", into = "RawTopology")]
pub enum TopologyDocument {
    /// Flat list of adjacent pairs.
    EdgeList(Vec<(String, String)>),
    /// Per-map tier and adjacency list, in declaration order.
    SelfDescribing(Vec<(String, TopologyEntry)>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawTopology {
    EdgeList(Vec<(String, String)>),
    SelfDescribing(serde_json::Map<String, serde_json::Value>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTopologyEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tier: Option<serde_json::Value>,
    #[serde(default)]
    adjacent: Vec<String>,
}

impl TryFrom<RawTopology> for TopologyDocument {
    type Error = AtlasError;

    fn try_from(raw: RawTopology) -> Result<Self, Self::Error> {
        match raw {
            RawTopology::EdgeList(pairs) => Ok(Self::EdgeList(pairs)),
            RawTopology::SelfDescribing(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (name, value) in entries {
                    let raw: RawTopologyEntry =
                        serde_json::from_value(value).map_err(AtlasError::topology)?;
                    let tier = match raw.tier {
                        None | Some(serde_json::Value::Null) => None,
                        Some(value) => {
                            let number = value.as_i64().ok_or_else(|| AtlasError::InvalidTier {
                                map: name.clone(),
                                value: value.to_string(),
                            })?;
                            Some(Tier::for_map(&name, number)?)
                        }
                    };
                    out.push((name, TopologyEntry { tier, adjacent: raw.adjacent }));
                }
                Ok(Self::SelfDescribing(out))
            }
        }
    }
}

impl From<TopologyDocument> for RawTopology {
    fn from(doc: TopologyDocument) -> Self {
        match doc {
            TopologyDocument::EdgeList(pairs) => Self::EdgeList(pairs),
            TopologyDocument::SelfDescribing(entries) => Self::SelfDescribing(
                entries
                    .into_iter()
                    .map(|(name, entry)| {
                        let raw = RawTopologyEntry {
                            tier: entry.tier.map(|tier| serde_json::Value::from(tier.get())),
                            adjacent: entry.adjacent,
                        };
                        let value = serde_json::to_value(raw).unwrap_or(serde_json::Value::Null);
                        (name, value)
                    })
                    .collect(),
            ),
        }
    }
}

impl TopologyDocument {
    /// Parse from JSON text.
    pub fn from_json(text: &str) -> AtlasResult<Self> {
        serde_json::from_str(text).map_err(AtlasError::topology)
    }

    /// Serialize as pretty JSON.
    pub fn to_json_pretty(&self) -> AtlasResult<String> {
        serde_json::to_string_pretty(self).map_err(AtlasError::topology)
    }

    /// Read from a file.
    pub fn load(path: &Path) -> AtlasResult<Self> {
        Self::from_json(&read_file(path)?)
    }

    /// Write to a file as pretty JSON.
    pub fn save(&self, path: &Path) -> AtlasResult<()> {
        commit(path, stage(path, &self.to_json_pretty()?)?)
    }

    /// Adjacency carried by this document.
    pub fn adjacency(&self) -> AdjacencySpec {
        match self {
            Self::EdgeList(pairs) => AdjacencySpec::Pairs(pairs.clone()),
            Self::SelfDescribing(entries) => AdjacencySpec::Lists(
                entries
                    .iter()
                    .map(|(name, entry)| (name.clone(), entry.adjacent.clone()))
                    .collect(),
            ),
        }
    }

    /// Whether this document assigns tiers itself.
    pub fn is_self_describing(&self) -> bool {
        matches!(self, Self::SelfDescribing(_))
    }
}

impl Default for TopologyDocument {
    fn default() -> Self {
        Self::EdgeList(Vec::new())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document pair
// ─────────────────────────────────────────────────────────────────────────────

/// The two documents an atlas is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtlasDocuments {
    /// Ownership document.
    pub ownership: OwnershipDocument,
    /// Topology document.
    pub topology: TopologyDocument,
}

impl AtlasDocuments {
    /// Pair two documents.
    pub fn new(ownership: OwnershipDocument, topology: TopologyDocument) -> Self {
        Self { ownership, topology }
    }

    /// Load both documents from files.
    pub fn load(ownership: &Path, topology: &Path) -> AtlasResult<Self> {
        Ok(Self::new(OwnershipDocument::load(ownership)?, TopologyDocument::load(topology)?))
    }

    /// Write both documents to files.
    ///
    /// Both are serialized and staged first; neither target changes unless
    /// both staged files were written.
    pub fn save(&self, ownership: &Path, topology: &Path) -> AtlasResult<()> {
        let staged_ownership = stage(ownership, &self.ownership.to_json_pretty()?)?;
        let staged_topology = stage(topology, &self.topology.to_json_pretty()?)?;
        commit(ownership, staged_ownership)?;
        commit(topology, staged_topology)
    }

    /// Merge both documents into map declarations, in roster order.
    ///
    /// # Errors
    /// - [`AtlasError::MissingTier`] when a map has no tier in either document.
    pub fn map_specs(&self) -> AtlasResult<Vec<MapSpec>> {
        let roster = self.ownership.entries();

        let TopologyDocument::SelfDescribing(entries) = &self.topology else {
            return roster
                .into_iter()
                .map(|entry| -> AtlasResult<MapSpec> {
                    let tier = entry.tier.ok_or_else(|| AtlasError::MissingTier(entry.name.clone()))?;
                    Ok(MapSpec::new(entry.name, tier, entry.owned))
                })
                .collect();
        };

        // Later ownership entries win, matching the builder's rule.
        let by_name: BTreeMap<&str, &OwnershipEntry> =
            roster.iter().map(|entry| (entry.name.as_str(), entry)).collect();

        let mut specs = Vec::with_capacity(entries.len() + roster.len());
        for (name, topo) in entries {
            let known = by_name.get(name.as_str());
            let tier = topo
                .tier
                .or_else(|| known.and_then(|entry| entry.tier))
                .ok_or_else(|| AtlasError::MissingTier(name.clone()))?;
            let owned = known.map(|entry| entry.owned).unwrap_or(false);
            specs.push(MapSpec::new(name.as_str(), tier, owned));
        }

        let listed: BTreeSet<&str> =
            entries.iter().map(|(name, _)| name.as_str()).collect();
        for entry in &roster {
            if listed.contains(entry.name.as_str()) {
                continue;
            }
            let tier = entry.tier.ok_or_else(|| AtlasError::MissingTier(entry.name.clone()))?;
            specs.push(MapSpec::new(entry.name.as_str(), tier, entry.owned));
        }

        Ok(specs)
    }

    /// Builder primed with both documents.
    pub fn builder(&self) -> AtlasResult<GraphBuilder> {
        Ok(GraphBuilder::new()
            .maps(self.map_specs()?)
            .adjacency(self.topology.adjacency()))
    }

    /// Build the atlas.
    pub fn build(&self) -> AtlasResult<AtlasModel> {
        Ok(self.builder()?.build())
    }

    /// Export an atlas as a bucketed ownership document and a
    /// self-describing topology document.
    ///
    /// Building from the exported pair reproduces the same tier layout,
    /// ownership and adjacency.
    pub fn from_model(model: &AtlasModel) -> Self {
        let mut owned = TierBuckets::new();
        let mut not_owned = TierBuckets::new();
        let mut entries = Vec::with_capacity(model.len());

        for map in model.maps() {
            let bucket = if map.owned { &mut owned } else { &mut not_owned };
            bucket.entry(map.tier).or_default().push(map.name.clone());

            let mut adjacent: Vec<String> = model.neighbors(map).map(|n| n.name.clone()).collect();
            adjacent.sort();
            entries.push((
                map.name.clone(),
                TopologyEntry { tier: Some(map.tier), adjacent },
            ));
        }

        Self::new(
            OwnershipDocument::Bucketed { owned, not_owned },
            TopologyDocument::SelfDescribing(entries),
        )
    }
}

fn read_file(path: &Path) -> AtlasResult<String> {
    std::fs::read_to_string(path).map_err(|source| AtlasError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `contents` to a temporary file in `path`'s directory.
fn stage(path: &Path, contents: &str) -> AtlasResult<NamedTempFile> {
    let io = |source: std::io::Error| AtlasError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(io)?;
    writeln!(file, "{contents}").map_err(io)?;
    file.as_file().sync_all().map_err(io)?;
    Ok(file)
}

/// Rename a staged file over `path`.
fn commit(path: &Path, staged: NamedTempFile) -> AtlasResult<()> {
    staged.persist(path).map_err(|err| AtlasError::Io {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    Ok(())
}
