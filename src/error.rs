//! Error type shared by the builder, the model, documents and rendering.
//!
//! Every variant is fatal. Adjacency entries that name unknown maps are
//! *not* errors: the builder and `AtlasModel::add_map` skip them.

use std::path::PathBuf;

/// Result alias used across the crate.
pub type AtlasResult<T> = Result<T, AtlasError>;

/// Errors raised while loading, building, mutating or rendering an atlas.
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    /// A tier value was zero, negative or not an integer.
    #[error("Invalid tier for map `{map}`: {value} (tiers are positive integers)")]
    InvalidTier {
        /// Map the tier was declared for (or the tier key when no map is known).
        map: String,
        /// Offending value as it appeared in the input.
        value: String,
    },

    /// Neither document assigns a tier to this map.
    #[error("Map `{0}` has no tier in the ownership or topology document")]
    MissingTier(String),

    /// A document did not have one of the accepted shapes.
    #[error("Malformed {document} document: {source}")]
    Document {
        /// Which document failed (`ownership` or `topology`).
        document: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing a document failed.
    #[error("I/O error on `{}`: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// `add_map` was asked to create a map that already exists.
    #[error("Map `{0}` already exists")]
    DuplicateMap(String),

    /// A mutation named a map that is not in the atlas.
    #[error("Unknown map: `{0}`")]
    UnknownMap(String),

    /// An undiscovered count has no palette entry.
    #[error("Palette overflow at map `{map}`: undiscovered count {count} exceeds highest palette index {max}")]
    PaletteOverflow {
        /// Map whose count could not be colored.
        map: String,
        /// The undiscovered count (or degree bound) that overflowed.
        count: usize,
        /// Highest valid palette index.
        max: usize,
    },

    /// The palette has no entries at all.
    #[error("Palette is empty")]
    EmptyPalette,

    /// A palette entry is not an SGR parameter list such as `38;5;242`.
    #[error("Invalid palette entry: {0:?}")]
    InvalidPaletteEntry(String),

    /// Reading from or writing to the terminal failed.
    #[error("Terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),

    /// A mutation was requested but there is nowhere to write it back.
    #[error("Cannot persist changes: no {0} document path configured")]
    NoDocumentPath(&'static str),
}

impl AtlasError {
    /// Wrap a serde error for the ownership document.
    pub(crate) fn ownership(source: serde_json::Error) -> Self {
        Self::Document { document: "ownership", source }
    }

    /// Wrap a serde error for the topology document.
    pub(crate) fn topology(source: serde_json::Error) -> Self {
        Self::Document { document: "topology", source }
    }

    /// Whether this error belongs to the configuration family
    /// (raised before any output is produced).
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::PaletteOverflow { .. } | Self::Io { .. } | Self::Terminal(_))
    }
}
