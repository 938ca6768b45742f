//! Runtime settings.
//!
//! Environment variables:
//! - `ATLAS_OWNERSHIP`: path to the ownership document (default: built-in)
//! - `ATLAS_TOPOLOGY`: path to the topology document (default: built-in)
//! - `ATLAS_PALETTE`: comma-separated SGR codes (default: [`DEFAULT_PALETTE`](crate::render::DEFAULT_PALETTE))
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" otherwise (default: pretty)
//!
//! Command-line flags override the environment.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::defaults::{builtin_ownership, builtin_topology};
use crate::documents::{AtlasDocuments, OwnershipDocument, TopologyDocument};
use crate::error::{AtlasError, AtlasResult};
use crate::render::Palette;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parse a format name; anything but `json` is pretty.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Ownership document path; `None` uses the built-in document.
    pub ownership: Option<PathBuf>,
    /// Topology document path; `None` uses the built-in document.
    pub topology: Option<PathBuf>,
    /// Color palette.
    pub palette: Palette,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> AtlasResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AtlasResult<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let palette = match non_empty("ATLAS_PALETTE") {
            Some(spec) => Palette::parse(&spec)?,
            None => Palette::default(),
        };

        Ok(Self {
            ownership: non_empty("ATLAS_OWNERSHIP").map(PathBuf::from),
            topology: non_empty("ATLAS_TOPOLOGY").map(PathBuf::from),
            palette,
            log_format: non_empty("LOG_FORMAT")
                .map(|value| LogFormat::parse(&value))
                .unwrap_or_default(),
        })
    }

    /// Load the configured documents, falling back to the built-in ones
    /// independently for each.
    pub fn documents(&self) -> AtlasResult<AtlasDocuments> {
        let ownership = match &self.ownership {
            Some(path) => OwnershipDocument::load(path)?,
            None => builtin_ownership()?,
        };
        let topology = match &self.topology {
            Some(path) => TopologyDocument::load(path)?,
            None => builtin_topology()?,
        };
        Ok(AtlasDocuments::new(ownership, topology))
    }

    /// Write `documents` back to the configured paths.
    ///
    /// # Errors
    /// - [`AtlasError::NoDocumentPath`] when either path is unset; the
    ///   built-in documents are never overwritten.
    pub fn persist(&self, documents: &AtlasDocuments) -> AtlasResult<()> {
        let ownership = self.ownership.as_deref().ok_or(AtlasError::NoDocumentPath("ownership"))?;
        let topology = self.topology.as_deref().ok_or(AtlasError::NoDocumentPath("topology"))?;
        documents.save(ownership, topology)?;
        info!(
            ownership = %ownership.display(),
            topology = %topology.display(),
            "documents saved"
        );
        Ok(())
    }

    /// Override the ownership path.
    pub fn with_ownership(mut self, path: impl AsRef<Path>) -> Self {
        self.ownership = Some(path.as_ref().to_path_buf());
        self
    }

    /// Override the topology path.
    pub fn with_topology(mut self, path: impl AsRef<Path>) -> Self {
        self.topology = Some(path.as_ref().to_path_buf());
        self
    }

    /// Override the palette.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}
