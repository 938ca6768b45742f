//! Terminal rendering of an atlas.
//!
//! Each tier becomes one line:
//!
//! ```text
//! Tier  2: Bramble Valley (1) - Colosseum - Crimson Temple (2)
//! ```
//!
//! A map's color is the palette entry indexed by its undiscovered count;
//! a nonzero count is also printed after the name. The palette must cover
//! the atlas's maximum degree, which is checked before any line is built.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::error::{AtlasError, AtlasResult};
use crate::model::AtlasModel;
use crate::types::{MapNode, Tier};

/// Default palette, indexed by undiscovered count.
pub const DEFAULT_PALETTE: [&str; 7] = [
    "38;5;242", // 0, gray
    "38;5;111", // 1, blue
    "38;5;76",  // 2, green
    "38;5;166", // 3, orange
    "38;5;178", // 4, gold
    "38;5;203", // 5, red
    "38;5;201", // 6, magenta
];

const RESET: &str = "\x1b[0m";
const HIGHLIGHT_SGR: &str = "1;4";

static SGR_PARAMS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(;[0-9]+)*$").expect("valid SGR regex"));

/// Ordered ANSI SGR codes, one per undiscovered count starting at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    codes: Vec<String>,
}

impl Palette {
    /// Create a palette from SGR parameter lists (`"38;5;242"`).
    ///
    /// # Errors
    /// - [`AtlasError::EmptyPalette`] for no entries.
    /// - [`AtlasError::InvalidPaletteEntry`] for anything but digits and `;`.
    pub fn new<I, S>(codes: I) -> AtlasResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        if codes.is_empty() {
            return Err(AtlasError::EmptyPalette);
        }
        if let Some(bad) = codes.iter().find(|code| !SGR_PARAMS_RE.is_match(code)) {
            return Err(AtlasError::InvalidPaletteEntry(bad.clone()));
        }
        Ok(Self { codes })
    }

    /// Parse a comma-separated palette such as `38;5;242,38;5;111`.
    pub fn parse(spec: &str) -> AtlasResult<Self> {
        Self::new(spec.split(',').map(str::trim).filter(|code| !code.is_empty()))
    }

    /// Highest count this palette can color.
    pub fn max_index(&self) -> usize {
        self.codes.len() - 1
    }

    /// SGR code for `map` with undiscovered count `count`.
    pub fn code_for(&self, map: &MapNode, count: usize) -> AtlasResult<&str> {
        self.codes
            .get(count)
            .map(String::as_str)
            .ok_or_else(|| AtlasError::PaletteOverflow {
                map: map.name.clone(),
                count,
                max: self.max_index(),
            })
    }

    /// Fail unless every possible undiscovered count has a color.
    ///
    /// The bound is the maximum degree, so the check holds no matter how
    /// ownership changes later.
    pub fn check_covers(&self, model: &AtlasModel) -> AtlasResult<()> {
        let max = self.max_index();
        match model.maps().find(|map| map.degree() > max) {
            Some(map) => Err(AtlasError::PaletteOverflow {
                map: map.name.clone(),
                count: map.degree(),
                max,
            }),
            None => Ok(()),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            codes: DEFAULT_PALETTE.iter().map(|code| code.to_string()).collect(),
        }
    }
}

/// Case-insensitive substring filter on map names.
///
/// Both sides are compared in Unicode lowercase, so `STRÖM` finds
/// `Maelström of Chaos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    needle: String,
}

impl Highlight {
    /// Create a filter for `needle`.
    pub fn new(needle: &str) -> Self {
        Self { needle: needle.to_lowercase() }
    }

    /// Whether `name` contains the needle.
    pub fn matches(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.needle)
    }
}

/// One map as it will be displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    /// Map name.
    pub name: String,
    /// Whether the map is owned.
    pub owned: bool,
    /// Undiscovered neighbor count.
    pub undiscovered: usize,
    /// Whether the highlight filter matched.
    pub highlighted: bool,
    /// SGR code chosen for the count.
    pub code: String,
}

/// One tier's display line, before formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSummary {
    /// Tier number.
    pub tier: Tier,
    /// Maps in declaration order.
    pub entries: Vec<MapEntry>,
}

/// Rendering options.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Count → color mapping.
    pub palette: Palette,
    /// Optional name filter to emphasize.
    pub highlight: Option<Highlight>,
    /// Skip ANSI escapes; highlighted names are wrapped in `*` instead.
    pub plain: bool,
}

/// Compute the display data for every tier.
///
/// # Errors
/// - [`AtlasError::PaletteOverflow`] if the palette does not cover the
///   maximum degree. Nothing is produced in that case.
pub fn summarize(model: &AtlasModel, options: &RenderOptions) -> AtlasResult<Vec<TierSummary>> {
    options.palette.check_covers(model)?;

    model
        .tiers()
        .map(|tier| -> AtlasResult<TierSummary> {
            let entries = model
                .maps_in_tier(tier)
                .into_iter()
                .map(|map| -> AtlasResult<MapEntry> {
                    let undiscovered = model.undiscovered_count(map);
                    Ok(MapEntry {
                        name: map.name.clone(),
                        owned: map.owned,
                        undiscovered,
                        highlighted: options
                            .highlight
                            .as_ref()
                            .is_some_and(|h| h.matches(&map.name)),
                        code: options.palette.code_for(map, undiscovered)?.to_string(),
                    })
                })
                .collect::<AtlasResult<Vec<_>>>()?;
            Ok(TierSummary { tier, entries })
        })
        .collect()
}

fn format_entry(entry: &MapEntry, plain: bool) -> String {
    let label = if entry.undiscovered > 0 {
        format!("{} ({})", entry.name, entry.undiscovered)
    } else {
        entry.name.clone()
    };

    match (plain, entry.highlighted) {
        (true, false) => label,
        (true, true) => format!("*{label}*"),
        (false, false) => format!("\x1b[{}m{label}{RESET}", entry.code),
        (false, true) => format!("\x1b[{HIGHLIGHT_SGR};{}m{label}{RESET}", entry.code),
    }
}

/// Format one tier line.
pub fn format_tier(summary: &TierSummary, plain: bool) -> String {
    let maps: Vec<String> = summary
        .entries
        .iter()
        .map(|entry| format_entry(entry, plain))
        .collect();
    format!("Tier {:2}: {}", summary.tier.get(), maps.join(" - "))
}

/// Render every tier line.
pub fn render_lines(model: &AtlasModel, options: &RenderOptions) -> AtlasResult<Vec<String>> {
    Ok(summarize(model, options)?
        .iter()
        .map(|summary| format_tier(summary, options.plain))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::types::{AdjacencySpec, MapSpec};

    fn spec(name: &str, tier: u32, owned: bool) -> MapSpec {
        MapSpec::new(name, Tier::new(tier).unwrap(), owned)
    }

    fn abc() -> AtlasModel {
        GraphBuilder::new()
            .maps([spec("A", 1, false), spec("B", 1, true), spec("C", 2, false)])
            .adjacency(AdjacencySpec::from_pairs([("A", "B"), ("A", "C")]))
            .build()
    }

    fn plain() -> RenderOptions {
        RenderOptions { plain: true, ..RenderOptions::default() }
    }

    #[test]
    fn test_plain_lines() {
        let lines = render_lines(&abc(), &plain()).unwrap();
        assert_eq!(lines, vec!["Tier  1: A (1) - B (1)", "Tier  2: C (1)"]);
    }

    #[test]
    fn test_colored_line_uses_count_index() {
        let mut model = abc();
        model.set_owned("C", true).unwrap();
        let lines = render_lines(&model, &RenderOptions::default()).unwrap();
        assert_eq!(
            lines[0],
            "Tier  1: \x1b[38;5;242mA\x1b[0m - \x1b[38;5;111mB (1)\x1b[0m"
        );
    }

    #[test]
    fn test_highlight_is_case_insensitive() {
        let highlight = Highlight::new("b");
        assert!(highlight.matches("Bramble Valley"));
        assert!(highlight.matches("Bog"));
        assert!(!highlight.matches("Atoll"));

        let options = RenderOptions { highlight: Some(highlight), ..plain() };
        let lines = render_lines(&abc(), &options).unwrap();
        assert_eq!(lines[0], "Tier  1: A (1) - *B (1)*");
    }

    #[test]
    fn test_highlight_takes_needle_literally() {
        let highlight = Highlight::new("Olmec's (");
        assert!(highlight.matches("olmec's (sanctum)"));
        assert!(!highlight.matches("Olmec"));
    }

    #[test]
    fn test_highlight_folds_non_ascii_case() {
        assert!(Highlight::new("STRÖM").matches("Maelström of Chaos"));
        assert!(Highlight::new("maelström").matches("MAELSTRÖM OF CHAOS"));
        assert!(!Highlight::new("strom").matches("Maelström of Chaos"));
    }

    #[test]
    fn test_palette_overflow_is_fatal() {
        let palette = Palette::new(["38;5;242"]).unwrap();
        let options = RenderOptions { palette, ..plain() };
        let err = render_lines(&abc(), &options).unwrap_err();
        assert!(matches!(err, AtlasError::PaletteOverflow { ref map, count: 2, max: 0 } if map == "A"));
    }

    #[test]
    fn test_palette_parsing() {
        assert_eq!(Palette::parse("1;31, 32").unwrap().max_index(), 1);
        assert!(matches!(Palette::parse(""), Err(AtlasError::EmptyPalette)));
        assert!(matches!(Palette::parse("red"), Err(AtlasError::InvalidPaletteEntry(_))));
        assert!(matches!(
            Palette::parse("31,;32"),
            Err(AtlasError::InvalidPaletteEntry(ref bad)) if bad == ";32"
        ));
        assert_eq!(Palette::default().max_index(), DEFAULT_PALETTE.len() - 1);
    }

    #[test]
    fn test_empty_atlas_renders_nothing() {
        assert!(render_lines(&AtlasModel::new(), &plain()).unwrap().is_empty());
    }
}
