//! Interactive "add a map" dialogue.
//!
//! Generic over `BufRead`/`Write` so it can run against a terminal or a
//! scripted buffer. An empty name or end of input cancels.

use std::io::{BufRead, Write};

use crate::error::AtlasResult;
use crate::model::AtlasModel;
use crate::types::Tier;

/// A map collected from the prompt, ready for [`AtlasModel::add_map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMap {
    /// Map name.
    pub name: String,
    /// Display tier.
    pub tier: Tier,
    /// Whether the player owns it.
    pub owned: bool,
    /// Names of adjacent maps as typed.
    pub adjacent: Vec<String>,
}

impl NewMap {
    /// Add this map to `model`.
    pub fn apply(&self, model: &mut AtlasModel) -> AtlasResult<()> {
        model.add_map(&self.name, self.tier, self.owned, &self.adjacent)?;
        Ok(())
    }
}

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> AtlasResult<Option<String>> {
    write!(output, "{question}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for a new map's name, tier, ownership and neighbors.
///
/// Re-asks on an existing name or an invalid tier. Adjacent names the
/// atlas does not know are accepted and reported; they will be skipped
/// when the map is added.
pub fn prompt_new_map<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    model: &AtlasModel,
) -> AtlasResult<Option<NewMap>> {
    let name = loop {
        let Some(name) = ask(input, output, "Map name (empty to finish): ")? else {
            return Ok(None);
        };
        if name.is_empty() {
            return Ok(None);
        }
        if model.find(&name).is_none() {
            break name;
        }
        writeln!(output, "`{name}` is already in the atlas.")?;
    };

    let tier = loop {
        let Some(answer) = ask(input, output, "Tier: ")? else {
            return Ok(None);
        };
        match Tier::parse_key(&answer) {
            Some(tier) => break tier,
            None => writeln!(output, "Tier must be a positive integer.")?,
        }
    };

    let Some(answer) = ask(input, output, "Owned? [y/N]: ")? else {
        return Ok(None);
    };
    let owned = matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes");

    let Some(answer) = ask(input, output, "Adjacent maps (comma-separated): ")? else {
        return Ok(None);
    };
    let adjacent: Vec<String> = answer
        .split(',')
        .map(str::trim)
        .filter(|other| !other.is_empty())
        .map(str::to_string)
        .collect();

    for other in adjacent.iter().filter(|other| model.find(other).is_none()) {
        writeln!(output, "Note: `{other}` is not in the atlas and will be skipped.")?;
    }

    Ok(Some(NewMap { name, tier, owned, adjacent }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::types::{AdjacencySpec, MapSpec};
    use std::io::Cursor;

    fn model() -> AtlasModel {
        GraphBuilder::new()
            .map(MapSpec::new("A", Tier::new(1).unwrap(), false))
            .map(MapSpec::new("B", Tier::new(1).unwrap(), true))
            .adjacency(AdjacencySpec::from_pairs([("A", "B")]))
            .build()
    }

    fn run(script: &str) -> (Option<NewMap>, String) {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = prompt_new_map(&mut input, &mut output, &model()).unwrap();
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_full_dialogue() {
        let (new_map, _) = run("D\n1\nn\nA, Z\n");
        let new_map = new_map.unwrap();
        assert_eq!(new_map.name, "D");
        assert_eq!(new_map.tier.get(), 1);
        assert!(!new_map.owned);
        assert_eq!(new_map.adjacent, vec!["A", "Z"]);

        let mut atlas = model();
        new_map.apply(&mut atlas).unwrap();
        assert_eq!(atlas.find("D").unwrap().degree(), 1);
    }

    #[test]
    fn test_reasks_on_existing_name_and_bad_tier() {
        let (new_map, transcript) = run("A\nE\n0\nsix\n6\nyes\n\n");
        let new_map = new_map.unwrap();
        assert_eq!(new_map.name, "E");
        assert_eq!(new_map.tier.get(), 6);
        assert!(new_map.owned);
        assert!(new_map.adjacent.is_empty());
        assert!(transcript.contains("`A` is already in the atlas."));
        assert_eq!(transcript.matches("Tier must be a positive integer.").count(), 2);
    }

    #[test]
    fn test_cancel() {
        assert_eq!(run("\n").0, None);
        assert_eq!(run("").0, None);
        assert_eq!(run("D\n2\n").0, None);
    }

    #[test]
    fn test_unknown_neighbor_is_reported() {
        let (_, transcript) = run("D\n1\nn\nNowhere\n");
        assert!(transcript.contains("`Nowhere` is not in the atlas"));
    }
}
