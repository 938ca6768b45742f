//! Atlas tracker command-line entry point.
//!
//! Prints one line per tier, coloring each map by how many of its
//! neighbors are still undiscovered.
//!
//! ## Configuration
//!
//! Environment variables (see [`Settings`]):
//! - `ATLAS_OWNERSHIP`, `ATLAS_TOPOLOGY`: document paths (default: built-in dataset)
//! - `ATLAS_PALETTE`: comma-separated SGR codes
//! - `RUST_LOG`: Log level filter (default: atlas=warn)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: pretty)
//!
//! ## Usage
//!
//! ```bash
//! atlas --ownership maps.json --topology adjacent.json temple
//! atlas -o maps.json -t adjacent.json --found "Bone Crypt" --add
//! ```

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use atlas_tracker::{
    prompt_new_map, render_lines, AtlasDocuments, AtlasResult, AtlasSnapshot, Highlight,
    LogFormat, Palette, RenderOptions, Settings,
};

/// Initialize the tracing subscriber with JSON or pretty format.
///
/// Logs go to stderr so the rendered atlas on stdout stays clean.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "atlas=warn,atlas_tracker=warn".into());

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn command() -> Command {
    Command::new("atlas")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Shows which atlas maps border undiscovered maps.")
        .arg(
            Arg::new("highlight")
                .value_name("TEXT")
                .help("Emphasize maps whose name contains TEXT (case-insensitive)."),
        )
        .arg(
            Arg::new("ownership")
                .short('o')
                .long("ownership")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Ownership document (owned / not_owned buckets, or name -> bool)."),
        )
        .arg(
            Arg::new("topology")
                .short('t')
                .long("topology")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Topology document (pair list, or name -> {tier, adjacent})."),
        )
        .arg(
            Arg::new("palette")
                .short('p')
                .long("palette")
                .value_name("CODES")
                .help("Comma-separated SGR codes indexed by undiscovered count."),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .action(ArgAction::SetTrue)
                .help("Print without ANSI escapes."),
        )
        .arg(
            Arg::new("found")
                .short('f')
                .long("found")
                .value_name("MAP")
                .action(ArgAction::Append)
                .help(
                    "Mark MAP as owned and save the documents. Repeatable. \
                     Documents are rewritten in the bucketed ownership and \
                     self-describing topology shapes.",
                ),
        )
        .arg(
            Arg::new("add")
                .short('a')
                .long("add")
                .action(ArgAction::SetTrue)
                .help(
                    "Interactively add new maps and save the documents. \
                     Documents are rewritten in the bucketed ownership and \
                     self-describing topology shapes.",
                ),
        )
        .arg(
            Arg::new("fingerprint")
                .long("fingerprint")
                .action(ArgAction::SetTrue)
                .help("Print the atlas snapshot id after the summary."),
        )
}

/// What one invocation asks for, apart from [`Settings`].
#[derive(Debug, Clone, Default)]
struct Flags {
    highlight: Option<String>,
    found: Vec<String>,
    add: bool,
    plain: bool,
    fingerprint: bool,
}

impl Flags {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            highlight: matches.get_one::<String>("highlight").cloned(),
            found: matches
                .get_many::<String>("found")
                .map(|names| names.cloned().collect())
                .unwrap_or_default(),
            add: matches.get_flag("add"),
            plain: matches.get_flag("no-color"),
            fingerprint: matches.get_flag("fingerprint"),
        }
    }
}

fn settings(matches: &ArgMatches) -> AtlasResult<Settings> {
    let mut settings = Settings::from_env()?;
    if let Some(path) = matches.get_one::<PathBuf>("ownership") {
        settings = settings.with_ownership(path);
    }
    if let Some(path) = matches.get_one::<PathBuf>("topology") {
        settings = settings.with_topology(path);
    }
    if let Some(spec) = matches.get_one::<String>("palette") {
        settings = settings.with_palette(Palette::parse(spec)?);
    }
    Ok(settings)
}

/// Load, apply mutations, persist them, then render to `output`.
///
/// Changes are saved before rendering, so a palette overflow cannot
/// discard them.
fn run<R: BufRead, W: Write>(
    settings: &Settings,
    flags: &Flags,
    input: &mut R,
    output: &mut W,
) -> AtlasResult<()> {
    let mut model = settings.documents()?.build()?;
    let mut changed = false;

    for name in &flags.found {
        model.set_owned(name, true)?;
        changed = true;
    }

    if flags.add {
        while let Some(new_map) = prompt_new_map(input, output, &model)? {
            new_map.apply(&mut model)?;
            changed = true;
        }
    }

    if changed {
        settings.persist(&AtlasDocuments::from_model(&model))?;
    }

    let options = RenderOptions {
        palette: settings.palette.clone(),
        highlight: flags.highlight.as_deref().map(Highlight::new),
        plain: flags.plain,
    };
    let lines = render_lines(&model, &options)?;

    for line in &lines {
        writeln!(output, "{line}")?;
    }
    if flags.fingerprint {
        writeln!(output, "snapshot {}", AtlasSnapshot::compute(&model).snapshot_id)?;
    }

    info!(maps = model.len(), tiers = lines.len(), changed, "atlas rendered");
    Ok(())
}

fn main() -> ExitCode {
    let log_format = std::env::var("LOG_FORMAT")
        .map(|value| LogFormat::parse(&value))
        .unwrap_or_default();
    init_tracing(log_format);

    let matches = command().get_matches();
    let result = settings(&matches).and_then(|resolved| {
        let flags = Flags::from_matches(&matches);
        let stdin = std::io::stdin();
        run(&resolved, &flags, &mut stdin.lock(), &mut std::io::stdout().lock())
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "atlas failed");
            eprintln!("atlas: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_tracker::AtlasError;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn documents_in(dir: &TempDir) -> Settings {
        let ownership = dir.path().join("ownership.json");
        let topology = dir.path().join("topology.json");
        fs::write(&ownership, r#"{"owned": {"1": ["A"]}, "not_owned": {"1": ["B"], "2": ["C"]}}"#)
            .unwrap();
        fs::write(&topology, r#"[["A", "B"], ["B", "C"]]"#).unwrap();
        Settings::default().with_ownership(ownership).with_topology(topology)
    }

    fn run_with(settings: &Settings, flags: &Flags, input: &str) -> (AtlasResult<()>, String) {
        let mut output = Vec::new();
        let result = run(settings, flags, &mut Cursor::new(input), &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn test_repeatable_found() {
        let matches = command()
            .try_get_matches_from(["atlas", "--found", "Bog", "-f", "Maze", "--no-color", "temple"])
            .unwrap();
        let found: Vec<&String> = matches.get_many::<String>("found").unwrap().collect();
        assert_eq!(found, vec!["Bog", "Maze"]);
        assert!(matches.get_flag("no-color"));
        assert_eq!(matches.get_one::<String>("highlight").map(String::as_str), Some("temple"));
    }

    #[test]
    fn test_flags_from_matches() {
        let matches = command()
            .try_get_matches_from(["atlas", "-f", "Bog", "--add", "--fingerprint"])
            .unwrap();
        let flags = Flags::from_matches(&matches);
        assert_eq!(flags.found, vec!["Bog"]);
        assert!(flags.add && flags.fingerprint && !flags.plain);
        assert!(flags.highlight.is_none());
    }

    #[test]
    fn test_run_builtin_renders_without_saving() {
        let flags = Flags { plain: true, ..Flags::default() };
        let (result, output) = run_with(&Settings::default(), &flags, "");
        result.unwrap();
        assert_eq!(output.lines().count(), 8);
        assert!(output.starts_with("Tier  1: Frozen Cabins"));
    }

    #[test]
    fn test_run_refuses_to_mutate_builtin_data() {
        let flags = Flags { found: vec!["Strand".into()], plain: true, ..Flags::default() };
        let (result, output) = run_with(&Settings::default(), &flags, "");
        assert!(matches!(result, Err(AtlasError::NoDocumentPath("ownership"))));
        assert!(output.is_empty());
    }

    #[test]
    fn test_run_mutates_persists_then_renders() {
        let dir = TempDir::new().unwrap();
        let settings = documents_in(&dir);
        let flags = Flags {
            highlight: Some("d".into()),
            found: vec!["C".into()],
            add: true,
            plain: true,
            fingerprint: true,
        };

        let (result, output) = run_with(&settings, &flags, "D\n2\nn\nB\n\n");
        result.unwrap();

        let reloaded = settings.documents().unwrap().build().unwrap();
        assert!(reloaded.find("C").unwrap().owned);
        assert_eq!(reloaded.find("D").unwrap().degree(), 1);

        let lines: Vec<&str> = output.lines().collect();
        let rendered = &lines[lines.len() - 3..];
        assert!(rendered[0].ends_with("Tier  1: A (1) - B (1)"), "{output}");
        assert_eq!(rendered[1], "Tier  2: C (1) - *D (1)*");
        assert_eq!(
            rendered[2],
            format!("snapshot {}", AtlasSnapshot::compute(&reloaded).snapshot_id)
        );
    }

    #[test]
    fn test_run_saves_before_palette_check() {
        let dir = TempDir::new().unwrap();
        let settings = documents_in(&dir).with_palette(Palette::new(["37"]).unwrap());
        let flags = Flags { found: vec!["B".into()], plain: true, ..Flags::default() };

        let (result, output) = run_with(&settings, &flags, "");
        assert!(matches!(result, Err(AtlasError::PaletteOverflow { .. })));
        assert!(output.is_empty());

        let reloaded = settings.documents().unwrap().build().unwrap();
        assert!(reloaded.find("B").unwrap().owned);
    }
}
