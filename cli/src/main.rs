use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use option_resolver::Resolver;
use option_resolver_core::{
    OptionGroup, OptionSpec, ParseResult, RegistryDefinition, RequiredEntry, ResolverSettings,
};
use serde::Serialize;
use tracing::{debug, info};

mod logging;

/// Output format for parse results and registry summaries.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "optresolve", version)]
#[command(about = "Resolve command-line tokens against an option definition")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the tokens after `--` and print the resolved options.
    Parse(ParseArgs),
    /// Check a definition file for malformed names, clashes and bad defaults.
    Validate(ValidateArgs),
    /// Print the options, groups and required entries of a definition.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Definition file (YAML, or JSON with a .json extension).
    #[arg(long)]
    definition: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Treat the first unknown token and everything after it as positional.
    #[arg(long)]
    stop_at_non_option: bool,
    /// Only accept exact long option names.
    #[arg(long)]
    exact: bool,
    /// Value for an option absent from the tokens. Overrides the definition.
    #[arg(long = "default", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    defaults: Vec<(String, String)>,
    /// Tokens to resolve.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Definition file (YAML, or JSON with a .json extension).
    #[arg(long)]
    definition: PathBuf,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Definition file (YAML, or JSON with a .json extension).
    #[arg(long)]
    definition: PathBuf,
    /// Output format.
    #[arg(long, default_value = "yaml")]
    format: CliOutputFormat,
}

/// Serializable view of a [`ParseResult`].
#[derive(Debug, Serialize)]
struct ParseReport {
    options: Vec<OccurrenceReport>,
    args: Vec<String>,
}

#[derive(Debug, Serialize)]
struct OccurrenceReport {
    key: String,
    values: Vec<String>,
}

impl From<&ParseResult> for ParseReport {
    fn from(result: &ParseResult) -> Self {
        Self {
            options: result
                .iter()
                .map(|occurrence| OccurrenceReport {
                    key: occurrence.key(),
                    values: occurrence.values().to_vec(),
                })
                .collect(),
            args: result.args().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
struct InspectReport<'a> {
    options: &'a [OptionSpec],
    groups: &'a [OptionGroup],
    required: &'a [RequiredEntry],
    defaults: &'a BTreeMap<String, String>,
    settings: ResolverSettings,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Validate(args) => run_validate(args),
        Command::Inspect(args) => run_inspect(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let definition = load_definition(&args.definition)?;
    let registry = definition
        .build_registry()
        .map_err(|err| format!("Invalid definition '{}': {err}", args.definition.display()))?;

    let mut defaults = definition.defaults.clone();
    defaults.extend(args.defaults);

    let settings = definition.settings;
    let stop_at_non_option = settings.stop_at_non_option || args.stop_at_non_option;
    let resolver = Resolver::from_settings(&settings)
        .with_partial_matching(settings.partial_matching && !args.exact);
    debug!(
        tokens = args.tokens.len(),
        partial_matching = resolver.partial_matching(),
        stop_at_non_option,
        "Resolving tokens"
    );

    let result = resolver
        .resolve_full(&registry, &args.tokens, Some(&defaults), stop_at_non_option)
        .map_err(|err| err.to_string())?;
    info!(
        options = result.occurrences().len(),
        args = result.args().len(),
        "Resolved tokens"
    );

    print!("{}", render(&ParseReport::from(&result), args.format)?);
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let definition = load_definition(&args.definition)?;
    let errors = definition.validate();

    if !errors.is_empty() {
        for err in &errors {
            eprintln!("  {err}");
        }
        return Err(format!(
            "Found {} problem(s) in '{}'",
            errors.len(),
            args.definition.display()
        ));
    }

    let registry = definition
        .build_registry()
        .map_err(|err| format!("Invalid definition '{}': {err}", args.definition.display()))?;
    println!(
        "Validated '{}': {} option(s), {} group(s).",
        args.definition.display(),
        registry.len(),
        registry.groups().len()
    );
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let definition = load_definition(&args.definition)?;
    let registry = definition
        .build_registry()
        .map_err(|err| format!("Invalid definition '{}': {err}", args.definition.display()))?;

    let report = InspectReport {
        options: registry.options(),
        groups: registry.groups(),
        required: registry.required_entries(),
        defaults: &definition.defaults,
        settings: definition.settings,
    };
    print!("{}", render(&report, args.format)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reads a definition; `.json` files are parsed as JSON, anything else as YAML.
fn load_definition(path: &Path) -> Result<RegistryDefinition, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed: Result<RegistryDefinition, String> = if is_json {
        serde_json::from_str(&raw).map_err(|err| err.to_string())
    } else {
        serde_yaml::from_str(&raw).map_err(|err| err.to_string())
    };
    let definition =
        parsed.map_err(|err| format!("Failed to parse '{}': {err}", path.display()))?;

    debug!(path = %path.display(), "Loaded definition");
    Ok(definition)
}

fn render<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut out| {
                out.push('\n');
                out
            })
            .map_err(|e| format!("JSON serialization failed: {e}")),
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
