//! Command-line surface of oradump.
//!
//! Parsing is lenient: the single-dash `-conf` spelling is accepted,
//! unrecognized arguments are dropped (and reported back so the caller can
//! warn about them), and missing options fall back to their defaults.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Args, Parser};
use oradump_core::config::{DEFAULT_CONFIG_FILE, DumpOptions, SchemaDescriptor, load_schemas};
use oradump_core::dump::{RunSummary, dump_all};
use oradump_core::{DumpError, Result};
use std::ffi::OsString;
use std::path::PathBuf;

#[cfg(feature = "oracle")]
use oradump_core::catalog::oracle::OracleCatalog;

#[derive(Parser, Debug)]
#[command(name = "oradump")]
#[command(about = "Dump Oracle schemas to replayable DDL script trees")]
#[command(version)]
#[command(long_about = "
oradump - Oracle schema dumper

Reads a JSON list of schemas and, for every active entry, writes one DDL
script per object into a folder per object type, a log file, and a
__master.sql that replays all scripts against another schema:

  <output>/<folder_name>/
    tables/ views/ indexes/ sequences/ synonyms/ types/
    functions/ procedures/ packages/ triggers/
    db_<folder_name>.log
    __master.sql

CONFIGURATION (schemas.json):
  [{\"active\": true, \"folder_name\": \"hr\", \"tns\": \"PRODDB\",
    \"schema\": \"HR\", \"pwd\": \"...\", \"comment\": \"HR schema\"}]

  When pwd is missing or empty the password is prompted for.

EXAMPLES:
  oradump
  oradump -conf prod.json -o dumps
  oradump --no-tablespaces --summary run.json
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Schema configuration file
    #[arg(
        long = "conf",
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILE,
        help = "Schema configuration file (also accepted as -conf)"
    )]
    pub conf: PathBuf,

    /// Output root folder
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        default_value = ".",
        help = "Folder in which each schema's folder_name is created"
    )]
    pub output: PathBuf,

    /// Omit tablespace clauses
    #[arg(long, help = "Do not emit tablespace clauses for tables and key indexes")]
    pub no_tablespaces: bool,

    /// Run summary output
    #[arg(
        long,
        value_name = "FILE",
        help = "Also write the run summary with per-object status as JSON"
    )]
    pub summary: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}

impl Cli {
    /// Dump options selected on the command line.
    pub fn dump_options(&self) -> DumpOptions {
        DumpOptions::new()
            .with_output_root(self.output.clone())
            .with_tablespaces(!self.no_tablespaces)
    }
}

/// Rewrites `-conf` and `-conf=<path>` to their long form.
pub fn normalize_legacy_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-conf") => OsString::from("--conf"),
            Some(text) if text.starts_with("-conf=") => OsString::from(format!("-{text}")),
            _ => arg,
        })
        .collect()
}

/// Options that take a value, in every spelling accepted after normalization.
const VALUE_OPTIONS: [&str; 4] = ["--conf", "-o", "--output", "--summary"];

fn is_dangling(option: &str, next: Option<&OsString>) -> bool {
    if let Some(name) = option.strip_suffix('=') {
        return VALUE_OPTIONS.contains(&name);
    }
    VALUE_OPTIONS.contains(&option)
        && next.is_none_or(|value| {
            value
                .to_str()
                .is_some_and(|value| value.len() > 1 && value.starts_with('-'))
        })
}

/// Removes value options that have no value, so their defaults apply.
///
/// Returns the remaining arguments and the removed options.
pub fn drop_dangling_options(args: Vec<OsString>) -> (Vec<OsString>, Vec<String>) {
    let mut kept = Vec::with_capacity(args.len());
    let mut dropped = Vec::new();

    let mut iter = args.into_iter().peekable();
    while let Some(arg) = iter.next() {
        let dangling = arg
            .to_str()
            .is_some_and(|text| is_dangling(text, iter.peek()));
        if dangling {
            dropped.push(arg.to_string_lossy().into_owned());
        } else {
            kept.push(arg);
        }
    }

    (kept, dropped)
}

fn invalid_arg(error: &clap::Error) -> Option<String> {
    match error.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => Some(arg.clone()),
        _ => None,
    }
}

/// Parses the command line, dropping arguments clap does not know and
/// options given without a value.
///
/// Returns the parsed CLI and the dropped arguments.
///
/// # Errors
/// Returns the clap error for help and version requests and when an
/// argument is malformed rather than unknown.
pub fn try_parse_args<I>(args: I) -> std::result::Result<(Cli, Vec<String>), clap::Error>
where
    I: IntoIterator<Item = OsString>,
{
    let (mut args, mut ignored) = drop_dangling_options(normalize_legacy_args(args));

    loop {
        let error = match Cli::try_parse_from(&args) {
            Ok(cli) => return Ok((cli, ignored)),
            Err(error) => error,
        };

        if error.kind() != ErrorKind::UnknownArgument {
            return Err(error);
        }
        let Some(unknown) = invalid_arg(&error) else {
            return Err(error);
        };

        // Never drop the program name
        let position = args.iter().skip(1).position(|arg| {
            arg.to_str()
                .is_some_and(|text| text == unknown || text.starts_with(&format!("{unknown}=")))
        });
        let Some(position) = position else {
            return Err(error);
        };

        let removed = args.remove(position.saturating_add(1));
        ignored.push(removed.to_string_lossy().into_owned());
    }
}

/// Parses the command line, exiting on help, version or malformed input.
pub fn parse_args<I>(args: I) -> (Cli, Vec<String>)
where
    I: IntoIterator<Item = OsString>,
{
    try_parse_args(args).unwrap_or_else(|error| error.exit())
}

/// Prompts on the terminal for a schema's password.
///
/// # Errors
/// Returns error if no terminal is available.
pub fn prompt_password(schema: &SchemaDescriptor) -> Result<String> {
    rpassword::prompt_password(format!(
        "Password for {}@{}: ",
        schema.schema(),
        schema.data_source
    ))
    .map_err(|e| DumpError::configuration(format!("Failed to read password: {e}")))
}

#[cfg(feature = "oracle")]
fn connect(schema: &SchemaDescriptor) -> Result<OracleCatalog> {
    let mut credentials = schema.credentials.clone();
    if !credentials.has_password() {
        credentials.set_password(prompt_password(schema)?);
    }
    let catalog = OracleCatalog::connect(&schema.data_source, &credentials)?;
    tracing::info!("Connected: {}", catalog.safe_description());
    Ok(catalog)
}

#[cfg(not(feature = "oracle"))]
fn connect(_schema: &SchemaDescriptor) -> Result<oradump_core::MemoryCatalog> {
    Err(DumpError::configuration(
        "Oracle support not available. Compile with --features oracle",
    ))
}

/// Loads the configuration and dumps every active schema.
///
/// Object and schema failures are part of the returned summary; only
/// configuration problems are errors.
///
/// # Errors
/// Returns error if the configuration file cannot be read or parsed, the
/// output folder is unusable, or the summary file cannot be written.
pub fn run(cli: &Cli) -> Result<RunSummary> {
    let schemas = load_schemas(&cli.conf)?;
    let options = cli.dump_options();
    options.validate()?;

    tracing::info!(
        "Loaded {} schema entries from {}",
        schemas.len(),
        cli.conf.display()
    );

    let summary = dump_all(&schemas, &options, connect);

    if let Some(path) = &cli.summary {
        summary.save(path)?;
        tracing::info!("Run summary written to {}", path.display());
    }

    Ok(summary)
}
