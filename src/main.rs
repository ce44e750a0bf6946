//! badm CLI entry point.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

use badm::commands::{extension, list, select, set};
use badm::{paths, ui};

#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "BADM_LOG";

#[derive(Parser)]
#[command(name = "badm")]
#[command(about = "Inspect and annotate redb databases")]
#[command(version)]
struct Cli {
    /// Configuration file (default: $BADM_CONFIG or ~/.badm)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log load and registration steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the database file to operate on
    #[command(visible_alias = "s")]
    Select {
        /// Path to an existing database file
        path: PathBuf,
    },
    /// List buckets with their key and value types
    #[command(visible_alias = "b")]
    Buckets,
    /// List the decoded keys of a bucket
    #[command(visible_alias = "k")]
    Keys { bucket: String },
    /// List the decoded values of a bucket
    #[command(visible_alias = "v")]
    Values { bucket: String },
    /// List the decoded keys and values of a bucket
    #[command(visible_alias = "kv")]
    KeyValues { bucket: String },
    /// Assign a type to a bucket's keys or values
    Set {
        #[command(subcommand)]
        action: SetAction,
    },
    /// Remove all type assignments of a bucket
    #[command(visible_alias = "c")]
    Clear { bucket: String },
    /// List registered types
    #[command(visible_alias = "t")]
    Types,
    /// Manage extension modules
    #[command(visible_aliases = ["plugin", "p"])]
    Extension {
        #[command(subcommand)]
        action: ExtensionAction,
    },
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum SetAction {
    /// Type of the bucket's keys (empty resets to `string`)
    #[command(visible_alias = "kt")]
    KeyType {
        bucket: String,
        #[arg(help = TYPE_NAME_HELP)]
        type_name: String,
    },
    /// Type of the bucket's values (empty resets to `hex`)
    #[command(visible_alias = "vt")]
    ValueType {
        bucket: String,
        #[arg(help = TYPE_NAME_HELP)]
        type_name: String,
    },
}

const TYPE_NAME_HELP: &str =
    "string, hex, base64, uint64, or a type added by an extension (see `badm types`)";

#[derive(Subcommand)]
enum ExtensionAction {
    /// Print the name of each extension
    #[command(visible_alias = "l")]
    List,
    /// Add a module (.wasm or .wat)
    #[command(visible_alias = "a")]
    Add { path: PathBuf },
    /// Remove a module reference
    #[command(visible_alias = "rm")]
    Remove { path: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        ui::print_error(&err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "badm", &mut io::stdout());
        return Ok(());
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => paths::get_config_path()?,
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Select { path } => {
            let selected = select::execute(&config_path, &path)?;
            writeln!(out, "Selected {}", selected.display())?;
        },
        Commands::Buckets => list::buckets(&config_path, &mut out)?,
        Commands::Keys { bucket } => {
            list::entries(&config_path, &bucket, list::Entries::Keys, &mut out)?;
        },
        Commands::Values { bucket } => {
            list::entries(&config_path, &bucket, list::Entries::Values, &mut out)?;
        },
        Commands::KeyValues { bucket } => {
            list::entries(&config_path, &bucket, list::Entries::KeyValues, &mut out)?;
        },
        Commands::Set { action } => match action {
            SetAction::KeyType { bucket, type_name } => {
                set::execute(&config_path, &bucket, set::Side::Key, &type_name)?;
            },
            SetAction::ValueType { bucket, type_name } => {
                set::execute(&config_path, &bucket, set::Side::Value, &type_name)?;
            },
        },
        Commands::Clear { bucket } => set::clear(&config_path, &bucket)?,
        Commands::Types => list::types(&config_path, &mut out)?,
        Commands::Extension { action } => match action {
            ExtensionAction::List => extension::list(&config_path, &mut out)?,
            ExtensionAction::Add { path } => extension::add(&config_path, &path)?,
            ExtensionAction::Remove { path } => extension::remove(&config_path, &path)?,
        },
        Commands::Completions { .. } => {},
    }

    out.flush()?;
    Ok(())
}

/// Log to stderr so listings on stdout stay clean.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}
