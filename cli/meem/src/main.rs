//! mEEM CLI: validate, format and inspect EEPROM configuration documents.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{DocumentPaths, Overrides};
use manifest::MeemManifest;

#[derive(Parser)]
#[command(name = "meem", version, about = "mEEM EEPROM configuration tool")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Data model document (overrides meem.toml)
    #[arg(long, global = true)]
    datamodel: Option<PathBuf>,

    /// Platform settings document (overrides meem.toml)
    #[arg(long, global = true)]
    platform: Option<PathBuf>,

    /// Checksum settings document (overrides meem.toml)
    #[arg(long, global = true)]
    checksum: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project with starter documents
    Init {
        /// Project directory (also used as the project name)
        name: String,
    },
    /// Check the documents against every structural rule
    Validate {
        /// Output format (human, json)
        #[arg(long)]
        format: Option<String>,
    },
    /// Rewrite the documents in canonical form
    Fmt {
        /// Report documents that would change without writing them
        #[arg(long)]
        check: bool,
    },
    /// Print the block/parameter/bitfield tree
    Tree {
        /// Show integer defaults in hexadecimal
        #[arg(long)]
        hex: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = init_logging(&cli.log_level).and_then(|()| run(cli));
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(log_level: &str) -> anyhow::Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let overrides = Overrides {
        datamodel: cli.datamodel,
        platform: cli.platform,
        checksum: cli.checksum,
    };

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Validate { format } => {
            let paths = resolve_paths(&cwd, &overrides)?;
            let session = commands::load_session(&paths)?;
            commands::validate::run(&session, format.as_deref())
        }

        Commands::Fmt { check } => {
            let paths = resolve_paths(&cwd, &overrides)?;
            let session = commands::load_session(&paths)?;
            commands::fmt::run(&session, &paths, check)
        }

        Commands::Tree { hex } => {
            let paths = resolve_paths(&cwd, &overrides)?;
            let session = commands::load_session(&paths)?;
            commands::tree::run(&session, hex)
        }
    }
}

/// Document locations from the nearest manifest, or the working directory
/// when there is none.
fn resolve_paths(cwd: &Path, overrides: &Overrides) -> anyhow::Result<DocumentPaths> {
    let (manifest, project_dir) = load_manifest_optional(cwd)?;
    let project_dir = project_dir.unwrap_or_else(|| cwd.to_path_buf());
    Ok(DocumentPaths::resolve(&project_dir, manifest.as_ref(), overrides))
}

/// Try to load a manifest from the current directory upward. Returns (None, None) if not found.
fn load_manifest_optional(cwd: &Path) -> anyhow::Result<(Option<MeemManifest>, Option<PathBuf>)> {
    match MeemManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}
