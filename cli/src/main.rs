#![deny(missing_docs)]

//! # Propschema CLI
//!
//! Command line front end for the type resolution core.
//!
//! Supported Commands:
//! - `classify`: Resolves type expressions into schema descriptors.
//! - `definitions`: Resolves type expressions and builds every definition they reference.

use clap::{Parser, Subcommand};
use propschema_core::{AppResult, TypeRegistry};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod classify;
mod definitions;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Type expression to schema resolver")]
struct Cli {
    /// Registry manifest (YAML, or JSON by `.json` extension).
    #[clap(long, global = true, env = "PROPSCHEMA_REGISTRY")]
    registry: Option<PathBuf>,

    /// Raise log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` wins when set.
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve type expressions into schema descriptors.
    Classify(classify::ClassifyArgs),
    /// Build the schema definitions referenced by type expressions.
    Definitions(definitions::DefinitionsArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the registry manifest, or an empty registry when none is given.
pub(crate) fn load_registry(path: Option<&Path>) -> AppResult<TypeRegistry> {
    match path {
        Some(path) => TypeRegistry::from_path(path),
        None => {
            tracing::debug!("no registry manifest given, using an empty registry");
            Ok(TypeRegistry::new())
        }
    }
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = load_registry(cli.registry.as_deref())?;

    match &cli.command {
        Commands::Classify(args) => {
            println!("{}", classify::execute(args, &registry)?);
        }
        Commands::Definitions(args) => {
            definitions::execute(args, &registry)?;
        }
    }

    Ok(())
}
