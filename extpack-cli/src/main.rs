//! Extpack CLI - Command-line interface
//!
//! Builds the `extension.vsixmanifest` and `[Content_Types].xml` parts of an
//! extension package from JSON manifest files.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use extpack::logging::{init_logging, level_for_verbosity};

use commands::build::BuildArgs;
use commands::common::SourceArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "extpack")]
#[command(version, about = "Generate extension package manifests", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, finalize and write the generated package parts
    Build {
        #[command(flatten)]
        source: SourceArgs,

        /// Directory the generated parts are written to
        #[arg(long, short, default_value = "out")]
        out: PathBuf,

        /// Write the parts even if validation fails
        #[arg(long)]
        skip_validation: bool,
    },

    /// Check the manifest files and report every violation
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Build {
            source,
            out,
            skip_validation,
        } => {
            commands::build::run(BuildArgs {
                source,
                out_dir: out,
                skip_validation,
            })
            .await
        }
        Commands::Validate { source } => commands::validate::run(source),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(level_for_verbosity(cli.verbose));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
