//! Volume CLI - command-line harness for volume-scoped tool calls
//!
//! Provides subcommands for:
//! - `run`: validate and execute a tool-call document against a mesh file
//! - `validate`: check a document and list every violation
//! - `schema`: print the document JSON Schema or per-tool schemas
//! - `preview`: write a mesh of the volume one call is scoped to

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

/// Exit code for I/O and usage errors.
const HARNESS_ERROR: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "volume-cli", version)]
#[command(about = "Run volume-scoped tool-call documents against meshes", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate and execute a document against a mesh
    Run(commands::RunArgs),
    /// Validate a document without executing it
    Validate(commands::ValidateArgs),
    /// Print the JSON Schema for tool-call documents
    Schema(commands::SchemaArgs),
    /// Write a preview mesh of one call's volume
    Preview(commands::PreviewArgs),
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(HARNESS_ERROR)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Commands::Run(args) => commands::run(&args),
        Commands::Validate(args) => commands::validate(&args),
        Commands::Schema(args) => commands::schema(&args),
        Commands::Preview(args) => commands::preview(&args),
    };

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::from(HARNESS_ERROR)
        }
    }
}
