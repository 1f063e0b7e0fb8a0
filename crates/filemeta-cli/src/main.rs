//! filemeta - per-file content policy checks
//!
//! Checks working-tree files or staged changes against the `.filemeta`
//! policy of a repository. Exits with status 1 when the batch is rejected.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filemeta_cli::{commands, OutputFormat, RunOptions};
use filemeta_core::config::CliOverrides;
use filemeta_core::tracing::{init_tracing, TracingWarnings};

/// filemeta - per-file content policy checks
#[derive(Parser, Debug)]
#[command(name = "filemeta")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Repository root
    #[arg(short = 'C', long, default_value = ".", global = true)]
    root: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Policy file to read, relative to the root (repeatable, read in order)
    #[arg(long = "pattern-file", global = true)]
    pattern_files: Vec<String>,

    /// Syntax for unprefixed patterns until a `syntax:` line
    #[arg(long, global = true)]
    default_syntax: Option<String>,

    /// Checks every matched file must run (comma separated)
    #[arg(long, value_delimiter = ',', global = true)]
    mandatory: Vec<String>,

    /// Keep going after the first rejected file and report all of them
    #[arg(long, global = true)]
    all: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check files in the working tree
    Check {
        /// Files to check, relative to the root
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Check the changes staged in the git index (pre-commit hook)
    Hook {
        /// Check the files touched by a revision range instead, as they are
        /// at its end (incoming-changes hook)
        #[arg(long, value_name = "OLD..NEW")]
        range: Option<String>,
    },

    /// Show the pattern and checks that apply to a path
    Explain {
        /// Path to look up
        path: PathBuf,
    },

    /// Print the merged policy in normalized form
    Fmt {
        /// Rewrite the first policy file in place
        #[arg(long)]
        write: bool,
    },
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        let non_empty = |values: &Vec<String>| (!values.is_empty()).then(|| values.clone());
        RunOptions {
            root: self.root.clone(),
            format: self.format,
            overrides: CliOverrides {
                pattern_files: non_empty(&self.pattern_files),
                default_syntax: self.default_syntax.clone(),
                mandatory: non_empty(&self.mandatory),
                fail_fast: self.all.then_some(false),
            },
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let opts = cli.run_options();
    let warnings = TracingWarnings;

    let (output, accepted) = match &cli.command {
        Commands::Check { paths } => {
            let outcome = commands::check(&opts, paths, &warnings)?;
            (outcome.output, outcome.accepted)
        }
        Commands::Hook { range } => {
            let outcome = commands::hook(&opts, range.as_deref(), &warnings)?;
            (outcome.output, outcome.accepted)
        }
        Commands::Explain { path } => (commands::explain(&opts, path, &warnings)?, true),
        Commands::Fmt { write } => {
            let text = commands::fmt(&opts, *write, &warnings)?;
            // with --write the file is the output
            (if *write { String::new() } else { text }, true)
        }
    };

    std::io::stdout()
        .write_all(output.as_bytes())
        .context("writing output")?;
    Ok(if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
