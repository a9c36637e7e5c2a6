//! Slotfill CLI
//!
//! Command-line interface for:
//! - Enriching catalog records in place (`enrich`)
//! - Inserting placeholder slots into records that have none (`scaffold`)
//! - Inspecting records, anchors and slots without writing (`check`)
//! - Printing the compiled-in lookup tables (`table`)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use slotfill_core::{AnchorStrategy, MatchPolicy};
use tracing_subscriber::EnvFilter;

mod enrich;
mod inspect;

#[derive(Parser)]
#[command(name = "slotfill")]
#[command(
    author,
    version,
    about = "Slotfill: fill empty slots of records embedded in source files"
)]
struct Cli {
    /// Increase log verbosity (`-v` info, `-vv` debug). `RUST_LOG` wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve each record's anchor and write values into its empty slots.
    ///
    /// Records whose slots are all filled are skipped; unmatched anchors are
    /// listed in the report and their records left byte-for-byte unchanged.
    Enrich {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        select: SelectArgs,
        /// Override the compiled-in lookup table with a JSON table file.
        #[arg(long)]
        table: Option<PathBuf>,
        /// Derive a Steam store link from `/apps/<id>/` when no entry matches.
        #[arg(long)]
        fallback: bool,
        /// Append missing `,` between literal field lines.
        #[arg(long)]
        repair_separators: bool,
        /// Write the run report as JSON.
        #[arg(long)]
        report_json: Option<PathBuf>,
        /// Plan and report, but write nothing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Insert sentinel placeholder slots into anchored records that have none.
    Scaffold {
        #[command(flatten)]
        target: TargetArgs,
        /// Append missing `,` between literal field lines.
        #[arg(long)]
        repair_separators: bool,
    },

    /// Scan only: print records, anchors, slot states and table hazards.
    Check {
        /// Input source file.
        input: PathBuf,
        #[command(flatten)]
        select: SelectArgs,
    },

    /// Print a compiled-in lookup table and its specificity hazards.
    Table {
        #[arg(long, default_value = "line-adjacency")]
        strategy: AnchorStrategy,
        /// Hazards are computed under this policy (defaults to the strategy's).
        #[arg(long)]
        policy: Option<MatchPolicy>,
        /// Emit the table as JSON (usable with `enrich --table`).
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub(crate) struct TargetArgs {
    /// Input source file.
    pub input: PathBuf,
    /// Write the result to this file (defaults to stdout).
    #[arg(short, long, conflicts_with = "write")]
    pub out: Option<PathBuf>,
    /// Overwrite the input file in-place.
    #[arg(long)]
    pub write: bool,
    /// JSON run configuration; command-line flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct SelectArgs {
    /// Anchor strategy: line-adjacency, declared-name or ordinal.
    #[arg(long)]
    pub strategy: Option<AnchorStrategy>,
    /// Match policy: first-declared, longest-pattern or exact-token.
    #[arg(long)]
    pub policy: Option<MatchPolicy>,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Enrich {
            target,
            select,
            table,
            fallback,
            repair_separators,
            report_json,
            dry_run,
        } => enrich::cmd_enrich(
            &target,
            &select,
            &enrich::EnrichFlags {
                table,
                fallback,
                repair_separators,
                report_json,
                dry_run,
            },
        ),
        Commands::Scaffold {
            target,
            repair_separators,
        } => enrich::cmd_scaffold(&target, repair_separators),
        Commands::Check { input, select } => inspect::cmd_check(&input, &select),
        Commands::Table {
            strategy,
            policy,
            json,
        } => inspect::cmd_table(strategy, policy, json),
    }
}
