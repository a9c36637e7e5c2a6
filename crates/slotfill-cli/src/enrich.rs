//! `enrich` and `scaffold` commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use slotfill_core::{read_input, EnrichConfig, EnrichReport, IssueKind, LookupTable, Mode, Pipeline};

use crate::{SelectArgs, TargetArgs};

pub(crate) struct EnrichFlags {
    pub table: Option<PathBuf>,
    pub fallback: bool,
    pub repair_separators: bool,
    pub report_json: Option<PathBuf>,
    pub dry_run: bool,
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<EnrichConfig> {
    match path {
        Some(path) => EnrichConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EnrichConfig::default()),
    }
}

pub(crate) fn apply_select(config: &mut EnrichConfig, select: &SelectArgs) {
    if let Some(strategy) = select.strategy {
        config.strategy = strategy;
    }
    if let Some(policy) = select.policy {
        config.policy = Some(policy);
    }
}

pub(crate) fn build_pipeline(config: EnrichConfig) -> Result<Pipeline> {
    config
        .into_pipeline(&slotfill_catalog::default_layout(), slotfill_catalog::table_for)
        .context("invalid run configuration")
}

fn load_table(path: &Path) -> Result<LookupTable> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read table {}", path.display()))?;
    LookupTable::from_json_str(&text).with_context(|| format!("invalid table {}", path.display()))
}

pub fn cmd_enrich(target: &TargetArgs, select: &SelectArgs, flags: &EnrichFlags) -> Result<()> {
    let mut config = load_config(target.config.as_deref())?;
    apply_select(&mut config, select);
    config.mode = Mode::Enrich;
    config.repair_separators |= flags.repair_separators;
    if let Some(path) = &flags.table {
        config.table = Some(load_table(path)?);
    }
    if flags.fallback {
        config.fallback = Some(slotfill_catalog::steam_app_fallback());
    }

    let report = run_and_emit(target, config, flags.dry_run)?;
    if let Some(path) = &flags.report_json {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  {} {}", "→".cyan(), path.display());
    }
    Ok(())
}

pub fn cmd_scaffold(target: &TargetArgs, repair_separators: bool) -> Result<()> {
    let mut config = load_config(target.config.as_deref())?;
    config.mode = Mode::Scaffold;
    config.repair_separators |= repair_separators;
    run_and_emit(target, config, false)?;
    Ok(())
}

fn run_and_emit(target: &TargetArgs, config: EnrichConfig, dry_run: bool) -> Result<EnrichReport> {
    let pipeline = build_pipeline(config)?;
    let text = read_input(&target.input)
        .with_context(|| format!("cannot enrich {}", target.input.display()))?;

    eprintln!(
        "{} {} ({}, {}, {})",
        match pipeline.mode() {
            Mode::Enrich => "Enriching".green().bold(),
            Mode::Scaffold => "Scaffolding".green().bold(),
        },
        target.input.display(),
        pipeline.mode(),
        pipeline.strategy(),
        pipeline.policy()
    );
    let output = pipeline.run(&text)?;
    print_report(&output.report);

    if dry_run {
        eprintln!("{} dry run, nothing written", "info:".yellow().bold());
    } else {
        emit(target, &output.text, output.report.unchanged())?;
    }
    Ok(output.report)
}

fn emit(target: &TargetArgs, text: &str, unchanged: bool) -> Result<()> {
    if target.write {
        if unchanged {
            eprintln!("{} {}", "unchanged".yellow().bold(), target.input.display());
            return Ok(());
        }
        fs::write(&target.input, text)
            .with_context(|| format!("failed to write {}", target.input.display()))?;
        eprintln!(
            "{} {}",
            "wrote".green().bold(),
            target.input.display().to_string().bold()
        );
        return Ok(());
    }
    if let Some(out) = &target.out {
        fs::write(out, text).with_context(|| format!("failed to write {}", out.display()))?;
        eprintln!("{} {}", "wrote".green().bold(), out.display().to_string().bold());
        return Ok(());
    }
    print!("{text}");
    Ok(())
}

fn print_report(report: &EnrichReport) {
    let row = |label: &str, value: usize| eprintln!("  {} {label:<22}{value}", "→".cyan());

    row("records scanned", report.records_scanned);
    row("anchors resolved", report.anchors_resolved);
    if report.anchors_derived > 0 {
        row("  derived", report.anchors_derived);
    }
    row("slots written", report.slots_written);
    row("slots skipped", report.slots_skipped);
    if report.mode == Mode::Scaffold {
        row("placeholders inserted", report.placeholders_inserted);
    }
    if report.separators_repaired > 0 {
        row("separators repaired", report.separators_repaired);
    }
    row("unmatched anchors", report.unmatched);
    row("remaining sentinels", report.remaining_sentinels);

    for issue in report.issues_of(IssueKind::Unmatched) {
        eprintln!("  {} {issue}", "→".yellow());
    }
    for issue in report.issues_of(IssueKind::NoAnchor) {
        eprintln!("  {} {issue}", "→".yellow());
    }
    for issue in report.issues_of(IssueKind::Skipped) {
        eprintln!("  {} {issue}", "·".dimmed());
    }
    for issue in report.issues_of(IssueKind::Conflict) {
        eprintln!("  {} {issue}", "✗".red().bold());
    }
    for warning in &report.warnings {
        eprintln!("  {} {warning}", "warning:".yellow().bold());
    }
    for hazard in &report.hazards {
        eprintln!("  {} {hazard}", "hazard:".yellow().bold());
    }
    if report.unchanged() {
        eprintln!("  {} output identical to input ({})", "✓".green(), report.output_digest);
    }
}
