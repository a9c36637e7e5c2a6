//! Read-only commands: `check` and `table`.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use slotfill_core::{
    read_input, AnchorStrategy, EnrichConfig, LineArena, MatchPolicy, Resolver, ScanEvent,
};

use crate::enrich::{apply_select, build_pipeline};
use crate::SelectArgs;

pub fn cmd_check(input: &Path, select: &SelectArgs) -> Result<()> {
    let mut config = EnrichConfig::default();
    apply_select(&mut config, select);
    let pipeline = build_pipeline(config)?;
    let text =
        read_input(input).with_context(|| format!("cannot check {}", input.display()))?;

    println!(
        "{} {} ({}, {})",
        "Checking".green().bold(),
        input.display(),
        pipeline.strategy(),
        pipeline.policy()
    );

    let resolver = Resolver::new(pipeline.table(), pipeline.policy())?;
    let arena = LineArena::new(&text);
    let slots = pipeline.layout().slots();
    let (mut records, mut open, mut warnings) = (0usize, 0usize, 0usize);

    for event in pipeline.scan(&arena) {
        let record = match event {
            ScanEvent::Record(record) => record,
            ScanEvent::Warning(warning) => {
                warnings += 1;
                println!("  {} {warning}", "warning:".yellow().bold());
                continue;
            }
        };
        records += 1;

        let name = record.declared_name.as_deref().unwrap_or("?");
        println!(
            "#{:<3} line {:<5} {}",
            record.ordinal,
            record.start_line + 1,
            name.bold()
        );

        match pipeline.strategy().anchor_for(&record) {
            Some(anchor) => {
                let verdict = match resolver.resolve(&anchor) {
                    Some(r) if r.is_derived() => "derived".cyan(),
                    Some(_) => "resolves".green(),
                    None => "unmatched".yellow(),
                };
                println!("      anchor {} [{verdict}]", anchor.trim());
            }
            None => println!("      anchor {}", "none".yellow()),
        }

        for slot in &record.slots {
            let field = slots.get(slot.field).map_or("?", |f| f.name.as_str());
            let state = if slot.filled {
                "filled".green()
            } else {
                open += 1;
                "open".yellow()
            };
            println!("      {field:<12} line {:<5} {state}", slot.line + 1);
        }
        if record.slots.is_empty() {
            println!("      {}", "no slots".dimmed());
        }
    }

    let hazards = pipeline.table().specificity_hazards(pipeline.policy());
    for hazard in &hazards {
        println!("  {} {hazard}", "hazard:".yellow().bold());
    }
    println!(
        "{} records={records} open_slots={open} warnings={warnings} hazards={}",
        "ok".green().bold(),
        hazards.len()
    );
    Ok(())
}

pub fn cmd_table(strategy: AnchorStrategy, policy: Option<MatchPolicy>, json: bool) -> Result<()> {
    let table = slotfill_catalog::table_for(strategy);
    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    let policy = policy.unwrap_or_else(|| strategy.default_policy());
    println!(
        "{} {} entries ({strategy}, {policy})",
        "Table".green().bold(),
        table.len()
    );
    for (i, entry) in table.iter().enumerate() {
        println!("{i:>3}  {:<20} {} {}", entry.pattern, "→".cyan(), entry.values.join(" | "));
    }
    let hazards = table.specificity_hazards(policy);
    if hazards.is_empty() {
        println!("{} no specificity hazards", "ok".green().bold());
    }
    for hazard in &hazards {
        println!("  {} {hazard}", "hazard:".yellow().bold());
    }
    Ok(())
}
