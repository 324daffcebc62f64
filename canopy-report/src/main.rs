//! canopy-report - Plantation analytics report CLI
//!
//! Builds an analytics snapshot from exported plantation records and renders
//! it for the terminal, as Markdown, or as the raw JSON snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use canopy_core::analytics::{best_cohort, ScenarioKind};
use canopy_core::format::{
    format_days_opt, format_kg, format_kg_opt, format_relative_time_opt, format_tons, short_wallet,
};
use canopy_core::store::{JsonPlantationFile, PlantationSource};
use canopy_core::{build_analytics_snapshot, AnalyticsSnapshot, Config};
use chrono::Utc;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "canopy-report")]
#[command(about = "Plantation analytics and yield forecast report")]
#[command(version)]
struct Args {
    /// Plantation export (JSON array or persisted store document)
    input: PathBuf,

    /// Export format (md = markdown, json = JSON)
    #[arg(long)]
    export: Option<String>,

    /// Config file to use instead of ~/.config/canopy/config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rows to show in ranked sections
    #[arg(long, default_value_t = 5)]
    top: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };
    let _log_guard = canopy_core::logging::init(&config.logging).ok();

    let source = JsonPlantationFile::new(&args.input);
    let plantations = source
        .plantations()
        .with_context(|| format!("failed to load plantations from {}", source.describe()))?;
    tracing::info!(
        input = %source.path().display(),
        plantations = plantations.len(),
        "Generating report"
    );

    let snapshot = build_analytics_snapshot(&plantations, &config.analytics);

    match args.export.as_deref() {
        Some("json") => print_json(&snapshot)?,
        Some("md") => print_markdown(&snapshot, args.top),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
        None => print_terminal(&snapshot, args.top),
    }

    Ok(())
}

fn print_terminal(snapshot: &AnalyticsSnapshot, top: usize) {
    println!();
    println!("╭{}╮", "─".repeat(60));
    println!("│{:^60}│", "CANOPY PLANTATION REPORT");
    println!("╰{}╯", "─".repeat(60));
    println!();

    if snapshot.is_empty() {
        println!("  No plantations found.");
        println!();
        return;
    }

    println!("OVERVIEW");
    println!(
        "   Plantations: {:<10} Avg to harvest: {}",
        snapshot.total,
        format_days_opt(snapshot.average_days_to_harvest)
    );
    println!(
        "   Trees:       {:<10} Carbon offset:  {}",
        snapshot.sustainability.totals.tree_count,
        format_tons(snapshot.sustainability.totals.carbon_offset_tons)
    );
    println!(
        "   Area:        {:<10} Forecast:       {}",
        format!("{:.2} ha", snapshot.sustainability.totals.area_hectares),
        format_kg(snapshot.total_forecast_kg())
    );
    println!();

    println!("STAGES");
    for entry in &snapshot.stage_breakdown {
        let bar = "█".repeat((entry.percentage / 5) as usize);
        println!(
            "   {:<10} {:>4} {:>4}%  {}",
            entry.stage.display_name(),
            entry.count,
            entry.percentage,
            bar
        );
    }
    println!();

    if !snapshot.monthly_points.is_empty() {
        println!("VELOCITY");
        for point in &snapshot.monthly_points {
            println!(
                "   {:<10} planted {:>3}  harvested {:>3}",
                point.label, point.planted, point.harvested
            );
        }
        println!();
    }

    if let Some(best) = best_cohort(&snapshot.cohort_performance) {
        println!("BEST COHORT");
        println!(
            "   {} - {}% of {} harvested, {}",
            best.label,
            best.harvest_rate,
            best.planted,
            format_days_opt(best.average_days_to_harvest)
        );
        println!();
    }

    println!("FORECASTS");
    print!("   {:<20}", "");
    for kind in ScenarioKind::ALL {
        print!(" {:>12}", kind.display_name());
    }
    println!();
    for scenario in snapshot.scenario_forecasts.iter().take(top) {
        print!("   {:<20}", scenario.seed_name);
        for kind in ScenarioKind::ALL {
            let kg = scenario.get(kind).map(|s| s.projected_yield_kg);
            print!(" {:>12}", format_kg_opt(kg));
        }
        println!();
    }
    println!();

    if !snapshot.sustainability.per_region.is_empty() {
        println!("CARBON HOTSPOTS");
        for region in snapshot.sustainability.per_region.iter().take(top) {
            println!(
                "   {:<20} {:>6} trees  {}",
                region.region,
                region.tree_count,
                format_tons(region.carbon_offset_tons)
            );
        }
        println!();
    }

    println!("WALLETS");
    for wallet in snapshot.wallet_performance.iter().take(top) {
        println!(
            "   {:<14} {:>3} plantations  {:>10} forecast  {} active tasks",
            short_wallet(&wallet.wallet_address),
            wallet.total_plantations,
            format_kg(wallet.forecast_kg),
            wallet.active_tasks
        );
    }
    println!();

    if !snapshot.collaborator_insights.is_empty() {
        println!("COLLABORATORS");
        let now = Utc::now();
        for insight in snapshot.collaborator_insights.iter().take(top) {
            println!(
                "   {:<20} {:<16} {:>2} plantations  last note {}",
                insight.name,
                insight.role,
                insight.plantations,
                format_relative_time_opt(insight.last_updated, now)
            );
        }
        println!();
    }
}

fn print_markdown(snapshot: &AnalyticsSnapshot, top: usize) {
    println!("# Plantation Report");
    println!();

    if snapshot.is_empty() {
        println!("*No plantations found.*");
        return;
    }

    println!("## Summary");
    println!();
    println!("| Metric | Value |");
    println!("|--------|-------|");
    println!("| Plantations | {} |", snapshot.total);
    println!(
        "| Avg days to harvest | {} |",
        format_days_opt(snapshot.average_days_to_harvest)
    );
    println!("| Trees (mapped) | {} |", snapshot.sustainability.totals.tree_count);
    println!(
        "| Area | {:.2} ha |",
        snapshot.sustainability.totals.area_hectares
    );
    println!(
        "| Carbon offset | {} |",
        format_tons(snapshot.sustainability.totals.carbon_offset_tons)
    );
    println!("| Total forecast | {} |", format_kg(snapshot.total_forecast_kg()));
    println!();

    println!("## Stages");
    println!();
    for entry in &snapshot.stage_breakdown {
        println!(
            "- **{}:** {} ({}%)",
            entry.stage.display_name(),
            entry.count,
            entry.percentage
        );
    }
    println!();

    if !snapshot.cohort_performance.is_empty() {
        println!("## Cohorts");
        println!();
        println!("| Cohort | Planted | Harvested | Rate | Avg to harvest |");
        println!("|--------|---------|-----------|------|----------------|");
        for cohort in &snapshot.cohort_performance {
            println!(
                "| {} | {} | {} | {}% | {} |",
                cohort.label,
                cohort.planted,
                cohort.harvested,
                cohort.harvest_rate,
                format_days_opt(cohort.average_days_to_harvest)
            );
        }
        println!();
    }

    println!("## Yield Forecasts");
    println!();
    println!("| Plantation | Stage | Projected | Confidence | Basis |");
    println!("|------------|-------|-----------|------------|-------|");
    for forecast in snapshot.yield_forecasts.iter().take(top) {
        println!(
            "| {} | {} | {} | {} | {} |",
            forecast.seed_name,
            forecast.stage.display_name(),
            format_kg(forecast.projected_yield_kg),
            forecast.confidence,
            forecast.basis
        );
    }
    println!();

    if !snapshot.sustainability.per_region.is_empty() {
        println!("## Carbon Hotspots");
        println!();
        for region in snapshot.sustainability.per_region.iter().take(top) {
            println!(
                "- **{}** - {} trees, {} plantations, {}",
                region.region,
                region.tree_count,
                region.plantation_count,
                format_tons(region.carbon_offset_tons)
            );
        }
        println!();
    }

    println!("## Wallets");
    println!();
    println!("| Wallet | Plantations | Active tasks | Avg yield | Forecast |");
    println!("|--------|-------------|--------------|-----------|----------|");
    for wallet in snapshot.wallet_performance.iter().take(top) {
        println!(
            "| `{}` | {} | {} | {} | {} |",
            short_wallet(&wallet.wallet_address),
            wallet.total_plantations,
            wallet.active_tasks,
            format_kg_opt(wallet.avg_yield_kg),
            format_kg(wallet.forecast_kg)
        );
    }
    println!();

    println!("---");
    println!(
        "*Generated by canopy-report at {}*",
        snapshot.last_updated.format("%Y-%m-%d %H:%M UTC")
    );
}

fn print_json(snapshot: &AnalyticsSnapshot) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}
