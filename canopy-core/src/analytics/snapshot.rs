//! Snapshot assembly: runs every aggregator once and merges the results.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cohort::{cohort_performance, CohortPerformance};
use super::collaborators::{collaborator_insights, CollaboratorInsight};
use super::forecast::{scenario_forecasts, yield_forecasts, ScenarioForecast, YieldForecast};
use super::geo::{geo_clusters, sustainability, GeoPlantationPoint, SustainabilitySummary};
use super::stage::{stage_breakdown, StageBreakdown};
use super::timeline::{monthly_points, MonthlyPoint};
use super::wallet::{wallet_performance, WalletPerformance};
use super::{mean, round_to};
use crate::config::AnalyticsConfig;
use crate::types::{Plantation, Stage};

/// Plantation count per region, over all plantations (mapped or not).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveRegion {
    pub region: String,
    pub count: usize,
}

/// A yield checkpoint with its plantation context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldTimelineEntry {
    pub plantation_id: String,
    pub seed_name: String,
    pub stage: Stage,
    pub date: DateTime<Utc>,
    pub event: String,
    pub yield_kg: f64,
}

/// The complete result of one engine invocation.
///
/// Field names and nesting are consumed by many independent panels and
/// exporters; treat them as a public contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total: usize,
    pub last_updated: DateTime<Utc>,
    pub stage_breakdown: Vec<StageBreakdown>,
    pub monthly_points: Vec<MonthlyPoint>,
    /// Mean planting-to-harvest days over harvested plantations
    pub average_days_to_harvest: Option<f64>,
    pub cohort_performance: Vec<CohortPerformance>,
    pub yield_forecasts: Vec<YieldForecast>,
    pub scenario_forecasts: Vec<ScenarioForecast>,
    pub geo_clusters: Vec<GeoPlantationPoint>,
    pub sustainability: SustainabilitySummary,
    pub wallet_performance: Vec<WalletPerformance>,
    pub collaborator_insights: Vec<CollaboratorInsight>,
    pub active_regions: Vec<ActiveRegion>,
    pub yield_timeline: Vec<YieldTimelineEntry>,
}

impl AnalyticsSnapshot {
    /// Whether the snapshot was built from zero plantations.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Sum of all base yield forecasts.
    pub fn total_forecast_kg(&self) -> f64 {
        round_to(
            self.yield_forecasts
                .iter()
                .map(|f| f.projected_yield_kg)
                .sum(),
            1,
        )
    }
}

fn active_regions(plantations: &[Plantation]) -> Vec<ActiveRegion> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for plantation in plantations {
        *counts.entry(plantation.region_label()).or_insert(0) += 1;
    }

    let mut regions: Vec<ActiveRegion> = counts
        .into_iter()
        .map(|(region, count)| ActiveRegion {
            region: region.to_string(),
            count,
        })
        .collect();
    regions.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.region.cmp(&b.region))
    });
    regions
}

fn flatten_yield_timeline(plantations: &[Plantation]) -> Vec<YieldTimelineEntry> {
    let mut entries: Vec<YieldTimelineEntry> = plantations
        .iter()
        .flat_map(|plantation| {
            plantation
                .yield_timeline
                .iter()
                .map(move |checkpoint| YieldTimelineEntry {
                    plantation_id: plantation.id.clone(),
                    seed_name: plantation.seed_name.clone(),
                    stage: plantation.stage,
                    date: checkpoint.date,
                    event: checkpoint.event.clone(),
                    yield_kg: checkpoint.yield_kg,
                })
        })
        .collect();

    entries.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.plantation_id.cmp(&b.plantation_id))
    });
    entries
}

/// Build a snapshot stamped with the current time.
pub fn build_analytics_snapshot(
    plantations: &[Plantation],
    config: &AnalyticsConfig,
) -> AnalyticsSnapshot {
    build_analytics_snapshot_at(plantations, config, Utc::now())
}

/// Build a snapshot stamped with `now`.
///
/// Apart from `last_updated`, the result depends only on `plantations` and
/// `config`, so repeated calls on unchanged input produce equal snapshots.
pub fn build_analytics_snapshot_at(
    plantations: &[Plantation],
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> AnalyticsSnapshot {
    let start = Instant::now();

    tracing::debug!(plantations = plantations.len(), "Building analytics snapshot");

    let forecasts = yield_forecasts(plantations, config);
    let scenarios = scenario_forecasts(&forecasts, config);
    let geo = geo_clusters(plantations, config);
    let sustainability_summary = sustainability(&geo.regions, config);
    let wallets = wallet_performance(plantations, &forecasts, config);

    let average_days_to_harvest = mean(plantations.iter().filter_map(Plantation::days_to_harvest))
        .map(|days| round_to(days, 1));

    let snapshot = AnalyticsSnapshot {
        total: plantations.len(),
        last_updated: now,
        stage_breakdown: stage_breakdown(plantations),
        monthly_points: monthly_points(plantations),
        average_days_to_harvest,
        cohort_performance: cohort_performance(plantations),
        yield_forecasts: forecasts,
        scenario_forecasts: scenarios,
        geo_clusters: geo.points,
        sustainability: sustainability_summary,
        wallet_performance: wallets,
        collaborator_insights: collaborator_insights(plantations),
        active_regions: active_regions(plantations),
        yield_timeline: flatten_yield_timeline(plantations),
    };

    tracing::info!(
        plantations = snapshot.total,
        mapped = snapshot.geo_clusters.len(),
        wallets = snapshot.wallet_performance.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Analytics snapshot built"
    );

    snapshot
}
