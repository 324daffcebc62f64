//! Yield forecasting and best/base/worst scenario projection.
//!
//! ## Model
//!
//! Every plantation gets exactly one forecast. The basis depends on how much
//! yield history it has:
//!
//! | Checkpoints | Projection | Confidence |
//! |-------------|------------|------------|
//! | 2+ | latest yield extrapolated by stage progress | `high` if trending up, else `medium` |
//! | 1 | the single checkpoint, extrapolated | `medium` |
//! | 0 | cohort average yield per tree × trees | `medium` |
//! | 0, no cohort peers | global average yield per tree × trees | `low` |
//! | 0, no history anywhere | configured default yield per tree × trees | `low` |
//!
//! Stage progress is `elapsed / expected_cycle_days`, clamped to
//! `[min_stage_progress, 1]`; harvested plantations are always at 1.
//!
//! Scenarios scale the base projection by the configured best/worst
//! multipliers and otherwise share the base forecast's date and confidence.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::timeline::MonthKey;
use super::{mean, round_to};
use crate::config::AnalyticsConfig;
use crate::types::{Plantation, Stage, YieldCheckpoint};

/// How much the forecast should be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastConfidence {
    High,
    Medium,
    Low,
}

impl ForecastConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastConfidence::High => "high",
            ForecastConfidence::Medium => "medium",
            ForecastConfidence::Low => "low",
        }
    }
}

impl std::fmt::Display for ForecastConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Projected yield for one plantation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldForecast {
    /// Plantation ID
    pub id: String,
    pub seed_name: String,
    pub stage: Stage,
    pub projected_yield_kg: f64,
    pub projection_date: DateTime<Utc>,
    pub confidence: ForecastConfidence,
    /// Human-readable justification, shown verbatim in the UI. Never empty.
    pub basis: String,
    /// Number of usable checkpoints behind the projection
    pub checkpoint_count: usize,
}

/// Scenario variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Best,
    Base,
    Worst,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Best,
        ScenarioKind::Base,
        ScenarioKind::Worst,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ScenarioKind::Best => "Best case",
            ScenarioKind::Base => "Base case",
            ScenarioKind::Worst => "Worst case",
        }
    }
}

/// One scenario projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub projected_yield_kg: f64,
    pub projection_date: DateTime<Utc>,
    pub confidence: ForecastConfidence,
}

/// Best/base/worst projections for one plantation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioForecast {
    /// Plantation ID
    pub id: String,
    pub seed_name: String,
    pub stage: Stage,
    /// Ordered best, base, worst
    pub scenarios: Vec<Scenario>,
}

impl ScenarioForecast {
    /// Look up a scenario by kind.
    pub fn get(&self, kind: ScenarioKind) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.kind == kind)
    }
}

/// Per-tree yield averages used when a plantation has no checkpoints.
struct FallbackYields {
    /// (planting month, stage) -> (mean kg per tree, peer count)
    cohort: HashMap<(MonthKey, Stage), (f64, usize)>,
    /// (mean kg per tree, plantation count)
    global: Option<(f64, usize)>,
}

impl FallbackYields {
    fn from_plantations(plantations: &[Plantation], config: &AnalyticsConfig) -> Self {
        let mut per_cohort: HashMap<(MonthKey, Stage), Vec<f64>> = HashMap::new();
        let mut all = Vec::new();

        for plantation in plantations {
            if plantation.tree_count == 0 {
                continue;
            }
            let Some(latest) = plantation.sorted_checkpoints().last().copied() else {
                continue;
            };
            let (projected, _) = extrapolate(plantation, latest, config);
            let per_tree = projected / plantation.tree_count as f64;

            per_cohort
                .entry((
                    MonthKey::from_datetime(plantation.start_date),
                    plantation.stage,
                ))
                .or_default()
                .push(per_tree);
            all.push(per_tree);
        }

        let cohort = per_cohort
            .into_iter()
            .filter_map(|(key, values)| {
                let count = values.len();
                mean(values).map(|avg| (key, (avg, count)))
            })
            .collect();
        let count = all.len();
        let global = mean(all).map(|avg| (avg, count));

        Self { cohort, global }
    }
}

/// Fraction of the expected growing cycle a plantation has completed.
fn stage_progress(plantation: &Plantation, config: &AnalyticsConfig) -> f64 {
    match plantation.stage {
        Stage::Harvested => 1.0,
        Stage::Planted | Stage::Growing => (plantation.elapsed_days() / config.expected_cycle_days)
            .clamp(config.min_stage_progress, 1.0),
    }
}

/// Scale the latest observed yield up to a full-cycle equivalent.
///
/// Returns `(projected_kg, progress)`.
fn extrapolate(
    plantation: &Plantation,
    latest: &YieldCheckpoint,
    config: &AnalyticsConfig,
) -> (f64, f64) {
    let progress = stage_progress(plantation, config);
    (latest.yield_kg.max(0.0) / progress, progress)
}

fn projection_date(plantation: &Plantation, config: &AnalyticsConfig) -> DateTime<Utc> {
    if plantation.stage == Stage::Harvested {
        return plantation.updated_at;
    }
    let cycle_secs = (config.expected_cycle_days * 86_400.0) as i64;
    Duration::try_seconds(cycle_secs)
        .and_then(|cycle| plantation.start_date.checked_add_signed(cycle))
        .map(|expected| expected.max(plantation.updated_at))
        .unwrap_or(plantation.updated_at)
}

fn forecast_one(
    plantation: &Plantation,
    fallback: &FallbackYields,
    config: &AnalyticsConfig,
) -> YieldForecast {
    let checkpoints = plantation.sorted_checkpoints();
    let trees = plantation.tree_count as f64;

    let (projected, confidence, basis) = match checkpoints.as_slice() {
        [] => {
            let cohort_key = (
                MonthKey::from_datetime(plantation.start_date),
                plantation.stage,
            );
            if let Some(&(per_tree, peers)) = fallback.cohort.get(&cohort_key) {
                (
                    per_tree * trees,
                    ForecastConfidence::Medium,
                    format!(
                        "No checkpoints yet; {} {} cohort average of {:.2} kg per tree across {} peer plantation{}",
                        cohort_key.0.label(),
                        plantation.stage,
                        per_tree,
                        peers,
                        if peers == 1 { "" } else { "s" }
                    ),
                )
            } else if let Some((per_tree, count)) = fallback.global {
                (
                    per_tree * trees,
                    ForecastConfidence::Low,
                    format!(
                        "No checkpoints yet; global average of {:.2} kg per tree across {} plantation{}",
                        per_tree,
                        count,
                        if count == 1 { "" } else { "s" }
                    ),
                )
            } else {
                (
                    config.default_yield_per_tree_kg * trees,
                    ForecastConfidence::Low,
                    format!(
                        "No checkpoints recorded anywhere; configured default of {:.2} kg per tree",
                        config.default_yield_per_tree_kg
                    ),
                )
            }
        }
        [only] => {
            let (projected, progress) = extrapolate(plantation, only, config);
            (
                projected,
                ForecastConfidence::Medium,
                format!(
                    "Single checkpoint of {:.1} kg on {} at {:.0}% of the expected cycle",
                    only.yield_kg,
                    only.date.format("%b %d, %Y"),
                    progress * 100.0
                ),
            )
        }
        [first, .., latest] => {
            let (projected, progress) = extrapolate(plantation, latest, config);
            let trending_up = latest.yield_kg > first.yield_kg;
            let confidence = if trending_up {
                ForecastConfidence::High
            } else {
                ForecastConfidence::Medium
            };
            (
                projected,
                confidence,
                format!(
                    "Extrapolated from {} checkpoints ({}); latest {:.1} kg on {} at {:.0}% of the expected cycle",
                    checkpoints.len(),
                    if trending_up { "upward trend" } else { "no upward trend" },
                    latest.yield_kg,
                    latest.date.format("%b %d, %Y"),
                    progress * 100.0
                ),
            )
        }
    };

    YieldForecast {
        id: plantation.id.clone(),
        seed_name: plantation.seed_name.clone(),
        stage: plantation.stage,
        projected_yield_kg: round_to(projected.max(0.0), 1),
        projection_date: projection_date(plantation, config),
        confidence,
        basis,
        checkpoint_count: checkpoints.len(),
    }
}

/// Forecast yield for every plantation.
///
/// Output is aligned with the input: `forecasts[i]` belongs to `plantations[i]`.
pub fn yield_forecasts(plantations: &[Plantation], config: &AnalyticsConfig) -> Vec<YieldForecast> {
    let fallback = FallbackYields::from_plantations(plantations, config);

    tracing::debug!(
        plantations = plantations.len(),
        cohort_baselines = fallback.cohort.len(),
        has_global_baseline = fallback.global.is_some(),
        "Computing yield forecasts"
    );

    plantations
        .iter()
        .map(|p| forecast_one(p, &fallback, config))
        .collect()
}

/// Build best/base/worst scenarios from base forecasts.
pub fn scenario_forecasts(
    forecasts: &[YieldForecast],
    config: &AnalyticsConfig,
) -> Vec<ScenarioForecast> {
    forecasts
        .iter()
        .map(|forecast| {
            let scenarios = ScenarioKind::ALL
                .iter()
                .map(|&kind| {
                    let multiplier = match kind {
                        ScenarioKind::Best => config.best_case_multiplier,
                        ScenarioKind::Base => 1.0,
                        ScenarioKind::Worst => config.worst_case_multiplier,
                    };
                    Scenario {
                        kind,
                        projected_yield_kg: round_to(forecast.projected_yield_kg * multiplier, 1),
                        projection_date: forecast.projection_date,
                        confidence: forecast.confidence,
                    }
                })
                .collect();

            ScenarioForecast {
                id: forecast.id.clone(),
                seed_name: forecast.seed_name.clone(),
                stage: forecast.stage,
                scenarios,
            }
        })
        .collect()
}
