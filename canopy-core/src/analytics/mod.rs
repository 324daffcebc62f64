//! Analytics module for canopy
//!
//! Folds a borrowed collection of plantations into an [`AnalyticsSnapshot`].
//! Each submodule is one aggregator that reads the same input and produces
//! one facet of the snapshot:
//!
//! - [`stage`]: counts and percentages per growth stage
//! - [`timeline`]: monthly planted vs harvested series
//! - [`cohort`]: performance grouped by planting month
//! - [`forecast`]: per-plantation yield forecasts and best/base/worst scenarios
//! - [`geo`]: map points, region rollups and sustainability totals
//! - [`wallet`]: per-wallet performance rollups
//! - [`collaborators`]: collaborator insight ranking
//! - [`snapshot`]: the assembler that composes all of the above
//!
//! ## Architecture
//!
//! ```text
//!            &[Plantation]
//!                 │
//!   ┌──────┬──────┼────────┬──────────┬───────────────┐
//!   ▼      ▼      ▼        ▼          ▼               ▼
//! stage timeline cohort forecast     geo        collaborators
//!                          │          │
//!                          ▼          ▼
//!                      scenarios  sustainability
//!                          │          │
//!                          └──► wallet ◄┘
//!                                 │
//!                                 ▼
//!                         AnalyticsSnapshot
//! ```
//!
//! The engine holds no state and never mutates its input. Memoizing results
//! across calls is left to the caller; [`cache::SnapshotCache`] is a ready-made
//! content-hash keyed helper for that.

pub mod cache;
pub mod cohort;
pub mod collaborators;
pub mod forecast;
pub mod geo;
pub mod snapshot;
pub mod stage;
pub mod timeline;
pub mod wallet;

pub use cache::{content_hash, SnapshotCache};
pub use cohort::{best_cohort, cohort_performance, CohortPerformance};
pub use collaborators::{collaborator_insights, CollaboratorInsight};
pub use forecast::{
    scenario_forecasts, yield_forecasts, ForecastConfidence, Scenario, ScenarioForecast,
    ScenarioKind, YieldForecast,
};
pub use geo::{
    carbon_offset_tons, geo_clusters, sustainability, GeoClusters, GeoPlantationPoint,
    RegionGeoMetric, SustainabilitySummary, SustainabilityTotals,
};
pub use snapshot::{
    build_analytics_snapshot, build_analytics_snapshot_at, ActiveRegion, AnalyticsSnapshot,
    YieldTimelineEntry,
};
pub use stage::{stage_breakdown, StageBreakdown, StageCounts};
pub use timeline::{monthly_points, MonthKey, MonthlyPoint};
pub use wallet::{wallet_performance, WalletPerformance};

/// Round to a fixed number of decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Whole-number percentage of `part` in `whole`; 0 when `whole` is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as u32
    }
}

/// Arithmetic mean, `None` for an empty input.
pub(crate) fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.2345, 2), 1.23);
        assert_eq!(round_to(1.235, 1), 1.2);
        assert_eq!(round_to(66.666, 0), 67.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(mean([2.0, 4.0]), Some(3.0));
    }
}
