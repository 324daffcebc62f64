//! Per-wallet performance rollups for the reputation and leaderboard panels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::forecast::YieldForecast;
use super::geo::carbon_offset_tons;
use super::stage::StageCounts;
use super::{mean, round_to};
use crate::config::AnalyticsConfig;
use crate::types::Plantation;

/// Aggregate performance of one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletPerformance {
    /// Normalized (trimmed, lowercase) address
    pub wallet_address: String,
    pub total_plantations: usize,
    pub stage_counts: StageCounts,
    /// Tasks not yet completed
    pub active_tasks: usize,
    pub completed_tasks: usize,
    /// Sum over the wallet's mapped plantations
    pub carbon_offset_tons: f64,
    /// Mean of every yield checkpoint across the wallet's plantations
    pub avg_yield_kg: Option<f64>,
    /// Sum of the wallet's base yield forecasts
    pub forecast_kg: f64,
}

#[derive(Default)]
struct WalletAccumulator {
    total_plantations: usize,
    stage_counts: StageCounts,
    active_tasks: usize,
    completed_tasks: usize,
    carbon_offset_tons: f64,
    yields: Vec<f64>,
    forecast_kg: f64,
}

/// Roll plantations up by wallet.
///
/// `forecasts` must be aligned with `plantations` (as produced by
/// [`yield_forecasts`](super::yield_forecasts)). Carbon is credited per
/// plantation with the same estimate the map uses, and only for plantations
/// with valid coordinates.
///
/// Wallets are ordered by plantation count, then forecast, then address.
pub fn wallet_performance(
    plantations: &[Plantation],
    forecasts: &[YieldForecast],
    config: &AnalyticsConfig,
) -> Vec<WalletPerformance> {
    let mut wallets: BTreeMap<String, WalletAccumulator> = BTreeMap::new();

    for (index, plantation) in plantations.iter().enumerate() {
        let acc = wallets.entry(plantation.wallet_key()).or_default();

        acc.total_plantations += 1;
        acc.stage_counts.record(plantation.stage);

        for task in &plantation.tasks {
            if task.status.is_active() {
                acc.active_tasks += 1;
            } else {
                acc.completed_tasks += 1;
            }
        }

        if plantation.valid_coordinates().is_some() {
            acc.carbon_offset_tons += carbon_offset_tons(plantation, config);
        }

        acc.yields.extend(
            plantation
                .yield_timeline
                .iter()
                .map(|c| c.yield_kg)
                .filter(|kg| kg.is_finite()),
        );

        if let Some(forecast) = forecasts.get(index) {
            acc.forecast_kg += forecast.projected_yield_kg;
        }
    }

    let mut rows: Vec<WalletPerformance> = wallets
        .into_iter()
        .map(|(wallet_address, acc)| WalletPerformance {
            wallet_address,
            total_plantations: acc.total_plantations,
            stage_counts: acc.stage_counts,
            active_tasks: acc.active_tasks,
            completed_tasks: acc.completed_tasks,
            carbon_offset_tons: round_to(acc.carbon_offset_tons, 3),
            avg_yield_kg: mean(acc.yields).map(|kg| round_to(kg, 1)),
            forecast_kg: round_to(acc.forecast_kg, 1),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_plantations
            .cmp(&a.total_plantations)
            .then_with(|| b.forecast_kg.total_cmp(&a.forecast_kg))
            .then_with(|| a.wallet_address.cmp(&b.wallet_address))
    });

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::forecast::yield_forecasts;
    use crate::analytics::geo::geo_clusters;
    use crate::analytics::snapshot::test_support::{at, checkpoint, plantation, task};
    use crate::config::AnalyticsConfig;
    use crate::types::{Coordinates, Stage, TaskStatus};

    #[test]
    fn test_groups_by_normalized_wallet() {
        let mut a = plantation("a", Stage::Growing);
        a.wallet_address = "0xABC".to_string();
        a.tasks = vec![
            task("t1", TaskStatus::Pending),
            task("t2", TaskStatus::InProgress),
            task("t3", TaskStatus::Completed),
        ];
        a.yield_timeline = vec![
            checkpoint(at(2024, 2, 1), 10.0),
            checkpoint(at(2024, 2, 15), 20.0),
        ];
        a.coordinates = Some(Coordinates {
            latitude: 1.0,
            longitude: 2.0,
        });

        let mut b = plantation("b", Stage::Harvested);
        b.wallet_address = " 0xabc ".to_string();
        b.yield_timeline = vec![checkpoint(at(2024, 2, 1), 30.0)];

        let mut c = plantation("c", Stage::Planted);
        c.wallet_address = "0xdef".to_string();

        let plantations = vec![a, b, c];
        let cfg = AnalyticsConfig::default();
        let forecasts = yield_forecasts(&plantations, &cfg);
        let geo = geo_clusters(&plantations, &cfg);

        let rows = wallet_performance(&plantations, &forecasts, &cfg);
        assert_eq!(rows.len(), 2);

        let abc = &rows[0];
        assert_eq!(abc.wallet_address, "0xabc");
        assert_eq!(abc.total_plantations, 2);
        assert_eq!(abc.stage_counts.growing, 1);
        assert_eq!(abc.stage_counts.harvested, 1);
        assert_eq!(abc.active_tasks, 2);
        assert_eq!(abc.completed_tasks, 1);
        assert_eq!(abc.avg_yield_kg, Some(20.0));
        assert_eq!(abc.carbon_offset_tons, geo.points[0].carbon_offset_tons);
        assert_eq!(
            abc.forecast_kg,
            round_to(
                forecasts[0].projected_yield_kg + forecasts[1].projected_yield_kg,
                1
            )
        );

        let def = &rows[1];
        assert_eq!(def.wallet_address, "0xdef");
        assert_eq!(def.avg_yield_kg, None);
        assert_eq!(def.carbon_offset_tons, 0.0);
    }

    #[test]
    fn test_shared_id_carbon_stays_with_owner() {
        let spot = Coordinates {
            latitude: 6.7,
            longitude: 38.5,
        };
        let mut small = plantation("dup", Stage::Growing);
        small.wallet_address = "0xaaa".to_string();
        small.tree_count = 10;
        small.coordinates = Some(spot);
        let mut large = plantation("dup", Stage::Growing);
        large.wallet_address = "0xbbb".to_string();
        large.tree_count = 1000;
        large.coordinates = Some(spot);

        let plantations = vec![small, large];
        let cfg = AnalyticsConfig::default();
        let forecasts = yield_forecasts(&plantations, &cfg);
        let geo = geo_clusters(&plantations, &cfg);

        let rows = wallet_performance(&plantations, &forecasts, &cfg);
        let carbon_of = |wallet: &str| {
            rows.iter()
                .find(|r| r.wallet_address == wallet)
                .map(|r| r.carbon_offset_tons)
        };
        assert_eq!(carbon_of("0xaaa"), Some(geo.points[0].carbon_offset_tons));
        assert_eq!(carbon_of("0xbbb"), Some(geo.points[1].carbon_offset_tons));
        assert!(
            geo.points[1].carbon_offset_tons > geo.points[0].carbon_offset_tons
        );
    }

    #[test]
    fn test_empty_input() {
        let rows = wallet_performance(&[], &[], &AnalyticsConfig::default());
        assert!(rows.is_empty());
    }
}
