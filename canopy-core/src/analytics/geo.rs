//! Geographic clustering and sustainability rollups.
//!
//! Only plantations with valid coordinates produce map points; everything
//! downstream of this module (region metrics, sustainability totals, wallet
//! carbon) is therefore scoped to mapped plantations.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::round_to;
use crate::config::AnalyticsConfig;
use crate::types::{Plantation, Stage};

const DAYS_PER_YEAR: f64 = 365.0;

/// A plantation plotted on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPlantationPoint {
    /// Plantation ID
    pub id: String,
    pub seed_name: String,
    pub stage: Stage,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub tree_count: u32,
    pub carbon_offset_tons: f64,
}

/// Rollup of mapped plantations in one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionGeoMetric {
    pub region: String,
    pub tree_count: u64,
    pub plantation_count: usize,
    /// Distinct collaborators (by ID) across the region's plantations
    pub collaborator_count: usize,
    pub carbon_offset_tons: f64,
}

/// Map points plus their per-region rollups (sorted by region name).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoClusters {
    pub points: Vec<GeoPlantationPoint>,
    pub regions: Vec<RegionGeoMetric>,
}

/// Process-wide canopy totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityTotals {
    pub tree_count: u64,
    pub carbon_offset_tons: f64,
    /// Derived from tree count and the configured planting density
    pub area_hectares: f64,
    pub plantation_count: usize,
}

/// Sustainability panel data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilitySummary {
    pub totals: SustainabilityTotals,
    /// Regions ordered by descending carbon offset (hotspots first)
    pub per_region: Vec<RegionGeoMetric>,
}

/// Estimated CO2 sequestration for a plantation, in tonnes.
///
/// `trees × carbon_tons_per_tree_year × stage_factor × age_years`, where age
/// runs from planting to the last update and is floored at
/// `min_carbon_age_years`. Freshly planted saplings only count for
/// `planted_carbon_factor` of a mature canopy.
pub fn carbon_offset_tons(plantation: &Plantation, config: &AnalyticsConfig) -> f64 {
    let stage_factor = match plantation.stage {
        Stage::Planted => config.planted_carbon_factor,
        Stage::Growing | Stage::Harvested => 1.0,
    };
    let age_years = (plantation.elapsed_days() / DAYS_PER_YEAR).max(config.min_carbon_age_years);

    round_to(
        plantation.tree_count as f64 * config.carbon_tons_per_tree_year * stage_factor * age_years,
        3,
    )
}

/// Build map points and region rollups.
pub fn geo_clusters(plantations: &[Plantation], config: &AnalyticsConfig) -> GeoClusters {
    struct RegionAccumulator<'a> {
        tree_count: u64,
        plantation_count: usize,
        collaborators: HashSet<&'a str>,
        carbon_offset_tons: f64,
    }

    let mut points = Vec::new();
    let mut regions: BTreeMap<&str, RegionAccumulator> = BTreeMap::new();

    for plantation in plantations {
        let Some(coordinates) = plantation.valid_coordinates() else {
            continue;
        };

        let region = plantation.region_label();
        let carbon = carbon_offset_tons(plantation, config);

        points.push(GeoPlantationPoint {
            id: plantation.id.clone(),
            seed_name: plantation.seed_name.clone(),
            stage: plantation.stage,
            region: region.to_string(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            tree_count: plantation.tree_count,
            carbon_offset_tons: carbon,
        });

        let acc = regions.entry(region).or_insert_with(|| RegionAccumulator {
            tree_count: 0,
            plantation_count: 0,
            collaborators: HashSet::new(),
            carbon_offset_tons: 0.0,
        });
        acc.tree_count += u64::from(plantation.tree_count);
        acc.plantation_count += 1;
        acc.carbon_offset_tons += carbon;
        acc.collaborators
            .extend(plantation.collaborators.iter().map(|c| c.id.as_str()));
    }

    let regions = regions
        .into_iter()
        .map(|(region, acc)| RegionGeoMetric {
            region: region.to_string(),
            tree_count: acc.tree_count,
            plantation_count: acc.plantation_count,
            collaborator_count: acc.collaborators.len(),
            carbon_offset_tons: round_to(acc.carbon_offset_tons, 3),
        })
        .collect();

    tracing::debug!(
        plantations = plantations.len(),
        mapped = points.len(),
        "Built geo clusters"
    );

    GeoClusters { points, regions }
}

/// Sum region rollups into process-wide totals and rank regions by carbon.
pub fn sustainability(
    regions: &[RegionGeoMetric],
    config: &AnalyticsConfig,
) -> SustainabilitySummary {
    let tree_count: u64 = regions.iter().map(|r| r.tree_count).sum();
    let carbon: f64 = regions.iter().map(|r| r.carbon_offset_tons).sum();
    let plantation_count: usize = regions.iter().map(|r| r.plantation_count).sum();

    let mut per_region = regions.to_vec();
    per_region.sort_by(|a, b| {
        b.carbon_offset_tons
            .total_cmp(&a.carbon_offset_tons)
            .then_with(|| a.region.cmp(&b.region))
    });

    SustainabilitySummary {
        totals: SustainabilityTotals {
            tree_count,
            carbon_offset_tons: round_to(carbon, 3),
            area_hectares: round_to(tree_count as f64 / config.trees_per_hectare, 2),
            plantation_count,
        },
        per_region,
    }
}
