//! Cohort analysis: plantations grouped by planting month.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::timeline::MonthKey;
use super::{mean, percentage, round_to};
use crate::types::{Plantation, Stage};

/// Harvest performance of one planting-month cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortPerformance {
    /// Sortable cohort key, e.g. "2024-01"
    pub cohort: String,
    /// Display label, e.g. "Jan 2024"
    pub label: String,
    /// Cohort size
    pub planted: usize,
    /// Members currently in the harvested stage
    pub harvested: usize,
    /// `round(harvested / planted * 100)`
    pub harvest_rate: u32,
    /// Mean planting-to-harvest time over harvested members
    pub average_days_to_harvest: Option<f64>,
}

/// Group plantations into planting-month cohorts, oldest first.
pub fn cohort_performance(plantations: &[Plantation]) -> Vec<CohortPerformance> {
    let mut cohorts: BTreeMap<MonthKey, Vec<&Plantation>> = BTreeMap::new();
    for plantation in plantations {
        cohorts
            .entry(MonthKey::from_datetime(plantation.start_date))
            .or_default()
            .push(plantation);
    }

    cohorts
        .into_iter()
        .map(|(month, members)| {
            let planted = members.len();
            let harvest_days: Vec<f64> = members
                .iter()
                .filter(|p| p.stage == Stage::Harvested)
                .map(|p| p.elapsed_days())
                .collect();
            let harvested = harvest_days.len();

            CohortPerformance {
                cohort: month.key(),
                label: month.label(),
                planted,
                harvested,
                harvest_rate: percentage(harvested, planted),
                average_days_to_harvest: mean(harvest_days).map(|d| round_to(d, 1)),
            }
        })
        .collect()
}

/// Pick the best performing cohort.
///
/// Highest harvest rate wins; ties go to the most recent cohort.
pub fn best_cohort(cohorts: &[CohortPerformance]) -> Option<&CohortPerformance> {
    cohorts
        .iter()
        .max_by(|a, b| {
            a.harvest_rate
                .cmp(&b.harvest_rate)
                .then_with(|| a.cohort.cmp(&b.cohort))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::snapshot::test_support::{at, plantation};

    fn member(
        id: &str,
        stage: Stage,
        start: (i32, u32, u32),
        updated: (i32, u32, u32),
    ) -> Plantation {
        let mut p = plantation(id, stage);
        p.start_date = at(start.0, start.1, start.2);
        p.updated_at = at(updated.0, updated.1, updated.2);
        p
    }

    #[test]
    fn test_groups_by_planting_month() {
        let plantations = vec![
            member("a", Stage::Harvested, (2024, 1, 1), (2024, 4, 10)),
            member("b", Stage::Harvested, (2024, 1, 15), (2024, 5, 4)),
            member("c", Stage::Growing, (2024, 1, 20), (2024, 2, 1)),
            member("d", Stage::Planted, (2024, 2, 2), (2024, 2, 2)),
        ];

        let cohorts = cohort_performance(&plantations);
        assert_eq!(cohorts.len(), 2);

        let jan = &cohorts[0];
        assert_eq!(jan.cohort, "2024-01");
        assert_eq!(jan.label, "Jan 2024");
        assert_eq!(jan.planted, 3);
        assert_eq!(jan.harvested, 2);
        assert_eq!(jan.harvest_rate, 67);
        // (100 + 110) / 2
        assert_eq!(jan.average_days_to_harvest, Some(105.0));

        let feb = &cohorts[1];
        assert_eq!(feb.harvested, 0);
        assert_eq!(feb.harvest_rate, 0);
        assert_eq!(feb.average_days_to_harvest, None);
    }

    #[test]
    fn test_harvested_never_exceeds_planted() {
        let plantations: Vec<_> = (0..9)
            .map(|i| {
                member(
                    &format!("p{i}"),
                    Stage::ALL[i % 3],
                    (2024, (i % 4) as u32 + 1, 1),
                    (2024, 6, 1),
                )
            })
            .collect();

        for cohort in cohort_performance(&plantations) {
            assert!(cohort.harvested <= cohort.planted);
            assert_eq!(
                cohort.harvest_rate,
                (cohort.harvested as f64 / cohort.planted as f64 * 100.0).round() as u32
            );
        }
    }

    #[test]
    fn test_best_cohort_prefers_recent_on_tie() {
        let plantations = vec![
            member("a", Stage::Harvested, (2024, 1, 1), (2024, 4, 1)),
            member("b", Stage::Harvested, (2024, 3, 1), (2024, 6, 1)),
            member("c", Stage::Growing, (2024, 2, 1), (2024, 6, 1)),
        ];
        let cohorts = cohort_performance(&plantations);

        let best = best_cohort(&cohorts).unwrap();
        assert_eq!(best.cohort, "2024-03");
        assert!(best_cohort(&[]).is_none());
    }
}
