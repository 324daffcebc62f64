//! Stage breakdown: how many plantations sit in each growth stage.

use serde::{Deserialize, Serialize};

use super::percentage;
use crate::types::{Plantation, Stage};

/// One row of the stage breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageBreakdown {
    pub stage: Stage,
    pub count: usize,
    /// `round(count / total * 100)`
    pub percentage: u32,
}

/// Plantation counts per stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCounts {
    pub planted: usize,
    pub growing: usize,
    pub harvested: usize,
}

impl StageCounts {
    /// Count stages across a set of plantations.
    pub fn from_plantations<'a, I>(plantations: I) -> Self
    where
        I: IntoIterator<Item = &'a Plantation>,
    {
        let mut counts = Self::default();
        for plantation in plantations {
            counts.record(plantation.stage);
        }
        counts
    }

    pub fn record(&mut self, stage: Stage) {
        match stage {
            Stage::Planted => self.planted += 1,
            Stage::Growing => self.growing += 1,
            Stage::Harvested => self.harvested += 1,
        }
    }

    pub fn get(&self, stage: Stage) -> usize {
        match stage {
            Stage::Planted => self.planted,
            Stage::Growing => self.growing,
            Stage::Harvested => self.harvested,
        }
    }

    pub fn total(&self) -> usize {
        self.planted + self.growing + self.harvested
    }
}

/// Build the stage breakdown.
///
/// Rows come out in lifecycle order (planted, growing, harvested) and stages
/// with no plantations are omitted, so an empty input yields an empty list.
pub fn stage_breakdown(plantations: &[Plantation]) -> Vec<StageBreakdown> {
    let counts = StageCounts::from_plantations(plantations);
    let total = counts.total();

    Stage::ALL
        .iter()
        .map(|&stage| (stage, counts.get(stage)))
        .filter(|&(_, count)| count > 0)
        .map(|(stage, count)| StageBreakdown {
            stage,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}
