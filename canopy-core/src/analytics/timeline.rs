//! Monthly velocity: plantations started vs harvested per calendar month.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Plantation, Stage};

/// A calendar month (UTC), ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl MonthKey {
    pub fn from_datetime(ts: DateTime<Utc>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// Sortable key, e.g. "2024-03".
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Display label, e.g. "Mar 2024".
    pub fn label(&self) -> String {
        let month_name = match self.month {
            1 => "Jan",
            2 => "Feb",
            3 => "Mar",
            4 => "Apr",
            5 => "May",
            6 => "Jun",
            7 => "Jul",
            8 => "Aug",
            9 => "Sep",
            10 => "Oct",
            11 => "Nov",
            12 => "Dec",
            _ => "???",
        };
        format!("{} {}", month_name, self.year)
    }
}

/// One point of the monthly velocity chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub label: String,
    pub planted: usize,
    pub harvested: usize,
}

/// Build the monthly planted/harvested series.
///
/// A plantation counts as planted in the month of its `start_date`, and as
/// harvested in the month of its `updated_at` when its stage is harvested.
/// Only months with activity appear; gaps are not zero-filled.
pub fn monthly_points(plantations: &[Plantation]) -> Vec<MonthlyPoint> {
    let mut buckets: BTreeMap<MonthKey, (usize, usize)> = BTreeMap::new();

    for plantation in plantations {
        buckets
            .entry(MonthKey::from_datetime(plantation.start_date))
            .or_default()
            .0 += 1;

        if plantation.stage == Stage::Harvested {
            buckets
                .entry(MonthKey::from_datetime(plantation.updated_at))
                .or_default()
                .1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(month, (planted, harvested))| MonthlyPoint {
            label: month.label(),
            planted,
            harvested,
        })
        .collect()
}
