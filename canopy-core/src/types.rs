//! Core domain types for canopy
//!
//! These types mirror the records exposed by the dashboard's CRUD stores.
//! The analytics engine only ever borrows them; it never writes back.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Plantation** | A planting of a single seed variety owned by one wallet |
//! | **Stage** | Growth stage of a plantation (planted, growing, harvested) |
//! | **Task** | A unit of field work attached to a plantation |
//! | **Collaborator** | A person helping on one or more plantations |
//! | **Checkpoint** | A point-in-time yield observation |
//! | **Cohort** | Plantations sharing a planting month |
//!
//! All JSON field names are camelCase to match the dashboard's export format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label used when a plantation has no usable region.
pub const UNSPECIFIED_REGION: &str = "Unspecified";

// ============================================
// Stage
// ============================================

/// Growth stage of a plantation.
///
/// Variants are declared in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Planted,
    Growing,
    Harvested,
}

impl Stage {
    /// All stages in lifecycle order.
    pub const ALL: [Stage; 3] = [Stage::Planted, Stage::Growing, Stage::Harvested];

    /// Returns the identifier used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Planted => "planted",
            Stage::Growing => "growing",
            Stage::Harvested => "harvested",
        }
    }

    /// Returns the display name for this stage
    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Planted => "Planted",
            Stage::Growing => "Growing",
            Stage::Harvested => "Harvested",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planted" => Ok(Stage::Planted),
            "growing" => Ok(Stage::Growing),
            "harvested" => Ok(Stage::Harvested),
            _ => Err(format!("unknown stage: {}", s)),
        }
    }
}

// ============================================
// Tasks
// ============================================

/// Status of a plantation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Whether the task still needs work.
    pub fn is_active(&self) -> bool {
        !matches!(self, TaskStatus::Completed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A unit of work attached to a plantation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
}

// ============================================
// Collaborators
// ============================================

/// A timestamped free-text note logged against a collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorNote {
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A person working on a plantation.
///
/// The same collaborator (by `id`) may appear on several plantations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default)]
    pub notes: Vec<CollaboratorNote>,
}

impl Collaborator {
    /// Most recent note, if any.
    pub fn latest_note(&self) -> Option<&CollaboratorNote> {
        self.notes.iter().max_by_key(|note| note.created_at)
    }
}

// ============================================
// Yield
// ============================================

/// A point-in-time yield observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldCheckpoint {
    pub date: DateTime<Utc>,
    /// Short label, e.g. "First flush"
    pub event: String,
    pub yield_kg: f64,
}

// ============================================
// Plantation
// ============================================

/// Geographic position of a plantation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Whether both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A plantation record as exposed by the CRUD store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plantation {
    pub id: String,
    pub seed_name: String,
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub tree_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub start_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub wallet_address: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub yield_timeline: Vec<YieldCheckpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Plantation {
    /// Region label used for rollups ("Unspecified" when absent or blank).
    pub fn region_label(&self) -> &str {
        self.region
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(UNSPECIFIED_REGION)
    }

    /// Coordinates, only if they are usable for mapping.
    pub fn valid_coordinates(&self) -> Option<Coordinates> {
        self.coordinates.filter(Coordinates::is_valid)
    }

    /// Days between planting and the last update.
    ///
    /// Clamped to 0 in case of clock skew between the two timestamps.
    pub fn elapsed_days(&self) -> f64 {
        let secs = self
            .updated_at
            .signed_duration_since(self.start_date)
            .num_seconds()
            .max(0);
        secs as f64 / 86_400.0
    }

    /// Days to harvest, only for harvested plantations.
    pub fn days_to_harvest(&self) -> Option<f64> {
        (self.stage == Stage::Harvested).then(|| self.elapsed_days())
    }

    /// Yield checkpoints ordered by date (oldest first).
    pub fn sorted_checkpoints(&self) -> Vec<&YieldCheckpoint> {
        let mut checkpoints: Vec<&YieldCheckpoint> = self
            .yield_timeline
            .iter()
            .filter(|c| c.yield_kg.is_finite())
            .collect();
        checkpoints.sort_by_key(|c| c.date);
        checkpoints
    }

    /// Normalized wallet key (trimmed, lowercase).
    pub fn wallet_key(&self) -> String {
        self.wallet_address.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plantation(stage: Stage) -> Plantation {
        Plantation {
            id: "p-1".to_string(),
            seed_name: "Arabica".to_string(),
            stage,
            location: None,
            region: None,
            tree_count: 10,
            coordinates: None,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
            wallet_address: " 0xABC ".to_string(),
            tasks: vec![],
            collaborators: vec![],
            yield_timeline: vec![],
            notes: None,
        }
    }

    #[test]
    fn test_stage_roundtrip_str() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
        assert!("wilted".parse::<Stage>().is_err());
    }

    #[test]
    fn test_region_label_fallback() {
        let mut p = plantation(Stage::Planted);
        assert_eq!(p.region_label(), UNSPECIFIED_REGION);
        p.region = Some("   ".to_string());
        assert_eq!(p.region_label(), UNSPECIFIED_REGION);
        p.region = Some(" Sidama ".to_string());
        assert_eq!(p.region_label(), "Sidama");
    }

    #[test]
    fn test_days_to_harvest_only_for_harvested() {
        assert_eq!(plantation(Stage::Growing).days_to_harvest(), None);
        assert_eq!(plantation(Stage::Harvested).days_to_harvest(), Some(30.0));
    }

    #[test]
    fn test_elapsed_days_clamped() {
        let mut p = plantation(Stage::Planted);
        p.updated_at = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
        assert_eq!(p.elapsed_days(), 0.0);
    }

    #[test]
    fn test_invalid_coordinates_filtered() {
        let mut p = plantation(Stage::Planted);
        p.coordinates = Some(Coordinates {
            latitude: 120.0,
            longitude: 10.0,
        });
        assert!(p.valid_coordinates().is_none());
        p.coordinates = Some(Coordinates {
            latitude: f64::NAN,
            longitude: 10.0,
        });
        assert!(p.valid_coordinates().is_none());
        p.coordinates = Some(Coordinates {
            latitude: 6.8,
            longitude: 38.5,
        });
        assert!(p.valid_coordinates().is_some());
    }

    #[test]
    fn test_wallet_key_normalized() {
        assert_eq!(plantation(Stage::Planted).wallet_key(), "0xabc");
    }

    #[test]
    fn test_deserialize_minimal_plantation() {
        let json = r#"{
            "id": "p-9",
            "seedName": "Cacao",
            "stage": "growing",
            "startDate": "2024-03-01T00:00:00Z",
            "updatedAt": "2024-04-01T00:00:00Z",
            "walletAddress": "0x1"
        }"#;
        let p: Plantation = serde_json::from_str(json).unwrap();
        assert_eq!(p.stage, Stage::Growing);
        assert_eq!(p.tree_count, 0);
        assert!(p.tasks.is_empty());
        assert!(p.yield_timeline.is_empty());
    }
}
