//! Collaborator insight ranking for the collaboration hub spotlight.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Collaborator, Plantation};

/// Contribution summary for one collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorInsight {
    pub id: String,
    pub name: String,
    pub role: String,
    /// Distinct plantations the collaborator appears on
    pub plantations: usize,
    /// Text of the most recent note logged against them
    pub last_note: Option<String>,
    /// Timestamp of that note
    pub last_updated: Option<DateTime<Utc>>,
}

struct InsightAccumulator<'a> {
    /// Profile from the most recently updated plantation listing them
    profile: &'a Collaborator,
    profile_seen_at: DateTime<Utc>,
    plantations: HashSet<&'a str>,
    latest_note: Option<(&'a str, DateTime<Utc>)>,
}

/// Deduplicate collaborators by ID and rank them.
///
/// Ranking: most plantations first, then most recent note (collaborators
/// without notes last), then name and ID for a stable order.
pub fn collaborator_insights(plantations: &[Plantation]) -> Vec<CollaboratorInsight> {
    let mut by_id: HashMap<&str, InsightAccumulator> = HashMap::new();

    for plantation in plantations {
        for collaborator in &plantation.collaborators {
            let acc = by_id
                .entry(collaborator.id.as_str())
                .or_insert_with(|| InsightAccumulator {
                    profile: collaborator,
                    profile_seen_at: plantation.updated_at,
                    plantations: HashSet::new(),
                    latest_note: None,
                });

            if plantation.updated_at > acc.profile_seen_at {
                acc.profile = collaborator;
                acc.profile_seen_at = plantation.updated_at;
            }

            acc.plantations.insert(plantation.id.as_str());

            if let Some(note) = collaborator.latest_note() {
                let newer = acc
                    .latest_note
                    .map_or(true, |(_, seen)| note.created_at > seen);
                if newer {
                    acc.latest_note = Some((note.text.as_str(), note.created_at));
                }
            }
        }
    }

    let mut insights: Vec<CollaboratorInsight> = by_id
        .into_iter()
        .map(|(id, acc)| CollaboratorInsight {
            id: id.to_string(),
            name: acc.profile.name.clone(),
            role: acc.profile.role.clone(),
            plantations: acc.plantations.len(),
            last_note: acc.latest_note.map(|(text, _)| text.to_string()),
            last_updated: acc.latest_note.map(|(_, at)| at),
        })
        .collect();

    // Option<DateTime> orders None first, so reversing puts notes-less last.
    insights.sort_by(|a, b| {
        b.plantations
            .cmp(&a.plantations)
            .then_with(|| b.last_updated.cmp(&a.last_updated))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::snapshot::test_support::{at, collaborator, plantation};
    use crate::types::{CollaboratorNote, Stage};

    fn note(text: &str, created_at: DateTime<Utc>) -> CollaboratorNote {
        CollaboratorNote {
            text: text.to_string(),
            created_at,
        }
    }

    #[test]
    fn test_dedup_and_rank() {
        let mut abebe_on_a = collaborator("c1", "Abebe");
        abebe_on_a.notes = vec![note("Pruned rows 1-4", at(2024, 2, 1))];
        let mut abebe_on_b = collaborator("c1", "Abebe");
        abebe_on_b.notes = vec![note("Soil test done", at(2024, 3, 5))];
        let mut hana = collaborator("c2", "Hana");
        hana.notes = vec![note("Irrigation fixed", at(2024, 4, 1))];
        let selam = collaborator("c3", "Selam");

        let mut a = plantation("a", Stage::Growing);
        a.collaborators = vec![abebe_on_a, hana];
        let mut b = plantation("b", Stage::Growing);
        b.collaborators = vec![abebe_on_b, selam];

        let insights = collaborator_insights(&[a, b]);
        assert_eq!(insights.len(), 3);

        assert_eq!(insights[0].id, "c1");
        assert_eq!(insights[0].plantations, 2);
        assert_eq!(insights[0].last_note.as_deref(), Some("Soil test done"));
        assert_eq!(insights[0].last_updated, Some(at(2024, 3, 5)));

        // Tied on plantations: most recent note first, note-less last
        assert_eq!(insights[1].id, "c2");
        assert_eq!(insights[2].id, "c3");
        assert_eq!(insights[2].last_note, None);
    }

    #[test]
    fn test_same_plantation_counted_once() {
        let mut a = plantation("a", Stage::Planted);
        a.collaborators = vec![collaborator("c1", "Abebe"), collaborator("c1", "Abebe")];

        let insights = collaborator_insights(&[a]);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].plantations, 1);
    }

    #[test]
    fn test_profile_taken_from_latest_plantation() {
        let mut old = plantation("old", Stage::Planted);
        old.updated_at = at(2024, 1, 2);
        old.collaborators = vec![collaborator("c1", "Abebe")];

        let mut new = plantation("new", Stage::Growing);
        new.updated_at = at(2024, 5, 2);
        let mut renamed = collaborator("c1", "Abebe Kebede");
        renamed.role = "Agronomist".to_string();
        new.collaborators = vec![renamed];

        let insights = collaborator_insights(&[old, new]);
        assert_eq!(insights[0].name, "Abebe Kebede");
        assert_eq!(insights[0].role, "Agronomist");
    }
}
