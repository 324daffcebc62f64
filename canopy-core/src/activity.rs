//! Activity feed events.
//!
//! Each variant carries exactly the fields its feed entry needs. Events are
//! derived by diffing two versions of the same plantation, so the feed never
//! has to sniff at loosely shaped records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Plantation, Stage, TaskStatus};

/// Something that happened to a plantation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ActivityEvent {
    StageChange {
        plantation_id: String,
        seed_name: String,
        from: Stage,
        to: Stage,
        at: DateTime<Utc>,
    },
    TaskAdded {
        plantation_id: String,
        task_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    TaskStatusChange {
        plantation_id: String,
        task_id: String,
        title: String,
        from: TaskStatus,
        to: TaskStatus,
        at: DateTime<Utc>,
    },
    YieldCheckpointAdded {
        plantation_id: String,
        event: String,
        yield_kg: f64,
        at: DateTime<Utc>,
    },
    CollaboratorAdded {
        plantation_id: String,
        collaborator_id: String,
        name: String,
        role: String,
        at: DateTime<Utc>,
    },
}

impl ActivityEvent {
    pub fn plantation_id(&self) -> &str {
        match self {
            ActivityEvent::StageChange { plantation_id, .. }
            | ActivityEvent::TaskAdded { plantation_id, .. }
            | ActivityEvent::TaskStatusChange { plantation_id, .. }
            | ActivityEvent::YieldCheckpointAdded { plantation_id, .. }
            | ActivityEvent::CollaboratorAdded { plantation_id, .. } => plantation_id,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            ActivityEvent::StageChange { at, .. }
            | ActivityEvent::TaskAdded { at, .. }
            | ActivityEvent::TaskStatusChange { at, .. }
            | ActivityEvent::YieldCheckpointAdded { at, .. }
            | ActivityEvent::CollaboratorAdded { at, .. } => *at,
        }
    }

    /// One-line description for the activity feed.
    pub fn summary(&self) -> String {
        match self {
            ActivityEvent::StageChange {
                seed_name, from, to, ..
            } => format!(
                "{} moved from {} to {}",
                seed_name,
                from.display_name(),
                to.display_name()
            ),
            ActivityEvent::TaskAdded { title, .. } => format!("Task added: {}", title),
            ActivityEvent::TaskStatusChange { title, from, to, .. } => {
                format!("Task \"{}\" changed from {} to {}", title, from, to)
            }
            ActivityEvent::YieldCheckpointAdded {
                event, yield_kg, ..
            } => format!("Yield checkpoint \"{}\" recorded at {:.1} kg", event, yield_kg),
            ActivityEvent::CollaboratorAdded { name, role, .. } => {
                format!("{} joined as {}", name, role)
            }
        }
    }
}

/// Derive the events that turn `before` into `after`.
///
/// Events are stamped with `after.updated_at`. Removals are not reported.
/// Comparing two different plantations yields nothing.
pub fn diff_plantation(before: &Plantation, after: &Plantation) -> Vec<ActivityEvent> {
    if before.id != after.id {
        return Vec::new();
    }

    let at = after.updated_at;
    let plantation_id = || after.id.clone();
    let mut events = Vec::new();

    if before.stage != after.stage {
        events.push(ActivityEvent::StageChange {
            plantation_id: plantation_id(),
            seed_name: after.seed_name.clone(),
            from: before.stage,
            to: after.stage,
            at,
        });
    }

    for task in &after.tasks {
        match before.tasks.iter().find(|t| t.id == task.id) {
            None => events.push(ActivityEvent::TaskAdded {
                plantation_id: plantation_id(),
                task_id: task.id.clone(),
                title: task.title.clone(),
                at,
            }),
            Some(previous) if previous.status != task.status => {
                events.push(ActivityEvent::TaskStatusChange {
                    plantation_id: plantation_id(),
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                    from: previous.status,
                    to: task.status,
                    at,
                })
            }
            Some(_) => {}
        }
    }

    for checkpoint in &after.yield_timeline {
        if !before.yield_timeline.contains(checkpoint) {
            events.push(ActivityEvent::YieldCheckpointAdded {
                plantation_id: plantation_id(),
                event: checkpoint.event.clone(),
                yield_kg: checkpoint.yield_kg,
                at,
            });
        }
    }

    for collaborator in &after.collaborators {
        if !before.collaborators.iter().any(|c| c.id == collaborator.id) {
            events.push(ActivityEvent::CollaboratorAdded {
                plantation_id: plantation_id(),
                collaborator_id: collaborator.id.clone(),
                name: collaborator.name.clone(),
                role: collaborator.role.clone(),
                at,
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Collaborator, Task, YieldCheckpoint};
    use chrono::TimeZone;

    fn base() -> Plantation {
        Plantation {
            id: "p-1".to_string(),
            seed_name: "Arabica".to_string(),
            stage: Stage::Planted,
            location: None,
            region: None,
            tree_count: 40,
            coordinates: None,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            wallet_address: "0xabc".to_string(),
            tasks: vec![Task {
                id: "t-1".to_string(),
                title: "Mulch".to_string(),
                status: TaskStatus::Pending,
                due_date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            }],
            collaborators: vec![],
            yield_timeline: vec![],
            notes: None,
        }
    }

    #[test]
    fn test_no_changes_no_events() {
        assert!(diff_plantation(&base(), &base()).is_empty());
    }

    #[test]
    fn test_detects_every_event_kind() {
        let before = base();
        let mut after = base();
        after.updated_at = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
        after.stage = Stage::Growing;
        after.tasks[0].status = TaskStatus::Completed;
        after.tasks.push(Task {
            id: "t-2".to_string(),
            title: "Prune".to_string(),
            status: TaskStatus::Pending,
            due_date: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        });
        after.yield_timeline.push(YieldCheckpoint {
            date: after.updated_at,
            event: "First flush".to_string(),
            yield_kg: 4.5,
        });
        after.collaborators.push(Collaborator {
            id: "c-1".to_string(),
            name: "Hana".to_string(),
            role: "Agronomist".to_string(),
            contact: None,
            notes: vec![],
        });

        let events = diff_plantation(&before, &after);
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.plantation_id() == "p-1"));
        assert!(events.iter().all(|e| e.at() == after.updated_at));

        let summaries: Vec<String> = events.iter().map(ActivityEvent::summary).collect();
        assert_eq!(summaries[0], "Arabica moved from Planted to Growing");
        assert_eq!(summaries[1], "Task \"Mulch\" changed from pending to completed");
        assert_eq!(summaries[2], "Task added: Prune");
        assert_eq!(summaries[3], "Yield checkpoint \"First flush\" recorded at 4.5 kg");
        assert_eq!(summaries[4], "Hana joined as Agronomist");
    }

    #[test]
    fn test_different_plantations_ignored() {
        let mut other = base();
        other.id = "p-2".to_string();
        other.stage = Stage::Harvested;
        assert!(diff_plantation(&base(), &other).is_empty());
    }

    #[test]
    fn test_serde_tag() {
        let event = ActivityEvent::TaskAdded {
            plantation_id: "p-1".to_string(),
            task_id: "t-9".to_string(),
            title: "Weed".to_string(),
            at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "task_added");
        assert_eq!(json["plantationId"], "p-1");
    }
}
