//! Stable, persistable form of a daily plan.
//!
//! A snapshot keeps only lane names, ordered task ids, and minute totals, so
//! it survives later edits to the tasks themselves. Restoring joins the ids
//! back against the current task list.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DailyPlan, LaneKind};
use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneSnapshot {
    pub lane: LaneKind,
    pub task_ids: Vec<String>,
    pub total_minutes: u32,
    pub target_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub total_minutes: u32,
    pub lanes: Vec<LaneSnapshot>,
}

impl PlanSnapshot {
    pub fn from_plan(plan: &DailyPlan) -> Self {
        let lanes = plan
            .lanes()
            .iter()
            .map(|lane| LaneSnapshot {
                lane: lane.kind,
                task_ids: lane.tasks.iter().map(|s| s.task.id.clone()).collect(),
                total_minutes: lane.total_minutes,
                target_minutes: lane.target_minutes,
            })
            .collect();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            generated_at: plan.generated_at,
            total_minutes: plan.total_minutes,
            lanes,
        }
    }

    pub fn task_count(&self) -> usize {
        self.lanes.iter().map(|l| l.task_ids.len()).sum()
    }

    /// Re-attach task records to the snapshot's ids.
    ///
    /// Ids that no longer resolve are reported per lane instead of failing.
    pub fn restore(&self, tasks: &[Task]) -> RestoredPlan {
        let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();

        let lanes = self
            .lanes
            .iter()
            .map(|snap| {
                let mut found = Vec::new();
                let mut missing = Vec::new();
                for id in &snap.task_ids {
                    match by_id.get(id.as_str()) {
                        Some(task) => found.push((*task).clone()),
                        None => missing.push(id.clone()),
                    }
                }
                if !missing.is_empty() {
                    tracing::warn!(lane = %snap.lane, missing = missing.len(), "snapshot references unknown tasks");
                }
                RestoredLane {
                    lane: snap.lane,
                    tasks: found,
                    missing_task_ids: missing,
                    total_minutes: snap.total_minutes,
                    target_minutes: snap.target_minutes,
                }
            })
            .collect();

        RestoredPlan {
            snapshot_id: self.id.clone(),
            generated_at: self.generated_at,
            total_minutes: self.total_minutes,
            lanes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoredLane {
    pub lane: LaneKind,
    pub tasks: Vec<Task>,
    pub missing_task_ids: Vec<String>,
    pub total_minutes: u32,
    pub target_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoredPlan {
    pub snapshot_id: String,
    pub generated_at: DateTime<Utc>,
    pub total_minutes: u32,
    pub lanes: Vec<RestoredLane>,
}
