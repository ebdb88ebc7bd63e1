//! Read-only plan diagnostics.
//!
//! Warnings are advisory; they never change an allocation.

use serde::{Deserialize, Serialize};

use super::{DailyPlan, LaneKind};

/// Below this share of the summed budgets a plan is under-filled.
const UNDER_FILL_RATIO: f64 = 0.5;
/// Above this share of the summed budgets a plan is over-filled.
const OVER_FILL_RATIO: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// Realized minutes are under half of the summed budgets.
    UnderFilled { total_minutes: u32, target_minutes: u32 },
    /// Realized minutes exceed 150% of the summed budgets.
    OverFilled { total_minutes: u32, target_minutes: u32 },
    /// A lane received no tasks.
    EmptyLane { lane: LaneKind },
}

impl std::fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanWarning::UnderFilled {
                total_minutes,
                target_minutes,
            } => write!(f, "plan is under-filled: {total_minutes} of {target_minutes} minutes"),
            PlanWarning::OverFilled {
                total_minutes,
                target_minutes,
            } => write!(f, "plan is over-filled: {total_minutes} of {target_minutes} minutes"),
            PlanWarning::EmptyLane { lane } => write!(f, "lane {lane} has no tasks"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDiagnostics {
    pub warnings: Vec<PlanWarning>,
}

impl PlanDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Inspect a plan for fill-level and empty-lane advisories.
pub fn validate_plan(plan: &DailyPlan) -> PlanDiagnostics {
    let mut warnings = Vec::new();
    let target = plan.target_minutes();
    let total = plan.total_minutes;

    if (total as f64) < target as f64 * UNDER_FILL_RATIO {
        warnings.push(PlanWarning::UnderFilled {
            total_minutes: total,
            target_minutes: target,
        });
    } else if total as f64 > target as f64 * OVER_FILL_RATIO {
        warnings.push(PlanWarning::OverFilled {
            total_minutes: total,
            target_minutes: target,
        });
    }

    for lane in plan.lanes() {
        if lane.is_empty() {
            warnings.push(PlanWarning::EmptyLane { lane: lane.kind });
        }
    }

    PlanDiagnostics { warnings }
}
