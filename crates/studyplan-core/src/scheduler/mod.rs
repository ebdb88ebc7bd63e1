//! Lane scheduler for the daily study plan.
//!
//! Scored tasks are allocated into three time-budgeted lanes:
//!
//! | Lane          | Share of daily target | Fed by |
//! |---------------|-----------------------|--------|
//! | DueSoon       | 65%                   | AssignmentWork, then urgent ExamBuild |
//! | ExamBuild     | 25%                   | ExamBuild, weakest units first |
//! | TimedPractice | 10%                   | TimedPractice |
//!
//! Every lane admits at most five tasks and may run up to 20% over its
//! budget. Admission is first-fit in a single forward pass: a task that does
//! not fit is skipped and never revisited.

mod snapshot;
mod validate;

pub use snapshot::{LaneSnapshot, PlanSnapshot, RestoredLane, RestoredPlan};
pub use validate::{validate_plan, PlanDiagnostics, PlanWarning};

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoredTask;
use crate::task::TaskType;

/// The three lanes of a daily plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LaneKind {
    DueSoon,
    ExamBuild,
    TimedPractice,
}

impl LaneKind {
    pub const ALL: [LaneKind; 3] = [LaneKind::DueSoon, LaneKind::ExamBuild, LaneKind::TimedPractice];

    /// Fraction of the daily target budgeted to this lane.
    pub fn fraction(&self) -> f64 {
        match self {
            LaneKind::DueSoon => 0.65,
            LaneKind::ExamBuild => 0.25,
            LaneKind::TimedPractice => 0.10,
        }
    }

    /// Task type this lane draws from first.
    pub fn affinity(&self) -> TaskType {
        match self {
            LaneKind::DueSoon => TaskType::AssignmentWork,
            LaneKind::ExamBuild => TaskType::ExamBuild,
            LaneKind::TimedPractice => TaskType::TimedPractice,
        }
    }

    /// Budget in minutes for a given daily target.
    pub fn budget_for(&self, daily_minutes_target: u32) -> u32 {
        (daily_minutes_target as f64 * self.fraction()).round() as u32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LaneKind::DueSoon => "due_soon",
            LaneKind::ExamBuild => "exam_build",
            LaneKind::TimedPractice => "timed_practice",
        }
    }
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lane of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub kind: LaneKind,
    /// Admitted tasks in admission order.
    pub tasks: Vec<ScoredTask>,
    /// Sum of admitted tasks' estimated minutes.
    pub total_minutes: u32,
    /// Budget computed before allocation.
    pub target_minutes: u32,
}

impl Lane {
    fn empty(kind: LaneKind, target_minutes: u32) -> Self {
        Self {
            kind,
            tasks: Vec::new(),
            total_minutes: 0,
            target_minutes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// A day's plan: three lanes and their combined minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub due_soon: Lane,
    pub exam_build: Lane,
    pub timed_practice: Lane,
    pub total_minutes: u32,
    pub generated_at: DateTime<Utc>,
}

impl DailyPlan {
    /// Lanes in display order.
    pub fn lanes(&self) -> [&Lane; 3] {
        [&self.due_soon, &self.exam_build, &self.timed_practice]
    }

    pub fn lane(&self, kind: LaneKind) -> &Lane {
        match kind {
            LaneKind::DueSoon => &self.due_soon,
            LaneKind::ExamBuild => &self.exam_build,
            LaneKind::TimedPractice => &self.timed_practice,
        }
    }

    /// Sum of the three lane budgets.
    pub fn target_minutes(&self) -> u32 {
        self.lanes().iter().map(|l| l.target_minutes).sum()
    }

    pub fn task_count(&self) -> usize {
        self.lanes().iter().map(|l| l.tasks.len()).sum()
    }
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum tasks per lane
    pub max_tasks_per_lane: usize,
    /// Multiplier on a lane budget that admitted minutes may reach
    pub budget_tolerance: f64,
    /// ExamBuild tasks above this urgency may spill into DueSoon
    pub overflow_urgency: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_lane: 5,
            budget_tolerance: 1.2,
            overflow_urgency: 50.0,
        }
    }
}

/// Lane being filled during a scheduling pass.
struct LaneFill {
    kind: LaneKind,
    target_minutes: u32,
    limit_minutes: f64,
    max_tasks: usize,
    tasks: Vec<ScoredTask>,
    total_minutes: u32,
}

impl LaneFill {
    fn new(kind: LaneKind, target_minutes: u32, config: &SchedulerConfig) -> Self {
        Self {
            kind,
            target_minutes,
            limit_minutes: target_minutes as f64 * config.budget_tolerance,
            max_tasks: config.max_tasks_per_lane,
            tasks: Vec::new(),
            total_minutes: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.tasks.len() >= self.max_tasks
    }

    /// Admit `task` if the lane has a free slot and the budget allows it.
    fn try_admit(&mut self, task: &ScoredTask) -> bool {
        if self.is_full() {
            return false;
        }
        let Some(next_total) = self.total_minutes.checked_add(task.minutes()) else {
            return false;
        };
        if next_total as f64 > self.limit_minutes {
            return false;
        }
        self.total_minutes = next_total;
        self.tasks.push(task.clone());
        true
    }

    fn finish(self) -> Lane {
        tracing::debug!(
            lane = %self.kind,
            tasks = self.tasks.len(),
            minutes = self.total_minutes,
            target = self.target_minutes,
            "lane filled"
        );
        Lane {
            kind: self.kind,
            tasks: self.tasks,
            total_minutes: self.total_minutes,
            target_minutes: self.target_minutes,
        }
    }
}

/// Allocates scored tasks into the three lanes of a daily plan.
#[derive(Debug, Clone, Default)]
pub struct LaneScheduler {
    config: SchedulerConfig,
}

impl LaneScheduler {
    /// Create a new scheduler with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Build a plan from tasks already sorted by total, highest first.
    ///
    /// Completed tasks are ignored. With nothing to schedule the plan has
    /// three empty lanes at their budgets.
    pub fn schedule(&self, scored: &[ScoredTask], daily_minutes_target: u32, now: DateTime<Utc>) -> DailyPlan {
        let open: Vec<&ScoredTask> = scored.iter().filter(|s| s.task.is_open()).collect();

        if open.is_empty() {
            return self.empty_plan(daily_minutes_target, now);
        }

        // Pools hold indices into `open`, in score order.
        let pool = |task_type: TaskType| -> Vec<usize> {
            (0..open.len())
                .filter(|&i| open[i].task_type() == task_type)
                .collect()
        };
        let assignment_pool = pool(LaneKind::DueSoon.affinity());
        let exam_pool = pool(LaneKind::ExamBuild.affinity());
        let practice_pool = pool(LaneKind::TimedPractice.affinity());

        let mut due_soon = self.lane_fill(LaneKind::DueSoon, daily_minutes_target);
        for &i in &assignment_pool {
            if due_soon.is_full() {
                break;
            }
            due_soon.try_admit(open[i]);
        }

        // Urgent exam work spills into DueSoon; claimed tasks leave the
        // ExamBuild pool.
        let mut claimed: HashSet<usize> = HashSet::new();
        for &i in &exam_pool {
            if due_soon.is_full() {
                break;
            }
            if open[i].urgency > self.config.overflow_urgency && due_soon.try_admit(open[i]) {
                claimed.insert(i);
            }
        }

        let mut exam_remaining: Vec<usize> = exam_pool
            .into_iter()
            .filter(|i| !claimed.contains(i))
            .collect();
        exam_remaining.sort_by(|&a, &b| open[b].weakness_bonus.total_cmp(&open[a].weakness_bonus));

        let mut exam_build = self.lane_fill(LaneKind::ExamBuild, daily_minutes_target);
        for &i in &exam_remaining {
            if exam_build.is_full() {
                break;
            }
            exam_build.try_admit(open[i]);
        }

        let mut timed_practice = self.lane_fill(LaneKind::TimedPractice, daily_minutes_target);
        for &i in &practice_pool {
            if timed_practice.is_full() {
                break;
            }
            timed_practice.try_admit(open[i]);
        }

        let due_soon = due_soon.finish();
        let exam_build = exam_build.finish();
        let timed_practice = timed_practice.finish();
        let total_minutes = due_soon
            .total_minutes
            .saturating_add(exam_build.total_minutes)
            .saturating_add(timed_practice.total_minutes);

        tracing::debug!(total_minutes, daily_minutes_target, "daily plan generated");

        DailyPlan {
            due_soon,
            exam_build,
            timed_practice,
            total_minutes,
            generated_at: now,
        }
    }

    fn lane_fill(&self, kind: LaneKind, daily_minutes_target: u32) -> LaneFill {
        LaneFill::new(kind, kind.budget_for(daily_minutes_target), &self.config)
    }

    fn empty_plan(&self, daily_minutes_target: u32, now: DateTime<Utc>) -> DailyPlan {
        let lane = |kind: LaneKind| Lane::empty(kind, kind.budget_for(daily_minutes_target));
        DailyPlan {
            due_soon: lane(LaneKind::DueSoon),
            exam_build: lane(LaneKind::ExamBuild),
            timed_practice: lane(LaneKind::TimedPractice),
            total_minutes: 0,
            generated_at: now,
        }
    }
}

/// Build a plan with the default scheduler configuration.
pub fn schedule_tasks(scored: &[ScoredTask], daily_minutes_target: u32) -> DailyPlan {
    LaneScheduler::new().schedule(scored, daily_minutes_target, Utc::now())
}
