//! Task priority scoring.
//!
//! Each open task gets a 0-100 priority from four sub-scores:
//!
//! | Term           | Range  | Weight |
//! |----------------|--------|--------|
//! | urgency        | 0-100  | 0.40   |
//! | importance     | 0-100  | 0.35   |
//! | weakness bonus | 0-50   | 0.15   |
//! | recency bonus  | 0-25   | 0.10   |
//!
//! Urgency decays exponentially with days until due:
//!
//! ```text
//! urgency = 100 * e^(-days / 7)    (days floored at 0, undated tasks = 10)
//! ```
//!
//! Every sub-score is rounded to two decimals before weighting, and the
//! weighted sum is rounded to two decimals again.
//!
//! Tasks that point at a unit or course missing from the lookups are scored
//! as if they had no link: no weakness bonus, neutral recency, no exam boost.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::course::{Course, StudyUnit};
use crate::task::{Task, TaskType};

const URGENCY_WEIGHT: f64 = 0.40;
const IMPORTANCE_WEIGHT: f64 = 0.35;
const WEAKNESS_WEIGHT: f64 = 0.15;
const RECENCY_WEIGHT: f64 = 0.10;

/// Urgency for tasks without a due date.
const UNDATED_URGENCY: f64 = 10.0;
/// Decay constant for urgency, in days.
const URGENCY_DECAY_DAYS: f64 = 7.0;
/// Exams closer than this many days boost importance.
const EXAM_BOOST_WINDOW_DAYS: f64 = 30.0;
const MAX_EXAM_BOOST: f64 = 30.0;
/// Recency bonus for tasks with no unit.
const NEUTRAL_RECENCY: f64 = 15.0;
const MAX_RECENCY: f64 = 25.0;

/// A task with its priority breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTask {
    pub task: Task,
    pub urgency: f64,
    pub importance: f64,
    pub weakness_bonus: f64,
    pub recency_bonus: f64,
    pub total: f64,
}

impl ScoredTask {
    pub fn task_type(&self) -> TaskType {
        self.task.task_type
    }

    pub fn minutes(&self) -> u32 {
        self.task.estimated_minutes
    }
}

/// Lookups and clock used while scoring a batch of tasks.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub units: &'a HashMap<String, StudyUnit>,
    pub courses: &'a HashMap<String, Course>,
    pub now: DateTime<Utc>,
}

impl<'a> ScoringContext<'a> {
    pub fn new(
        units: &'a HashMap<String, StudyUnit>,
        courses: &'a HashMap<String, Course>,
        now: DateTime<Utc>,
    ) -> Self {
        Self { units, courses, now }
    }

    fn unit_for(&self, task: &Task) -> Option<&'a StudyUnit> {
        task.unit_id.as_deref().and_then(|id| self.units.get(id))
    }

    /// Course reached through the task's unit.
    fn exam_course_for(&self, task: &Task) -> Option<&'a Course> {
        self.unit_for(task)
            .and_then(|unit| self.courses.get(&unit.course_id))
    }

    /// Score one task.
    pub fn score_task(&self, task: &Task) -> ScoredTask {
        let unit = self.unit_for(task);
        let days_until_exam = self
            .exam_course_for(task)
            .and_then(|c| c.exam_date)
            .map(|exam| calendar_days_between(self.now, exam));

        let urgency = round2(urgency_score(task.due_at, self.now));
        let importance = round2(importance_score(task.task_type, days_until_exam));
        let weakness_bonus = round2(weakness_bonus(unit.map(|u| u.mastery)));
        let recency_bonus = round2(recency_bonus(unit.map(|u| u.last_studied_at), self.now));

        let total = round2(
            urgency * URGENCY_WEIGHT
                + importance * IMPORTANCE_WEIGHT
                + weakness_bonus * WEAKNESS_WEIGHT
                + recency_bonus * RECENCY_WEIGHT,
        )
        .clamp(0.0, 100.0);

        ScoredTask {
            task: task.clone(),
            urgency,
            importance,
            weakness_bonus,
            recency_bonus,
            total,
        }
    }

    /// Score a batch and sort it by total, highest first.
    ///
    /// The sort is stable: tasks with equal totals keep their input order.
    pub fn score_tasks(&self, tasks: &[Task]) -> Vec<ScoredTask> {
        let mut scored: Vec<ScoredTask> = tasks.iter().map(|t| self.score_task(t)).collect();
        scored.sort_by(|a, b| b.total.total_cmp(&a.total));
        tracing::debug!(count = scored.len(), "scored tasks");
        scored
    }
}

/// Score one task against the given lookups.
pub fn score_task(
    task: &Task,
    units: &HashMap<String, StudyUnit>,
    courses: &HashMap<String, Course>,
    now: DateTime<Utc>,
) -> ScoredTask {
    ScoringContext::new(units, courses, now).score_task(task)
}

/// Score all tasks, sorted descending by total (stable for ties).
pub fn score_tasks(
    tasks: &[Task],
    units: &HashMap<String, StudyUnit>,
    courses: &HashMap<String, Course>,
    now: DateTime<Utc>,
) -> Vec<ScoredTask> {
    ScoringContext::new(units, courses, now).score_tasks(tasks)
}

/// Urgency (0-100) from the due date.
pub fn urgency_score(due_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(due) = due_at else {
        return UNDATED_URGENCY;
    };
    // Overdue tasks are pinned at 100.
    let days = calendar_days_between(now, due).max(0) as f64;
    100.0 * (-days / URGENCY_DECAY_DAYS).exp()
}

/// Importance (0-100): type base plus a linear boost as the exam nears.
pub fn importance_score(task_type: TaskType, days_until_exam: Option<i64>) -> f64 {
    let boost = match days_until_exam {
        Some(days) if days > 0 && days as f64 <= EXAM_BOOST_WINDOW_DAYS => {
            MAX_EXAM_BOOST * (1.0 - days as f64 / EXAM_BOOST_WINDOW_DAYS)
        }
        _ => 0.0,
    };
    (task_type.base_importance() + boost).min(100.0)
}

/// Weakness bonus (0-50) from unit mastery; `None` means no unit.
pub fn weakness_bonus(mastery: Option<u8>) -> f64 {
    match mastery {
        None => 0.0,
        Some(m) if m < 30 => 50.0,
        Some(m) if m < 50 => 30.0,
        Some(m) if m < 70 => 15.0,
        Some(_) => 0.0,
    }
}

/// Spaced-repetition recency bonus (0-25).
///
/// `None` means the task has no unit; `Some(None)` means the unit was
/// never studied. Days are calendar days, as for urgency.
pub fn recency_bonus(last_studied: Option<Option<DateTime<Utc>>>, now: DateTime<Utc>) -> f64 {
    match last_studied {
        None => NEUTRAL_RECENCY,
        Some(None) => MAX_RECENCY,
        Some(Some(at)) => {
            let days = calendar_days_between(at, now);
            match days {
                d if d < 2 => 0.0,
                d if d < 7 => 10.0 + 2.0 * (d - 2) as f64,
                _ => MAX_RECENCY,
            }
        }
    }
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
fn calendar_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to.date_naive() - from.date_naive()).num_days()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
