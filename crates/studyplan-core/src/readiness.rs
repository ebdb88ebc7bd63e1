//! Exam readiness aggregation.
//!
//! Readiness (0-100) for a course is a weighted blend of four sub-scores:
//!
//! | Sub-score | Weight | Meaning |
//! |-----------|--------|---------|
//! | coverage  | 0.25   | % of units with mastery >= 50 |
//! | accuracy  | 0.35   | % of correct practice attempts |
//! | recency   | 0.20   | % of units studied within the recency window |
//! | pacing    | 0.20   | whether remaining work fits before the exam |
//!
//! Pacing compares the days of work left (at the student's recent velocity)
//! against the days left before the exam, using a five-step table rather
//! than a continuous curve:
//!
//! ```text
//! ratio = required_days / days_until_exam
//! <= 0.50 -> 100, <= 0.75 -> 75, <= 1.0 -> 50, <= 1.5 -> 25, else 10
//! ```
//!
//! Accuracy is 0 when a course has no attempts yet, so "no data" and
//! "everything wrong" look the same to the total.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::course::{Course, FocusSession, QuestionAttempt, StudyUnit};
use crate::error::ReadinessError;
use crate::task::Task;

const COVERAGE_WEIGHT: f64 = 0.25;
const ACCURACY_WEIGHT: f64 = 0.35;
const RECENCY_WEIGHT: f64 = 0.20;
const PACING_WEIGHT: f64 = 0.20;

/// Units at or above this mastery count as covered.
const COVERED_MASTERY: u8 = 50;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Readiness breakdown for one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessScore {
    pub total: u8,
    pub coverage: u8,
    pub accuracy: u8,
    pub recency: u8,
    pub pacing: u8,
}

/// Readiness result for one course in a batch.
#[derive(Debug, Clone)]
pub struct CourseReadiness {
    pub course_id: String,
    pub course_name: String,
    pub result: Result<ReadinessScore, ReadinessError>,
}

/// Tunables for readiness aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadinessConfig {
    /// Units studied within this many days count as recent.
    pub recency_window_days: i64,
    /// Focus sessions within this many days feed the velocity estimate.
    pub velocity_window_days: i64,
    /// Daily minutes assumed when there is no recent session history.
    pub default_daily_minutes: f64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            recency_window_days: 14,
            velocity_window_days: 30,
            default_daily_minutes: 60.0,
        }
    }
}

/// Per-course readiness calculator.
#[derive(Debug, Clone, Default)]
pub struct ReadinessAggregator {
    config: ReadinessConfig,
}

impl ReadinessAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReadinessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Compute readiness for one course.
    ///
    /// `units` are the course's units; attempts for units outside that set
    /// are ignored. `recent_daily_minutes` is the student's velocity; a
    /// non-positive value falls back to the configured default.
    pub fn compute_readiness(
        &self,
        exam_date: DateTime<Utc>,
        units: &[StudyUnit],
        attempts: &[QuestionAttempt],
        remaining_minutes: u32,
        recent_daily_minutes: f64,
        now: DateTime<Utc>,
    ) -> ReadinessScore {
        let coverage = to_score(coverage_percent(units));
        let accuracy = to_score(self.accuracy_percent(units, attempts));
        let recency = to_score(self.recency_percent(units, now));
        let pacing = self.pacing_score(exam_date, remaining_minutes, recent_daily_minutes, now);

        let weighted = coverage as f64 * COVERAGE_WEIGHT
            + accuracy as f64 * ACCURACY_WEIGHT
            + recency as f64 * RECENCY_WEIGHT
            + pacing as f64 * PACING_WEIGHT;

        ReadinessScore {
            total: to_score(weighted),
            coverage,
            accuracy,
            recency,
            pacing,
        }
    }

    fn accuracy_percent(&self, units: &[StudyUnit], attempts: &[QuestionAttempt]) -> f64 {
        let unit_ids: HashSet<&str> = units.iter().map(|u| u.id.as_str()).collect();
        let (correct, total) = attempts
            .iter()
            .filter(|a| unit_ids.contains(a.unit_id.as_str()))
            .fold((0usize, 0usize), |(c, t), a| (c + a.correct as usize, t + 1));
        if total == 0 {
            return 0.0;
        }
        correct as f64 / total as f64 * 100.0
    }

    fn recency_percent(&self, units: &[StudyUnit], now: DateTime<Utc>) -> f64 {
        if units.is_empty() {
            return 0.0;
        }
        let cutoff = now - Duration::days(self.config.recency_window_days);
        let recent = units
            .iter()
            .filter(|u| u.last_studied_at.is_some_and(|at| at >= cutoff))
            .count();
        recent as f64 / units.len() as f64 * 100.0
    }

    /// Pacing sub-score from the required-days / available-days ratio.
    pub fn pacing_score(
        &self,
        exam_date: DateTime<Utc>,
        remaining_minutes: u32,
        recent_daily_minutes: f64,
        now: DateTime<Utc>,
    ) -> u8 {
        let days_until_exam = days_until(exam_date, now);
        if days_until_exam == 0 {
            return if remaining_minutes == 0 { 100 } else { 0 };
        }

        let daily = if recent_daily_minutes > 0.0 {
            recent_daily_minutes
        } else {
            self.config.default_daily_minutes
        };
        let required_days = remaining_minutes as f64 / daily;
        let ratio = required_days / days_until_exam as f64;

        if ratio <= 0.5 {
            100
        } else if ratio <= 0.75 {
            75
        } else if ratio <= 1.0 {
            50
        } else if ratio <= 1.5 {
            25
        } else {
            10
        }
    }

    /// Average daily focus minutes over the velocity window.
    ///
    /// The window total is spread over every day of the window, not only
    /// the days with sessions. Falls back to the configured default when the
    /// window holds no focus time.
    pub fn average_daily_minutes(&self, sessions: &[FocusSession], now: DateTime<Utc>) -> f64 {
        let window = self.config.velocity_window_days.max(1);
        let cutoff = now - Duration::days(window);
        let total: u64 = sessions
            .iter()
            .filter(|s| s.ended_at >= cutoff && s.ended_at <= now)
            .map(|s| s.duration_minutes as u64)
            .sum();

        if total == 0 {
            return self.config.default_daily_minutes;
        }
        total as f64 / window as f64
    }

    /// Score every course independently.
    ///
    /// A course that cannot be scored (no exam date) gets an error entry;
    /// the remaining courses are still scored.
    pub fn score_courses(
        &self,
        courses: &[Course],
        units: &[StudyUnit],
        tasks: &[Task],
        attempts: &[QuestionAttempt],
        sessions: &[FocusSession],
        now: DateTime<Utc>,
    ) -> Vec<CourseReadiness> {
        let daily = self.average_daily_minutes(sessions, now);

        courses
            .iter()
            .map(|course| {
                let result = match course.exam_date {
                    Some(exam_date) => {
                        let course_units: Vec<StudyUnit> = units
                            .iter()
                            .filter(|u| u.course_id == course.id)
                            .cloned()
                            .collect();
                        let remaining = remaining_minutes_for_course(tasks, units, &course.id);
                        Ok(self.compute_readiness(exam_date, &course_units, attempts, remaining, daily, now))
                    }
                    None => {
                        tracing::warn!(course_id = %course.id, "skipping readiness: no exam date");
                        Err(ReadinessError::MissingExamDate {
                            course_id: course.id.clone(),
                        })
                    }
                };
                CourseReadiness {
                    course_id: course.id.clone(),
                    course_name: course.name.clone(),
                    result,
                }
            })
            .collect()
    }
}

/// Compute readiness with the default configuration.
pub fn compute_readiness(
    exam_date: DateTime<Utc>,
    units: &[StudyUnit],
    attempts: &[QuestionAttempt],
    remaining_minutes: u32,
    recent_daily_minutes: f64,
    now: DateTime<Utc>,
) -> ReadinessScore {
    ReadinessAggregator::new().compute_readiness(
        exam_date,
        units,
        attempts,
        remaining_minutes,
        recent_daily_minutes,
        now,
    )
}

/// Minutes of incomplete work linked to a course, directly or via a unit.
pub fn remaining_minutes_for_course(tasks: &[Task], units: &[StudyUnit], course_id: &str) -> u32 {
    let unit_ids: HashSet<&str> = units
        .iter()
        .filter(|u| u.course_id == course_id)
        .map(|u| u.id.as_str())
        .collect();

    tasks
        .iter()
        .filter(|t| t.is_open())
        .filter(|t| {
            t.course_id.as_deref() == Some(course_id)
                || t.unit_id.as_deref().is_some_and(|id| unit_ids.contains(id))
        })
        .fold(0u32, |acc, t| acc.saturating_add(t.estimated_minutes))
}

fn coverage_percent(units: &[StudyUnit]) -> f64 {
    if units.is_empty() {
        return 0.0;
    }
    let covered = units.iter().filter(|u| u.mastery >= COVERED_MASTERY).count();
    covered as f64 / units.len() as f64 * 100.0
}

/// Whole days until `target`, rounded up and floored at zero.
fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (target - now).num_seconds() as f64;
    (seconds / SECONDS_PER_DAY).ceil().max(0.0) as i64
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
