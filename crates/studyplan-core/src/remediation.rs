//! Remediation detection.
//!
//! A unit needs remediation when it collects `error_threshold` or more
//! incorrect, not-yet-remediated attempts inside the look-back window.
//! Each such unit gets one ExamBuild review task; units that already have an
//! open remediation task are skipped.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::course::{QuestionAttempt, StudyUnit};
use crate::task::{Task, TaskOrigin, TaskType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemediationConfig {
    pub error_threshold: usize,
    pub window_days: i64,
    /// Estimated minutes for generated review tasks.
    pub task_minutes: u32,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            error_threshold: 3,
            window_days: 7,
            task_minutes: 30,
        }
    }
}

/// A unit whose recent mistakes warrant a review task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationCandidate {
    pub unit_id: String,
    pub course_id: String,
    pub unit_name: String,
    pub error_count: usize,
    /// Attempts that triggered the candidate, to be marked remediated.
    pub attempt_ids: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RemediationDetector {
    config: RemediationConfig,
}

impl RemediationDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RemediationConfig) -> Self {
        Self { config }
    }

    /// Units over the error threshold, in unit order.
    pub fn find_candidates(
        &self,
        units: &[StudyUnit],
        attempts: &[QuestionAttempt],
        now: DateTime<Utc>,
    ) -> Vec<RemediationCandidate> {
        let cutoff = now - Duration::days(self.config.window_days);

        units
            .iter()
            .filter_map(|unit| {
                let attempt_ids: Vec<String> = attempts
                    .iter()
                    .filter(|a| a.unit_id == unit.id && !a.correct && !a.remediated)
                    .filter(|a| a.attempted_at >= cutoff && a.attempted_at <= now)
                    .map(|a| a.id.clone())
                    .collect();

                if attempt_ids.len() < self.config.error_threshold {
                    return None;
                }
                Some(RemediationCandidate {
                    unit_id: unit.id.clone(),
                    course_id: unit.course_id.clone(),
                    unit_name: unit.name.clone(),
                    error_count: attempt_ids.len(),
                    attempt_ids,
                })
            })
            .collect()
    }

    /// Review tasks for candidates without an open remediation task.
    pub fn build_tasks(&self, candidates: &[RemediationCandidate], existing: &[Task], now: DateTime<Utc>) -> Vec<Task> {
        let covered: HashSet<&str> = existing
            .iter()
            .filter(|t| t.is_open() && t.origin == TaskOrigin::Remediation)
            .filter_map(|t| t.unit_id.as_deref())
            .collect();

        candidates
            .iter()
            .filter(|c| !covered.contains(c.unit_id.as_str()))
            .map(|c| {
                let mut task = Task::new(
                    format!("Review: {}", c.unit_name),
                    TaskType::ExamBuild,
                    self.config.task_minutes,
                )
                .with_unit(c.unit_id.clone())
                .with_course(c.course_id.clone());
                task.origin = TaskOrigin::Remediation;
                task.created_at = now;
                tracing::debug!(unit_id = %c.unit_id, errors = c.error_count, "remediation task created");
                task
            })
            .collect()
    }
}

/// Flag the candidates' attempts so they are not counted again.
///
/// Returns how many attempts changed.
pub fn mark_remediated(attempts: &mut [QuestionAttempt], candidates: &[RemediationCandidate]) -> usize {
    let ids: HashSet<&str> = candidates
        .iter()
        .flat_map(|c| c.attempt_ids.iter().map(String::as_str))
        .collect();

    let mut changed = 0;
    for attempt in attempts.iter_mut() {
        if !attempt.remediated && ids.contains(attempt.id.as_str()) {
            attempt.remediated = true;
            changed += 1;
        }
    }
    changed
}
