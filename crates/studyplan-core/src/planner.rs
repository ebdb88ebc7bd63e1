//! Planner facade.
//!
//! Wires a [`Dataset`] and [`Config`] through the engine in the order the
//! data flows: unit mastery, then task scoring, then lane scheduling.
//! Readiness and remediation read the same dataset independently.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::course::StudyUnit;
use crate::error::{Result, ValidationError};
use crate::mastery::{recompute_all, update_unit_mastery};
use crate::readiness::{CourseReadiness, ReadinessAggregator};
use crate::remediation::{mark_remediated, RemediationCandidate, RemediationDetector};
use crate::scheduler::{validate_plan, DailyPlan, LaneScheduler, PlanDiagnostics};
use crate::scoring::{ScoredTask, ScoringContext};
use crate::storage::{Config, Dataset};
use crate::task::Task;

/// A generated plan and its advisories.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub plan: DailyPlan,
    pub diagnostics: PlanDiagnostics,
}

/// High-level entry point used by the CLI.
#[derive(Debug, Clone, Default)]
pub struct StudyPlanner {
    config: Config,
    scheduler: LaneScheduler,
}

impl StudyPlanner {
    pub fn new(config: Config) -> Self {
        Self {
            scheduler: LaneScheduler::with_config(config.scheduler_config()),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Units with mastery recomputed from the dataset.
    pub fn current_units(&self, dataset: &Dataset) -> Vec<StudyUnit> {
        recompute_all(&dataset.units, &dataset.tasks, &dataset.attempts)
    }

    /// Write recomputed mastery back into the dataset.
    ///
    /// Returns how many units changed.
    pub fn refresh_mastery(&self, dataset: &mut Dataset) -> usize {
        let updated = self.current_units(dataset);
        let changed = dataset
            .units
            .iter()
            .zip(&updated)
            .filter(|(old, new)| old.mastery != new.mastery)
            .count();
        dataset.units = updated;
        changed
    }

    /// Recompute one unit and mark it studied now.
    pub fn record_study(
        &self,
        dataset: &mut Dataset,
        unit_id: &str,
        now: DateTime<Utc>,
    ) -> Result<u8> {
        let tasks: Vec<&Task> = dataset
            .tasks
            .iter()
            .filter(|t| t.unit_id.as_deref() == Some(unit_id))
            .collect();
        let attempts: Vec<_> = dataset
            .attempts
            .iter()
            .filter(|a| a.unit_id == unit_id)
            .collect();

        let unit = dataset
            .units
            .iter_mut()
            .find(|u| u.id == unit_id)
            .ok_or_else(|| ValidationError::NotFound {
                kind: "unit",
                id: unit_id.to_string(),
            })?;
        Ok(update_unit_mastery(unit, &tasks, &attempts, now))
    }

    /// Open tasks scored and sorted, highest first.
    pub fn score(&self, dataset: &Dataset, now: DateTime<Utc>) -> Vec<ScoredTask> {
        let units: HashMap<String, StudyUnit> = self
            .current_units(dataset)
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        let courses = dataset.course_map();
        ScoringContext::new(&units, &courses, now).score_tasks(&dataset.open_tasks())
    }

    /// Score and schedule the dataset's open tasks.
    ///
    /// `daily_minutes` overrides the configured target.
    pub fn build_plan(&self, dataset: &Dataset, daily_minutes: Option<u32>, now: DateTime<Utc>) -> PlanOutcome {
        let target = daily_minutes.unwrap_or(self.config.planner.daily_minutes_target);
        let scored = self.score(dataset, now);
        let plan = self.scheduler.schedule(&scored, target, now);
        let diagnostics = validate_plan(&plan);
        for warning in &diagnostics.warnings {
            tracing::info!("plan advisory: {warning}");
        }
        PlanOutcome { plan, diagnostics }
    }

    /// Readiness for every course in the dataset.
    pub fn readiness_report(&self, dataset: &Dataset, now: DateTime<Utc>) -> Vec<CourseReadiness> {
        let units = self.current_units(dataset);
        ReadinessAggregator::with_config(self.config.readiness_config()).score_courses(
            &dataset.courses,
            &units,
            &dataset.tasks,
            &dataset.attempts,
            &dataset.sessions,
            now,
        )
    }

    pub fn remediation_candidates(&self, dataset: &Dataset, now: DateTime<Utc>) -> Vec<RemediationCandidate> {
        RemediationDetector::with_config(self.config.remediation_config()).find_candidates(
            &dataset.units,
            &dataset.attempts,
            now,
        )
    }

    /// Create review tasks for flagged units and mark their attempts.
    ///
    /// Returns the tasks added to the dataset.
    pub fn apply_remediation(&self, dataset: &mut Dataset, now: DateTime<Utc>) -> Vec<Task> {
        let detector = RemediationDetector::with_config(self.config.remediation_config());
        let candidates = detector.find_candidates(&dataset.units, &dataset.attempts, now);
        let created = detector.build_tasks(&candidates, &dataset.tasks, now);
        mark_remediated(&mut dataset.attempts, &candidates);
        dataset.tasks.extend(created.iter().cloned());
        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::{Course, QuestionAttempt};
    use crate::scheduler::PlanWarning;
    use crate::task::TaskType;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn attempt(id: &str, unit_id: &str, correct: bool) -> QuestionAttempt {
        QuestionAttempt {
            id: id.into(),
            unit_id: unit_id.into(),
            correct,
            attempted_at: now() - Duration::days(1),
            remediated: false,
        }
    }

    fn dataset() -> Dataset {
        let mut ds = Dataset::default();
        ds.courses.push(Course {
            id: "c1".into(),
            name: "Calculus".into(),
            exam_date: Some(now() + Duration::days(10)),
            target_score: Some(80),
        });
        ds.units.push(StudyUnit::new("u1", "c1", 1, "Limits"));
        ds.units.push(StudyUnit::new("u2", "c1", 2, "Derivatives"));
        ds.tasks.push(
            Task::new("Problem set", TaskType::AssignmentWork, 45)
                .with_course("c1")
                .with_due(now() + Duration::days(1)),
        );
        ds.tasks.push(Task::new("Limits notes", TaskType::ExamBuild, 20).with_unit("u1"));
        ds.tasks.push(Task::new("Mock paper", TaskType::TimedPractice, 10).with_unit("u2"));
        ds.attempts = vec![
            attempt("a1", "u1", false),
            attempt("a2", "u1", false),
            attempt("a3", "u1", false),
            attempt("a4", "u2", true),
        ];
        ds
    }

    #[test]
    fn build_plan_fills_all_lanes() {
        let planner = StudyPlanner::default();
        let outcome = planner.build_plan(&dataset(), None, now());
        let plan = &outcome.plan;
        assert_eq!(plan.due_soon.tasks.len(), 1);
        assert_eq!(plan.exam_build.tasks.len(), 1);
        assert_eq!(plan.timed_practice.tasks.len(), 1);
        assert_eq!(plan.total_minutes, 75);
        assert!(outcome.diagnostics.is_clean());
    }

    #[test]
    fn minutes_override_changes_budgets() {
        let planner = StudyPlanner::default();
        let outcome = planner.build_plan(&dataset(), Some(50), now());
        assert_eq!(outcome.plan.due_soon.target_minutes, 33);
        // 45 > 33 * 1.2 so the assignment no longer fits.
        assert!(outcome.plan.due_soon.is_empty());
        assert!(outcome
            .diagnostics
            .warnings
            .contains(&PlanWarning::EmptyLane { lane: crate::scheduler::LaneKind::DueSoon }));
    }

    #[test]
    fn configured_lane_cap_limits_plan() {
        let mut config = Config::default();
        config.planner.max_tasks_per_lane = 1;
        let planner = StudyPlanner::new(config);

        let mut ds = dataset();
        ds.tasks.push(Task::new("Reading", TaskType::AssignmentWork, 10).with_course("c1"));
        let outcome = planner.build_plan(&ds, None, now());
        assert_eq!(outcome.plan.due_soon.tasks.len(), 1);

        let uncapped = StudyPlanner::default().build_plan(&ds, None, now());
        assert_eq!(uncapped.plan.due_soon.tasks.len(), 2);
    }

    #[test]
    fn scoring_uses_recomputed_mastery() {
        let planner = StudyPlanner::default();
        let scored = planner.score(&dataset(), now());
        let limits = scored.iter().find(|s| s.task.title == "Limits notes").unwrap();
        // u1: 0% completion, 0% accuracy -> mastery 0 -> weakness 50
        assert_eq!(limits.weakness_bonus, 50.0);
        let mock = scored.iter().find(|s| s.task.title == "Mock paper").unwrap();
        // u2: 0% completion, 100% accuracy -> 60 -> weakness 15
        assert_eq!(mock.weakness_bonus, 15.0);
    }

    #[test]
    fn refresh_mastery_writes_back() {
        let planner = StudyPlanner::default();
        let mut ds = dataset();
        let changed = planner.refresh_mastery(&mut ds);
        assert_eq!(changed, 1);
        assert_eq!(ds.units[1].mastery, 60);
        assert!(ds.units[1].last_studied_at.is_none());
    }

    #[test]
    fn record_study_stamps_unit() {
        let planner = StudyPlanner::default();
        let mut ds = dataset();
        let score = planner.record_study(&mut ds, "u2", now()).unwrap();
        assert_eq!(score, 60);
        assert_eq!(ds.units[1].last_studied_at, Some(now()));
        let err = planner.record_study(&mut ds, "nope", now()).unwrap_err();
        assert!(matches!(err, crate::error::CoreError::Validation(ValidationError::NotFound { .. })));
    }

    #[test]
    fn readiness_report_covers_each_course() {
        let planner = StudyPlanner::default();
        let report = planner.readiness_report(&dataset(), now());
        assert_eq!(report.len(), 1);
        let score = report[0].result.as_ref().unwrap();
        // one of two units reaches mastery 50
        assert_eq!(score.coverage, 50);
        assert_eq!(score.accuracy, 25);
    }

    #[test]
    fn apply_remediation_adds_task_once() {
        let planner = StudyPlanner::default();
        let mut ds = dataset();
        assert_eq!(planner.remediation_candidates(&ds, now()).len(), 1);

        let created = planner.apply_remediation(&mut ds, now());
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].unit_id.as_deref(), Some("u1"));
        assert_eq!(ds.tasks.len(), 4);
        assert!(ds.attempts.iter().filter(|a| a.unit_id == "u1").all(|a| a.remediated));

        assert!(planner.apply_remediation(&mut ds, now()).is_empty());
        assert_eq!(ds.tasks.len(), 4);
    }
}
