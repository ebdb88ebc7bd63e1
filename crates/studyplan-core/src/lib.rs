//! # studyplan Core Library
//!
//! This library turns a student's task backlog into a prioritized,
//! time-bounded daily plan and measures exam readiness per course. The
//! engine itself is pure and synchronous; the CLI binary and any other
//! caller supply records and consume plans and scores.
//!
//! ## Architecture
//!
//! - **Mastery**: 0-100 per study unit from task completion and accuracy
//! - **Readiness**: 0-100 per course from coverage, accuracy, recency, pacing
//! - **Scoring**: 0-100 priority per task from urgency, importance, weakness
//!   and spaced-repetition recency
//! - **Scheduler**: three budgeted lanes (DueSoon, ExamBuild, TimedPractice)
//! - **Storage**: TOML configuration, JSON dataset, SQLite plan history
//!
//! ## Key Components
//!
//! - [`score_tasks`]: sorted priority scores for a batch of tasks
//! - [`LaneScheduler`]: lane allocation into a [`DailyPlan`]
//! - [`ReadinessAggregator`]: per-course readiness with isolated failures
//! - [`StudyPlanner`]: dataset-level facade used by the CLI

pub mod course;
pub mod error;
pub mod mastery;
pub mod planner;
pub mod readiness;
pub mod remediation;
pub mod scheduler;
pub mod scoring;
pub mod storage;
pub mod task;

pub use course::{Course, FocusSession, QuestionAttempt, StudyUnit};
pub use error::{ConfigError, CoreError, ReadinessError, StorageError, ValidationError};
pub use mastery::{compute_unit_mastery, update_unit_mastery};
pub use planner::{PlanOutcome, StudyPlanner};
pub use readiness::{compute_readiness, CourseReadiness, ReadinessAggregator, ReadinessScore};
pub use remediation::{RemediationCandidate, RemediationDetector};
pub use scheduler::{
    schedule_tasks, validate_plan, DailyPlan, Lane, LaneKind, LaneScheduler, PlanDiagnostics,
    PlanSnapshot, PlanWarning,
};
pub use scoring::{score_task, score_tasks, ScoredTask, ScoringContext};
pub use storage::{Config, Dataset, PlanHistory};
pub use task::{Task, TaskOrigin, TaskType};
