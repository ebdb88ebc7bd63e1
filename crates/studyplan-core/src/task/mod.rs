//! Study task types.
//!
//! A task is a unit of work in the student's backlog. Its [`TaskType`]
//! drives both the importance base score and which lane of the daily plan
//! it has affinity for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of study work a task represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Graded coursework with an external deadline.
    AssignmentWork,
    /// Building exam knowledge (reading, notes, review).
    ExamBuild,
    /// Timed practice questions or mock papers.
    TimedPractice,
}

impl TaskType {
    /// Base importance score before any exam-proximity boost.
    pub fn base_importance(&self) -> f64 {
        match self {
            TaskType::AssignmentWork => 70.0,
            TaskType::ExamBuild => 50.0,
            TaskType::TimedPractice => 30.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::AssignmentWork => "assignment_work",
            TaskType::ExamBuild => "exam_build",
            TaskType::TimedPractice => "timed_practice",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a task came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskOrigin {
    /// Created by the student.
    #[default]
    User,
    /// Generated from a cluster of recent mistakes on a unit.
    Remediation,
}

/// A task in the student's backlog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub task_type: TaskType,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    pub estimated_minutes: u32,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub origin: TaskOrigin,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new incomplete user task with a generated id.
    pub fn new(title: impl Into<String>, task_type: TaskType, estimated_minutes: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            task_type,
            due_at: None,
            estimated_minutes,
            unit_id: None,
            course_id: None,
            completed: false,
            origin: TaskOrigin::User,
            created_at: Utc::now(),
        }
    }

    pub fn with_due(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn with_unit(mut self, unit_id: impl Into<String>) -> Self {
        self.unit_id = Some(unit_id.into());
        self
    }

    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    /// Whether the task still has work left.
    pub fn is_open(&self) -> bool {
        !self.completed
    }
}
