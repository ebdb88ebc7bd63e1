//! Courses, study units, and the append-only study signals recorded
//! against them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A course with an upcoming exam.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: String,
    pub name: String,
    /// Missing exam dates make readiness uncomputable for this course only.
    #[serde(default)]
    pub exam_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target_score: Option<u8>,
}

/// A chapter or topic within a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyUnit {
    pub id: String,
    pub course_id: String,
    pub number: u32,
    pub name: String,
    /// Recomputed from completion and accuracy; never set directly.
    #[serde(default)]
    pub mastery: u8,
    #[serde(default)]
    pub last_studied_at: Option<DateTime<Utc>>,
}

impl StudyUnit {
    pub fn new(id: impl Into<String>, course_id: impl Into<String>, number: u32, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            course_id: course_id.into(),
            number,
            name: name.into(),
            mastery: 0,
            last_studied_at: None,
        }
    }
}

/// A single practice-question answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionAttempt {
    pub id: String,
    pub unit_id: String,
    pub correct: bool,
    pub attempted_at: DateTime<Utc>,
    /// Set once a remediation task has been generated for this mistake.
    #[serde(default)]
    pub remediated: bool,
}

/// A completed focus session, used for velocity estimation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FocusSession {
    pub id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub duration_minutes: u32,
    pub ended_at: DateTime<Utc>,
}
