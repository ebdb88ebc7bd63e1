//! JSON dataset of study records.
//!
//! The dataset is the snapshot the engine works from: tasks, units, courses,
//! question attempts, and focus sessions. Callers that keep records elsewhere
//! can build a [`Dataset`] in memory instead of loading one.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::course::{Course, FocusSession, QuestionAttempt, StudyUnit};
use crate::error::StorageError;
use crate::task::Task;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub units: Vec<StudyUnit>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub attempts: Vec<QuestionAttempt>,
    #[serde(default)]
    pub sessions: Vec<FocusSession>,
}

impl Dataset {
    /// Load a dataset file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let load_failed = |message: String| StorageError::DatasetLoad {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| load_failed(e.to_string()))
    }

    /// Load a dataset file, treating a missing file as an empty dataset.
    pub fn load_or_empty(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no dataset file, starting empty");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write the dataset as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let save_failed = |message: String| StorageError::DatasetSave {
            path: path.to_path_buf(),
            message,
        };
        let content = serde_json::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        // Write beside the target, then rename over it.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| save_failed(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| save_failed(e.to_string()))
    }

    pub fn course_map(&self) -> HashMap<String, Course> {
        self.courses.iter().map(|c| (c.id.clone(), c.clone())).collect()
    }

    pub fn open_tasks(&self) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.is_open()).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskType;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ds = Dataset::load_or_empty(&dir.path().join("none.json")).unwrap();
        assert_eq!(ds, Dataset::default());
    }

    #[test]
    fn missing_file_is_an_error_for_strict_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load(&dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, StorageError::DatasetLoad { .. }));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let mut ds = Dataset::default();
        ds.units.push(StudyUnit::new("u1", "c1", 1, "Limits"));
        ds.tasks.push(Task::new("Essay", TaskType::AssignmentWork, 60).with_unit("u1"));
        ds.save(&path).unwrap();

        let loaded = Dataset::load(&path).unwrap();
        assert_eq!(loaded, ds);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn partial_json_fills_empty_collections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        std::fs::write(&path, r#"{"courses": [{"id": "c1", "name": "Physics"}]}"#).unwrap();
        let ds = Dataset::load(&path).unwrap();
        assert_eq!(ds.courses.len(), 1);
        assert!(ds.courses[0].exam_date.is_none());
        assert!(ds.tasks.is_empty());
    }

    #[test]
    fn lookups_and_open_tasks() {
        let mut ds = Dataset::default();
        ds.courses.push(Course {
            id: "c1".into(),
            name: "Physics".into(),
            exam_date: None,
            target_score: None,
        });
        let mut done = Task::new("done", TaskType::ExamBuild, 10);
        done.completed = true;
        ds.tasks.push(done);
        ds.tasks.push(Task::new("open", TaskType::ExamBuild, 10));

        assert!(ds.course_map().contains_key("c1"));
        assert_eq!(ds.open_tasks().len(), 1);
        assert_eq!(ds.open_tasks()[0].title, "open");
    }
}
