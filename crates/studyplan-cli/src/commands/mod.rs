pub mod config;
pub mod history;
pub mod mastery;
pub mod plan;
pub mod readiness;
pub mod remediate;
pub mod score;

use std::path::PathBuf;

use studyplan_core::{Config, Dataset, StorageError, StudyPlanner};

/// Planner, dataset, and the path the dataset was loaded from.
pub struct Workspace {
    pub planner: StudyPlanner,
    pub dataset: Dataset,
    pub dataset_path: PathBuf,
}

impl Workspace {
    /// Load config and dataset. `data` overrides the configured dataset path.
    pub fn load(data: Option<PathBuf>) -> studyplan_core::error::Result<Self> {
        let config = Config::load()?;
        let dataset_path = match data.or_else(|| config.dataset_path()) {
            Some(path) => path,
            None => {
                return Err(StorageError::DataDir("cannot resolve dataset path".into()).into());
            }
        };
        let dataset = Dataset::load_or_empty(&dataset_path)?;
        tracing::debug!(
            path = %dataset_path.display(),
            tasks = dataset.tasks.len(),
            units = dataset.units.len(),
            "dataset loaded"
        );
        Ok(Self {
            planner: StudyPlanner::new(config),
            dataset,
            dataset_path,
        })
    }

    pub fn save(&self) -> studyplan_core::error::Result<()> {
        self.dataset.save(&self.dataset_path)?;
        Ok(())
    }
}
