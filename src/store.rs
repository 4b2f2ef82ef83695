//! JSON snapshot persistence for a single job.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::MoveError;
use crate::state_machine::Job;

pub struct JobStore {
    path: PathBuf,
}

impl JobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the snapshot back. A ledger edited by hand into an invalid state
    /// is refused rather than handed to the workflow.
    pub fn load(&self) -> Result<Job, MoveError> {
        if !self.exists() {
            return Err(MoveError::NoJob(self.path.display().to_string()));
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let job: Job = serde_json::from_str(&contents)?;
        job.charges.validate()?;
        debug!(path = %self.path.display(), job_id = %job.id, status = %job.status, "job loaded");
        Ok(job)
    }

    pub fn save(&self, job: &Job) -> Result<(), MoveError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(job)?;
        std::fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), job_id = %job.id, "job saved");
        Ok(())
    }
}
