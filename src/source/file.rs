//! File-backed incident store

use super::RecordSource;
use crate::error::{Error, Result};
use crate::incidents::{parse, to_json};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Store file used when none is configured
pub const DEFAULT_STORE_FILE: &str = "incidents.json";

/// Serves the incident list kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file, validate it as an incident list, and re-encode it.
    ///
    /// Fields outside the incident model are dropped from the output.
    pub async fn list(&self) -> Result<Vec<u8>> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|source| Error::StoreRead {
                path: self.path.clone(),
                source,
            })?;

        let incidents = parse(&raw)?;
        debug!(
            "Loaded {} incidents from {}",
            incidents.report.len(),
            self.path.display()
        );
        to_json(&incidents)
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_FILE)
    }
}

#[async_trait]
impl RecordSource for FileStore {
    async fn fetch(&self) -> Result<Vec<u8>> {
        self.list().await
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
