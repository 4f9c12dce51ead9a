use crate::{SearchOracle, SearchRequest};
use async_trait::async_trait;
use homesense_core::{read_csv_rows, CandidateRow, Result};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Serves a fixed result set, e.g. a CSV export of an earlier search.
///
/// Every request gets the same rows, so the snapshot should hold the results
/// for one location.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOracle {
    rows: Vec<CandidateRow>,
}

impl SnapshotOracle {
    pub fn new(rows: Vec<CandidateRow>) -> Self {
        Self { rows }
    }

    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rows = read_csv_rows(File::open(path)?)?;
        info!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(Self::new(rows))
    }

    pub fn rows(&self) -> &[CandidateRow] {
        &self.rows
    }
}

#[async_trait]
impl SearchOracle for SnapshotOracle {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn search(&self, _request: &SearchRequest) -> Result<Vec<CandidateRow>> {
        Ok(self.rows.clone())
    }
}
