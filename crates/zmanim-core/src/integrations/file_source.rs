//! Local JSON file with the same shape as the time-service answer.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::path::PathBuf;

use crate::error::SourceError;
use crate::integrations::hebcal::parse_times;
use crate::integrations::traits::{Location, TimeSource};
use crate::time_points::RawTimes;

/// Reads `path`, with any `{date}` replaced by `YYYY-MM-DD`. The location
/// is ignored; the file is already specific to one place.
pub struct FileSource {
    path: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into().to_string_lossy().into_owned(),
        }
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        PathBuf::from(
            self.path
                .replace("{date}", &date.format("%Y-%m-%d").to_string()),
        )
    }
}

#[async_trait]
impl TimeSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, date: NaiveDate, _location: Location) -> Result<RawTimes, SourceError> {
        let path = self.path_for(date);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| SourceError::File {
                path: path.clone(),
                source,
            })?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::Malformed(format!("{}: {e}", path.display())))?;
        parse_times(&body)
    }
}
