//! File-backed state sink.
//!
//! Layout under the state directory:
//! - `<labelKey>.json` for every label
//! - `current.json`
//! - `hour.json`
//! - `suppressed.json`
//!
//! Each file is written to a `.tmp` sibling and renamed into place, so a
//! reader never sees a partially written value.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::records::{CurrentRecord, LabelState, SuppressionRecord};
use crate::error::{CoreError, DeliveryError};
use crate::halachic::HourRecord;
use crate::integrations::StateSink;
use crate::label::ZmanLabel;

const CURRENT_FILE: &str = "current.json";
const HOUR_FILE: &str = "hour.json";
const SUPPRESSED_FILE: &str = "suppressed.json";

#[derive(Debug, Clone)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn label_path(&self, label: ZmanLabel) -> PathBuf {
        self.dir.join(format!("{}.json", label.key()))
    }

    async fn write_json<T: Serialize + Sync>(&self, file: &str, value: &T) -> Result<(), DeliveryError> {
        let path = self.dir.join(file);
        let tmp = self.dir.join(format!("{file}.tmp"));
        let body = serde_json::to_vec_pretty(value)?;
        let write_err = |source| DeliveryError::Write {
            path: path.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(write_err)?;
        tokio::fs::write(&tmp, body).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(write_err)?;
        debug!(path = %path.display(), "state written");
        Ok(())
    }

    async fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<Option<T>, CoreError> {
        match tokio::fs::read(self.dir.join(file)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Last written record for `label`, if any.
    pub async fn read_label(&self, label: ZmanLabel) -> Result<Option<LabelState>, CoreError> {
        self.read_json(&format!("{}.json", label.key())).await
    }

    pub async fn read_current(&self) -> Result<Option<CurrentRecord>, CoreError> {
        self.read_json(CURRENT_FILE).await
    }

    /// `None` when the file is missing or holds `null`.
    pub async fn read_hour(&self) -> Result<Option<HourRecord>, CoreError> {
        let record: Option<Option<HourRecord>> = self.read_json(HOUR_FILE).await?;
        Ok(record.flatten())
    }

    pub async fn read_suppression(&self) -> Result<Option<SuppressionRecord>, CoreError> {
        self.read_json(SUPPRESSED_FILE).await
    }
}

#[async_trait]
impl StateSink for FileStateStore {
    async fn write_label(&self, state: &LabelState) -> Result<(), DeliveryError> {
        self.write_json(&format!("{}.json", state.label.key()), state)
            .await
    }

    async fn write_current(&self, record: &CurrentRecord) -> Result<(), DeliveryError> {
        self.write_json(CURRENT_FILE, record).await
    }

    async fn write_hour(&self, record: Option<&HourRecord>) -> Result<(), DeliveryError> {
        self.write_json(HOUR_FILE, &record).await
    }

    async fn write_suppression(&self, record: &SuppressionRecord) -> Result<(), DeliveryError> {
        self.write_json(SUPPRESSED_FILE, record).await
    }
}
