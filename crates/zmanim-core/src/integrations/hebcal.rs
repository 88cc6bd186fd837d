//! Hebcal zmanim API -- fetch the day's times over HTTP.
//!
//! `GET {base}/zmanim?cfg=json&geonameid={id}&date=YYYY-MM-DD`; the answer
//! carries a `times` object of `label -> ISO-8601` strings.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::SourceError;
use crate::integrations::traits::{Location, TimeSource};
use crate::time_points::RawTimes;

pub struct HebcalSource {
    client: Client,
    base_url: Url,
}

impl HebcalSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| SourceError::Malformed(format!("base_url: {e}")))?;
        // Url::join drops the last path segment unless it ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn request_url(&self, date: NaiveDate, location: Location) -> Result<Url, SourceError> {
        let mut url = self
            .base_url
            .join("zmanim")
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("cfg", "json")
            .append_pair("geonameid", &location.geonameid.to_string())
            .append_pair("date", &date.format("%Y-%m-%d").to_string());
        Ok(url)
    }
}

/// Extract the `times` object, keeping only string values.
pub fn parse_times(body: &Value) -> Result<RawTimes, SourceError> {
    let times = body
        .get("times")
        .and_then(Value::as_object)
        .ok_or_else(|| SourceError::Malformed("missing `times` object".into()))?;

    Ok(times
        .iter()
        .filter_map(|(key, value)| match value.as_str() {
            Some(s) => Some((key.clone(), s.to_string())),
            None => {
                debug!(key = %key, "skipping non-string time value");
                None
            }
        })
        .collect())
}

#[async_trait]
impl TimeSource for HebcalSource {
    fn name(&self) -> &str {
        "hebcal"
    }

    async fn fetch(&self, date: NaiveDate, location: Location) -> Result<RawTimes, SourceError> {
        let url = self.request_url(date, location)?;
        debug!(url = %url, "fetching times");

        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status {
                status: resp.status().as_u16(),
            });
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        parse_times(&body)
    }
}
