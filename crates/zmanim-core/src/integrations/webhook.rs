//! Webhook notification sink.
//!
//! Posts an IFTTT maker-compatible body:
//! `{ "value1": title, "value2": message, "value3": label, "type": kind }`
//! where `type` is the label key for reminders and `summary` / `startup`
//! otherwise. Delivery is attempted once.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::DeliveryError;
use crate::integrations::traits::{Notification, NotificationKind, NotificationSink};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub value1: String,
    pub value2: String,
    pub value3: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&Notification> for WebhookPayload {
    fn from(n: &Notification) -> Self {
        let label = n.label.map(|l| l.key().to_string()).unwrap_or_default();
        let kind = match n.kind {
            NotificationKind::Reminder if !label.is_empty() => label.clone(),
            NotificationKind::Reminder => "reminder".to_string(),
            NotificationKind::Summary => "summary".to_string(),
            NotificationKind::Startup => "startup".to_string(),
        };
        Self {
            value1: n.title.clone(),
            value2: n.message.clone(),
            value3: label,
            kind,
        }
    }
}

pub struct WebhookSink {
    client: Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(DeliveryError::NotConfigured);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let body = WebhookPayload::from(notification);
        let resp = self.client.post(&self.url).json(&body).send().await?;

        if resp.status().is_success() {
            debug!(kind = %body.kind, "webhook delivered");
            Ok(())
        } else {
            Err(DeliveryError::Status {
                status: resp.status().as_u16(),
            })
        }
    }
}

/// Sink used when notifications are disabled; accepts and drops everything.
pub struct DisabledSink;

#[async_trait]
impl NotificationSink for DisabledSink {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        debug!(title = %notification.title, "notifications disabled; dropping");
        Ok(())
    }
}
