//! Delivery sinks
//!
//! A sink accepts one day at a time and either confirms or rejects it. The
//! engine never retries within a run. A rejected day is offered again next
//! run only if no later success moved the watermark past it; with the
//! `latest-success` policy a later success skips it for good.

use crate::config::{SinkConfig, TimeoutConfig};
use crate::sync::DeliveryRecord;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a single delivery did not go through
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("sink answered {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        DeliveryError::Transport(e.to_string())
    }
}

/// Downstream receiver of daily records
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver(&self, record: &DeliveryRecord) -> Result<(), DeliveryError>;
}

/// Posts each day as a state update to a Home Assistant entity
pub struct HomeAssistantSink {
    client: Client,
    url: String,
    token: String,
}

impl HomeAssistantSink {
    pub fn new(url: &str, token: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            token: token.to_string(),
        })
    }

    pub fn from_config(sink: &SinkConfig, timeouts: &TimeoutConfig) -> Result<Self, DeliveryError> {
        Self::new(&sink.url, &sink.token, timeouts.delivery())
    }
}

#[async_trait]
impl DeliverySink for HomeAssistantSink {
    async fn deliver(&self, record: &DeliveryRecord) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&record.payload())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
