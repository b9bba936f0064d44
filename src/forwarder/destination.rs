use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::destination::DestinationConfig;
use crate::error::{truncate_body, ForwardError};
use crate::forwarder::record::DestinationRecord;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;

#[derive(Debug, Deserialize)]
struct ListRecordsResponse {
    #[serde(default)]
    records: Vec<Value>,
}

/// Writes records to the destination table store.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    config: DestinationConfig,
}

impl Forwarder {
    pub fn new(client: Client, config: DestinationConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &DestinationConfig {
        &self.config
    }

    /// One create call. Always a fresh record; no upsert.
    pub async fn push_record(&self, record: &DestinationRecord) -> Result<(), ForwardError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.forward_pushes.inc();

        let result = self.post(record).await;
        metrics
            .forward_duration
            .observe(start.elapsed().as_secs_f64());
        match &result {
            Ok(()) => debug!(order_id = record.order_id(), "record forwarded"),
            Err(err) => {
                warn!(order_id = record.order_id(), error = %err, "record push failed");
                metrics.forward_failures.inc();
            }
        }
        result
    }

    async fn post(&self, record: &DestinationRecord) -> Result<(), ForwardError> {
        let response = self
            .client
            .post(self.config.table_url())
            .bearer_auth(&self.config.token)
            .json(record)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(ForwardError::Status {
                status,
                body: truncate_body(body),
            });
        }
        Ok(())
    }

    /// Connectivity probe: lists at most one record and returns how many
    /// came back.
    pub async fn probe(&self) -> Result<usize, ForwardError> {
        let response = self
            .client
            .get(self.config.table_url())
            .query(&[("maxRecords", "1")])
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ForwardError::Status {
                status,
                body: truncate_body(body),
            });
        }
        let listed: ListRecordsResponse =
            serde_json::from_str(&body).map_err(|e| ForwardError::Parse(e.to_string()))?;
        Ok(listed.records.len())
    }
}
