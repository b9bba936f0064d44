//! Token Provider → Resource Fetcher → Forwarder, once per trigger.
//!
//! Nothing survives a run: the token, the temporary identity and the
//! signing adapter are rebuilt every time.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::auth::{Credential, IdentityProvider, RequestSigner, TokenProvider};
use crate::config::destination::{DestinationConfig, ForwardMode};
use crate::config::marketplace::MarketplaceConfig;
use crate::config::service::ServiceConfig;
use crate::error::{AuthError, ForwardError, SyncError};
use crate::forwarder::{DestinationRecord, Forwarder};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::orders::{OrderRecord, OrdersFetcher};

const SIGNING_SERVICE: &str = "execute-api";

/// Credentials resolved for one trigger.
#[derive(Debug, Clone)]
pub struct Session {
    pub credential: Credential,
    pub signer: Option<RequestSigner>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailedRecord {
    pub order_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct SyncReport {
    pub synced: usize,
    pub failed: Vec<FailedRecord>,
}

#[derive(Debug, Clone)]
pub struct SyncPipeline {
    client: Client,
    marketplace: MarketplaceConfig,
    forwarder: Forwarder,
}

impl SyncPipeline {
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self::from_parts(client, config.marketplace.clone(), config.destination.clone())
    }

    pub fn from_parts(
        client: Client,
        marketplace: MarketplaceConfig,
        destination: DestinationConfig,
    ) -> Self {
        let forwarder = Forwarder::new(client.clone(), destination);
        Self {
            client,
            marketplace,
            forwarder,
        }
    }

    /// Runs the configured grant and, for the assumed-role strategy, the
    /// STS step that yields the signing adapter.
    pub async fn authenticate(&self) -> Result<Session, AuthError> {
        let strategy = self.marketplace.auth_strategy;
        let credential = TokenProvider::new(self.client.clone(), &self.marketplace.token_url)
            .acquire_token(strategy, &self.marketplace.credentials)
            .await?;

        if !strategy.assumes_identity() {
            return Ok(Session {
                credential,
                signer: None,
            });
        }

        let identity_config = self
            .marketplace
            .identity
            .clone()
            .ok_or(AuthError::MissingIdentity(strategy.as_str()))?;
        let role_arn = identity_config.role_arn.clone();
        let session_name = identity_config.session_name.clone();
        let provider = IdentityProvider::new(self.client.clone(), identity_config);
        let identity = provider.assume_identity(&role_arn, &session_name).await?;
        let signer = RequestSigner::from_identity(&identity, provider.region(), SIGNING_SERVICE);

        Ok(Session {
            credential,
            signer: Some(signer),
        })
    }

    /// Marketplace connectivity probe.
    pub async fn check_marketplace(&self) -> Result<bool, AuthError> {
        let session = self.authenticate().await?;
        Ok(!session.credential.as_str().is_empty())
    }

    /// Destination connectivity probe.
    pub async fn check_destination(&self) -> Result<usize, ForwardError> {
        self.forwarder.probe().await
    }

    /// Full sync. `created_after` overrides the configured lower bound.
    pub async fn run(&self, created_after: Option<&str>) -> Result<SyncReport, SyncError> {
        let span = info_span!(
            "sync",
            strategy = self.marketplace.auth_strategy.as_str(),
            marketplace_id = %self.marketplace.marketplace_id,
        );
        async move {
            let metrics = get_metrics().await;
            let start = get_instant();
            metrics.sync_runs.inc();

            let result = self.run_stages(created_after).await;
            metrics
                .sync_duration
                .observe(start.elapsed().as_secs_f64());
            match &result {
                Ok(report) => {
                    metrics.records_synced.inc_by(report.synced as u64);
                    info!(synced = report.synced, failed = report.failed.len(), "sync finished");
                }
                Err(err) => {
                    metrics.sync_failures.inc();
                    warn!(error = %err, "sync aborted");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, created_after: Option<&str>) -> Result<SyncReport, SyncError> {
        let session = self.authenticate().await?;

        let mut fetcher = OrdersFetcher::new(self.client.clone(), &self.marketplace.api_base);
        if let Some(signer) = session.signer.clone() {
            fetcher = fetcher.with_signer(signer);
        }

        let created_after = created_after.or(self.marketplace.created_after.as_deref());
        let orders = fetcher
            .list_orders(&session.credential, &self.marketplace.marketplace_id, created_after)
            .await?;

        if self.marketplace.include_items {
            self.log_line_items(&fetcher, &session.credential, &orders)
                .await?;
        }

        Ok(self.forward(&orders).await)
    }

    /// Item detail is fetched one order at a time and only logged.
    async fn log_line_items(
        &self,
        fetcher: &OrdersFetcher,
        credential: &Credential,
        orders: &[OrderRecord],
    ) -> Result<(), SyncError> {
        for order in orders {
            let items = fetcher
                .list_order_items(credential, &order.amazon_order_id)
                .await?;
            for item in &items {
                debug!(
                    order_id = %order.amazon_order_id,
                    sku = item.seller_sku.as_deref().unwrap_or("-"),
                    quantity = item.quantity_ordered,
                    price = item.item_price.as_ref().map(|p| p.amount.as_str()).unwrap_or("-"),
                    currency = item.item_price.as_ref().map(|p| p.currency_code.as_str()).unwrap_or("-"),
                    "line item"
                );
            }
        }
        Ok(())
    }

    async fn forward(&self, orders: &[OrderRecord]) -> SyncReport {
        let mode = self.forwarder.config().forward_mode;
        let mut report = SyncReport::default();

        for order in orders {
            let record = DestinationRecord::from_order(order);
            match self.forwarder.push_record(&record).await {
                Ok(()) => report.synced += 1,
                Err(err) => match mode {
                    ForwardMode::FireAndForget => report.synced += 1,
                    ForwardMode::Report => report.failed.push(FailedRecord {
                        order_id: order.amazon_order_id.clone(),
                        error: err.to_string(),
                    }),
                },
            }
        }
        report
    }
}
