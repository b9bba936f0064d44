use reqwest::{header::HeaderValue, Client, Request, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::auth::{Credential, RequestSigner};
use crate::error::{truncate_body, UpstreamError};
use crate::helpers::time::{get_instant, now_utc};
use crate::observability::metrics::get_metrics;
use crate::orders::model::{Envelope, LineItem, OrderItemsPayload, OrderRecord, OrdersPayload};

const ACCESS_TOKEN_HEADER: &str = "x-amz-access-token";
const ORDERS_LABEL: &str = "orders";
const ORDER_ITEMS_LABEL: &str = "order_items";

/// Reads orders and order items from the marketplace orders API.
#[derive(Debug, Clone)]
pub struct OrdersFetcher {
    client: Client,
    api_base: String,
    signer: Option<RequestSigner>,
}

impl OrdersFetcher {
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            signer: None,
        }
    }

    /// Attach a signing adapter; every request is then SigV4-signed in
    /// addition to carrying the bearer token.
    pub fn with_signer(mut self, signer: RequestSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    pub async fn list_orders(
        &self,
        credential: &Credential,
        marketplace_id: &str,
        created_after: Option<&str>,
    ) -> Result<Vec<OrderRecord>, UpstreamError> {
        let endpoint = format!("{}/orders/v0/orders", self.api_base);
        let mut query = vec![("MarketplaceIds", marketplace_id)];
        if let Some(created_after) = created_after {
            query.push(("CreatedAfter", created_after));
        }

        let envelope: Envelope<OrdersPayload> = self
            .get_json(ORDERS_LABEL, &endpoint, &query, credential)
            .await?;
        let orders = envelope.payload.unwrap_or_default().orders;
        info!(marketplace_id, count = orders.len(), "orders fetched");
        Ok(orders)
    }

    pub async fn list_order_items(
        &self,
        credential: &Credential,
        order_id: &str,
    ) -> Result<Vec<LineItem>, UpstreamError> {
        let endpoint = format!(
            "{}/orders/v0/orders/{}/orderItems",
            self.api_base,
            urlencoding::encode(order_id)
        );
        let envelope: Envelope<OrderItemsPayload> = self
            .get_json(ORDER_ITEMS_LABEL, &endpoint, &[], credential)
            .await?;
        let items = envelope.payload.unwrap_or_default().order_items;
        debug!(order_id, count = items.len(), "order items fetched");
        Ok(items)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        label: &'static str,
        endpoint: &str,
        query: &[(&str, &str)],
        credential: &Credential,
    ) -> Result<T, UpstreamError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.upstream_requests.with_label_values(&[label]).inc();

        let result = self.send_get(endpoint, query, credential).await;
        metrics
            .upstream_duration
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            warn!(endpoint, error = %err, "listing call failed");
            metrics.upstream_failures.with_label_values(&[label]).inc();
        }
        result
    }

    async fn send_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        credential: &Credential,
    ) -> Result<T, UpstreamError> {
        let parsed = if query.is_empty() {
            Url::parse(endpoint)
        } else {
            Url::parse_with_params(endpoint, query)
        };
        let url = parsed.map_err(|e| UpstreamError::Parse {
            endpoint: endpoint.to_owned(),
            reason: format!("invalid url: {}", e),
        })?;
        let mut request = Request::new(reqwest::Method::GET, url);
        let token = HeaderValue::from_str(credential.as_str()).map_err(|_| UpstreamError::Parse {
            endpoint: endpoint.to_owned(),
            reason: "access token is not a valid header value".to_owned(),
        })?;
        let headers = request.headers_mut();
        headers.insert(ACCESS_TOKEN_HEADER, token);
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        if let Some(signer) = &self.signer {
            signer.sign(&mut request, now_utc())?;
        }

        debug!(url = %request.url(), signed = self.signer.is_some(), "GET");
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: endpoint.to_owned(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: endpoint.to_owned(),
                source,
            })?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                endpoint: endpoint.to_owned(),
                status,
                body: truncate_body(body),
            });
        }
        serde_json::from_str(&body).map_err(|e| UpstreamError::Parse {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })
    }
}
