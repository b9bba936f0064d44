use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

const CALL_BUCKETS: [f64; 8] = [0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];
const SYNC_BUCKETS: [f64; 8] = [0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token provider
    pub token_requests: IntCounterVec,
    pub token_failures: IntCounterVec,
    pub token_duration: HistogramVec,
    pub identity_requests: IntCounter,
    pub identity_failures: IntCounter,

    // Resource fetcher
    pub upstream_requests: IntCounterVec,
    pub upstream_failures: IntCounterVec,
    pub upstream_duration: HistogramVec,

    // Forwarder
    pub forward_pushes: IntCounter,
    pub forward_failures: IntCounter,
    pub forward_duration: Histogram,

    // Sync
    pub sync_runs: IntCounter,
    pub sync_failures: IntCounter,
    pub records_synced: IntCounter,
    pub sync_duration: Histogram,

    // Config/runtime
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("ordersync".into()), None)
            .expect("static registry prefix is valid");

        let metrics = Arc::new(Self {
            token_requests: IntCounterVec::new(Opts::new("token_requests_total", "Token exchanges by strategy"), &["strategy"]).expect("metric"),
            token_failures: IntCounterVec::new(Opts::new("token_failures_total", "Failed token exchanges by strategy"), &["strategy"]).expect("metric"),
            token_duration: HistogramVec::new(HistogramOpts::new("token_duration_seconds", "Token exchange duration seconds").buckets(CALL_BUCKETS.to_vec()), &["strategy"]).expect("metric"),
            identity_requests: IntCounter::new("identity_requests_total", "AssumeRole calls").expect("metric"),
            identity_failures: IntCounter::new("identity_failures_total", "Failed AssumeRole calls").expect("metric"),

            upstream_requests: IntCounterVec::new(Opts::new("upstream_requests_total", "Listing calls by endpoint"), &["endpoint"]).expect("metric"),
            upstream_failures: IntCounterVec::new(Opts::new("upstream_failures_total", "Failed listing calls by endpoint"), &["endpoint"]).expect("metric"),
            upstream_duration: HistogramVec::new(HistogramOpts::new("upstream_duration_seconds", "Listing call duration seconds").buckets(CALL_BUCKETS.to_vec()), &["endpoint"]).expect("metric"),

            forward_pushes: IntCounter::new("forward_pushes_total", "Destination create calls").expect("metric"),
            forward_failures: IntCounter::new("forward_failures_total", "Failed destination create calls").expect("metric"),
            forward_duration: Histogram::with_opts(HistogramOpts::new("forward_duration_seconds", "Destination create duration seconds").buckets(CALL_BUCKETS.to_vec())).expect("metric"),

            sync_runs: IntCounter::new("sync_runs_total", "Sync triggers").expect("metric"),
            sync_failures: IntCounter::new("sync_failures_total", "Aborted sync triggers").expect("metric"),
            records_synced: IntCounter::new("records_synced_total", "Records counted as synced").expect("metric"),
            sync_duration: Histogram::with_opts(HistogramOpts::new("sync_duration_seconds", "Sync duration seconds").buckets(SYNC_BUCKETS.to_vec())).expect("metric"),

            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").expect("metric"),
            up: IntGauge::new("up", "1 if service is serving").expect("metric"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.token_requests.clone()),
            Box::new(metrics.token_failures.clone()),
            Box::new(metrics.token_duration.clone()),
            Box::new(metrics.identity_requests.clone()),
            Box::new(metrics.identity_failures.clone()),
            Box::new(metrics.upstream_requests.clone()),
            Box::new(metrics.upstream_failures.clone()),
            Box::new(metrics.upstream_duration.clone()),
            Box::new(metrics.forward_pushes.clone()),
            Box::new(metrics.forward_failures.clone()),
            Box::new(metrics.forward_duration.clone()),
            Box::new(metrics.sync_runs.clone()),
            Box::new(metrics.sync_failures.clone()),
            Box::new(metrics.records_synced.clone()),
            Box::new(metrics.sync_duration.clone()),
            Box::new(metrics.config_validation_errors.clone()),
            Box::new(metrics.up.clone()),
        ];
        for collector in collectors {
            reg.register(collector).expect("metric names are unique");
        }

        metrics
    }
}
