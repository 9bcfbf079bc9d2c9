//! Run metrics for the cleaner.
//!
//! The macros are no-ops until a recorder is installed, so library callers
//! and tests pay nothing. The binary installs a Prometheus exporter only when
//! `CLEANER_METRICS_ADDR` is set.

use std::net::SocketAddr;
use std::sync::Once;
use tracing::{info, warn};

use crate::constants::ENV_METRICS_ADDR;

macro_rules! cleaner_metric {
    (counter, $name:literal) => {
        concat!("cleaner_", $name, "_total")
    };
    (histogram, $name:literal) => {
        concat!("cleaner_", $name)
    };
}

static INIT: Once = Once::new();

/// Installs the Prometheus exporter if `CLEANER_METRICS_ADDR` holds a socket address.
/// Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| {
        let Ok(addr_str) = std::env::var(ENV_METRICS_ADDR) else {
            return;
        };
        let addr = match addr_str.parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(_) => {
                warn!("Invalid metrics addr '{}', exporter disabled", addr_str);
                return;
            }
        };

        match metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
        {
            Ok(()) => {
                RunnerMetrics::register_metrics();
                info!("Prometheus exporter listening at http://{}/metrics", addr);
            }
            Err(e) => warn!("Failed to install Prometheus exporter: {}", e),
        }
    });
}

/// Counters and histograms emitted by the batch runner.
pub struct RunnerMetrics;

impl RunnerMetrics {
    pub fn record_page(rows: usize, updated: usize, duration_secs: f64) {
        ::metrics::counter!(cleaner_metric!(counter, "pages_committed")).increment(1);
        ::metrics::counter!(cleaner_metric!(counter, "rows_processed")).increment(rows as u64);
        ::metrics::counter!(cleaner_metric!(counter, "rows_updated")).increment(updated as u64);
        ::metrics::histogram!(cleaner_metric!(histogram, "page_duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_run_failed() {
        ::metrics::counter!(cleaner_metric!(counter, "runs_failed")).increment(1);
    }

    /// Pre-register so the exporter lists every series before the first page.
    pub fn register_metrics() {
        use ::metrics::{counter, histogram};

        let _ = counter!(cleaner_metric!(counter, "pages_committed"));
        let _ = counter!(cleaner_metric!(counter, "rows_processed"));
        let _ = counter!(cleaner_metric!(counter, "rows_updated"));
        let _ = counter!(cleaner_metric!(counter, "runs_failed"));
        let _ = histogram!(cleaner_metric!(histogram, "page_duration_seconds"));
    }
}
