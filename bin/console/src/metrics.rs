//! Prometheus metrics for the token console.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use action::OperationStatus;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use reader::TokenInfo;

/// Aggregated metrics for the console.
///
/// Metrics are registered with the global metrics registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        // Operation metrics
        describe_counter!(
            "token_console_operations_submitted_total",
            "Total operations accepted by the wallet, by kind"
        );
        describe_counter!(
            "token_console_operations_confirmed_total",
            "Total operations mined successfully, by kind"
        );
        describe_counter!(
            "token_console_operations_failed_total",
            "Total operations that failed at any stage, by kind"
        );

        // Read metrics
        describe_counter!(
            "token_console_reads_total",
            "Total token state loads"
        );
        describe_counter!(
            "token_console_read_failures_total",
            "Total token state loads that failed"
        );

        // Session metrics
        describe_gauge!(
            "token_console_session_connected",
            "1 while a wallet account is connected"
        );
        describe_gauge!(
            "token_console_balance",
            "Last displayed balance of the connected account, in whole tokens"
        );
    }

    /// Record an operation status event.
    pub fn record_status(&self, status: &OperationStatus) {
        let name = match status {
            OperationStatus::Submitted { .. } => "token_console_operations_submitted_total",
            OperationStatus::Confirmed { .. } => "token_console_operations_confirmed_total",
            OperationStatus::Failed { .. } => "token_console_operations_failed_total",
        };
        counter!(name, "kind" => status.kind().as_str()).increment(1);
    }

    /// Record a token state load.
    pub fn record_read(&self, success: bool) {
        counter!("token_console_reads_total").increment(1);
        if !success {
            counter!("token_console_read_failures_total").increment(1);
        }
    }

    pub fn set_connected(&self, connected: bool) {
        gauge!("token_console_session_connected").set(if connected { 1.0 } else { 0.0 });
    }

    /// Set the displayed balance gauge. Precision loss is acceptable here.
    pub fn set_balance(&self, token: &TokenInfo) {
        if let Ok(balance) = token.balance.parse::<f64>() {
            gauge!("token_console_balance", "symbol" => token.symbol.clone()).set(balance);
        }
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
