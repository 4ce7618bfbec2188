use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::sql::Command;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total shell commands executed. Labels: command, status.
pub const COMMANDS_TOTAL: &str = "roomdesk_commands_total";

/// Histogram: command latency in seconds. Labels: command.
pub const COMMAND_DURATION_SECONDS: &str = "roomdesk_command_duration_seconds";

/// Counter: bookings refused by the engine. Labels: reason.
pub const BOOKING_REJECTIONS_TOTAL: &str = "roomdesk_booking_rejections_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: reservations currently held in memory.
pub const RESERVATIONS_ACTIVE: &str = "roomdesk_reservations_active";

/// Histogram: full-store save duration in seconds.
pub const STORE_SAVE_DURATION_SECONDS: &str = "roomdesk_store_save_duration_seconds";

/// Counter: saves that failed and left the file stale.
pub const STORE_SAVE_FAILURES_TOTAL: &str = "roomdesk_store_save_failures_total";

/// Counter: malformed records skipped at load.
pub const STORE_RECORDS_SKIPPED_TOTAL: &str = "roomdesk_store_records_skipped_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!("metrics endpoint: http://{addr}/metrics");
    Ok(())
}

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::Book { .. } => "book",
        Command::Cancel { .. } => "cancel",
        Command::Find { .. } => "find",
        Command::List { .. } => "list",
        Command::Slots { .. } => "slots",
        Command::Windows { .. } => "windows",
    }
}
