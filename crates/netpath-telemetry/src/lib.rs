//! # Netpath Telemetry
//!
//! Logging and metrics setup.
//!
//! - [`logging`]: `tracing-subscriber` initialization (JSON or pretty) and
//!   the standard field names
//! - [`metrics`]: Prometheus exporter and per-request counters
//! - [`event`]: timing and I/O logging for arbitrary events
//!
//! ```rust,ignore
//! use netpath_telemetry::{init_telemetry, LogConfig, MetricsConfig};
//!
//! init_telemetry(&LogConfig::default(), &MetricsConfig::default())?;
//! ```

#![doc(html_root_url = "https://docs.rs/netpath-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{fields, init_logging, LogConfig, LogFormat};
pub use metrics::{init_metrics, record_request, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns the first initialization error.
pub fn init_telemetry(logging: &LogConfig, metrics: &MetricsConfig) -> TelemetryResult<()> {
    init_logging(logging)?;
    init_metrics(metrics)
}
