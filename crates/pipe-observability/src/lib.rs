//! # pipe-observability
//!
//! In-process implementations of the observability interfaces used across
//! the PIPE control plane:
//!
//! - [`MetricsSink`] / [`MetricsRegistry`]: named increment-only counters.
//! - [`Component`]: dotted names attached to every log event as the
//!   `component` field.
//! - [`init_logging`]: installs a `tracing` subscriber (plain or JSON, stderr).
//! - [`Tracer`] / [`Span`]: timing of individual operations.

pub mod component;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod tracer;

pub use component::Component;
pub use error::ObservabilityError;
pub use logging::{init_logging, LogConfig};
pub use metrics::{Counter, MetricsRegistry, MetricsSink, NoopMetrics};
pub use tracer::{Span, SpanEvent, Tracer, STATUS_ERROR, STATUS_OK};
