//! Observability setup for the strata CLI: structured logging to stderr and
//! optional OpenTelemetry span export.

pub mod tracing_setup;
