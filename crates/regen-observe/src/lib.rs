//! Observability setup for Regen: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
