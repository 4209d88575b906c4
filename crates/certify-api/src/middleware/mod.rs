//! Request middleware: counters, cache headers, and tracing spans.

pub mod cache;
pub mod metrics;
pub mod tracing_layer;
