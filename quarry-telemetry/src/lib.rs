//! Telemetry initialization for the quarry bootstrap processes.
//!
//! Every binary logs through `tracing`: pretty console output during
//! development, JSON rolling files in production. A process-wide component
//! name is injected into each JSON entry so the one-shot jobs can be told
//! apart in aggregated logs.

mod tracing_init;

pub use tracing_init::*;
