//! Observability subsystem.
//!
//! Structured logs via `tracing`; every request carries an `x-request-id`
//! that the guards and the relay handler attach to their events.

pub mod logging;

pub use logging::init_logging;
