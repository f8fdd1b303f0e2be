//! Logging and user notification sinks
//!
//! All diagnostics go through `tracing`. [`init_tracing`] installs the
//! process-wide subscriber once at startup; [`TracingNotifier`] routes user
//! notifications into the same stream for headless front-ends.

pub mod logging;
pub mod notifier;

pub use logging::init_tracing;
pub use notifier::TracingNotifier;
