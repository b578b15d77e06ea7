//! Observability utilities.

mod spans;
mod subscriber;

pub use spans::{SpanTimer, StepSpanAttributes};
pub use subscriber::{init_tracing, LogFormat};
