/*!
 * Monitoring
 * Run metrics and structured tracing
 */

mod metrics;
mod tracer;

pub use metrics::Metrics;
pub use tracer::{init_tracing, TRACE_JSON_ENV};
