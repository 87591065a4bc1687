//! Network path tracing via the system `traceroute` / `tracepath` tools.

pub mod error;
pub mod parser;
pub mod tracer;

pub use error::TraceError;
pub use parser::{is_unroutable, is_unroutable_address, HopParser};
pub use tracer::{PathTracer, TraceTool, DEFAULT_TRACE_TIMEOUT};
