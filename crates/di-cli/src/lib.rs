//! CLI library components for the diagnostic-imaging pipeline.

pub mod logging;
pub mod pipeline;
