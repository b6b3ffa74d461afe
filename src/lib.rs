//! Turns per-cluster JSON-lines paper records into a single JSON array for
//! the topic map: one color per cluster, normalized institution and region,
//! flattened coordinates.

pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod palette;
pub mod pipeline;
pub mod transform;
pub mod writer;

pub use error::{PrepError, Result};
pub use pipeline::{Pipeline, PipelineOptions, PipelineResult};
