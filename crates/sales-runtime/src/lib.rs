//! Runtime layer for the sales statistics pipeline.
//!
//! Runs extraction across the located reports with bounded concurrency and
//! drives the locate, extract and consolidate steps end to end. Also builds
//! the runtime the binary runs on.

pub mod executor;
pub mod extraction;
pub mod pipeline;

pub use extraction::{extract_all, ExtractionLimits, ExtractionOutcome};
pub use pipeline::{PipelineResult, RunMetadata, SalesPipeline};

pub use sales_core as core;
pub use sales_data as data;
