//! Data layer for the sales statistics pipeline.
//!
//! Responsible for classifying report file names, discovering reports under
//! an input directory, reading spreadsheets, extracting per-site sales and
//! consolidating them into converted rows.

pub mod aggregator;
pub mod classifier;
pub mod extractor;
pub mod locator;
pub mod sheet;

pub use sales_core as core;
