//! Report output for the sales statistics pipeline: the xlsx or CSV
//! export and the terminal summary.

pub mod exporter;
pub mod summary;

pub use exporter::{export, output_file_name};
pub use summary::render_summary;
