//! Core domain types for the sales statistics pipeline.
//!
//! Holds the error taxonomy, record types, per-site locale profiles, the
//! currency table, amount normalization and command-line settings shared by
//! every other crate in the workspace.

pub mod currency;
pub mod error;
pub mod formatting;
pub mod locale;
pub mod models;
pub mod numeric;
pub mod settings;

pub use error::{Result, SalesError};
