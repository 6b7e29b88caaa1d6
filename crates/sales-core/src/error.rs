use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the sales statistics pipeline.
#[derive(Error, Debug)]
pub enum SalesError {
    /// A file name does not follow the `<account><site><digits>` convention.
    #[error("Cannot classify file name {file_name}: {reason}")]
    Classification { file_name: String, reason: String },

    /// A site name has no seller-type token or currency profile.
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    /// A sales or shipping-credit cell could not be parsed as a number.
    #[error("Invalid numeric value {value:?} in column {column}")]
    NumericFormat { value: String, column: &'static str },

    /// A site resolved to a currency that has no USD rate.
    #[error("No currency rate for site {site} ({currency})")]
    MissingCurrencyMapping { site: String, currency: String },

    /// The input directory does not exist or cannot be listed.
    #[error("Input directory unreadable: {0}")]
    InputDirUnreadable(PathBuf),

    /// A report file could not be opened or decoded.
    #[error("Failed to read spreadsheet {path}: {message}")]
    SpreadsheetRead { path: PathBuf, message: String },

    /// A report file has an extension no reader handles.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Extraction of a single report exceeded the per-file time budget.
    #[error("Extraction of {path} timed out after {secs}s")]
    ExtractTimeout { path: PathBuf, secs: u64 },

    /// The output artifact could not be written.
    #[error("Failed to write output {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A currency rates override file is missing or malformed.
    #[error("Invalid rates file {path}: {message}")]
    RatesFile { path: PathBuf, message: String },

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A CSV document could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the sales crates.
pub type Result<T> = std::result::Result<T, SalesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_classification() {
        let err = SalesError::Classification {
            file_name: "report.xlsx".to_string(),
            reason: "no digit run".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot classify file name report.xlsx: no digit run"
        );
    }

    #[test]
    fn test_error_display_unsupported_locale() {
        let err = SalesError::UnsupportedLocale("巴西".to_string());
        assert_eq!(err.to_string(), "Unsupported locale: 巴西");
    }

    #[test]
    fn test_error_display_numeric_format() {
        let err = SalesError::NumericFormat {
            value: "12a.5".to_string(),
            column: "sales",
        };
        assert_eq!(err.to_string(), "Invalid numeric value \"12a.5\" in column sales");
    }

    #[test]
    fn test_error_display_missing_currency() {
        let err = SalesError::MissingCurrencyMapping {
            site: "日本".to_string(),
            currency: "JPY".to_string(),
        };
        assert_eq!(err.to_string(), "No currency rate for site 日本 (JPY)");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = SalesError::ExtractTimeout {
            path: PathBuf::from("/in/a美国202401.xlsx"),
            secs: 30,
        };
        let msg = err.to_string();
        assert!(msg.contains("timed out after 30s"));
        assert!(msg.contains("a美国202401.xlsx"));
    }

    #[test]
    fn test_error_display_output_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SalesError::OutputWrite {
            path: PathBuf::from("/out/202401月业绩计算表格.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to write output"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SalesError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: SalesError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
