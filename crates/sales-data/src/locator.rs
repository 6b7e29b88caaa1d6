//! Report discovery.
//!
//! Walks the input directory, classifies every file name and turns each
//! recognised report into a [`SiteFileRecord`]. Problems with individual
//! files are collected as [`Diagnostic`]s so one bad name never stops the
//! walk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sales_core::error::{Result, SalesError};
use sales_core::locale::LocaleProfile;
use sales_core::models::{Diagnostic, SiteFileRecord, Stage};
use tracing::{debug, warn};

use crate::classifier::classify;
use crate::sheet::is_supported;

// ── Public types ──────────────────────────────────────────────────────────────

/// Outcome of a directory walk.
#[derive(Debug, Clone, Default)]
pub struct LocatedReports {
    /// One record per label, in discovery order.
    pub records: Vec<SiteFileRecord>,
    /// Period of the last file whose name could be classified, whether or not
    /// the file itself was usable.
    pub period: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LocatedReports {
    pub fn get(&self, label: &str) -> Option<&SiteFileRecord> {
        self.records.iter().find(|r| r.label == label)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all regular files recursively under `root`, sorted by path.
///
/// Hidden files and office lock files (`~$...`) are left out.
///
/// # Errors
/// [`SalesError::InputDirUnreadable`] when `root` is not a readable directory.
pub fn find_report_files(root: &Path) -> Result<(Vec<PathBuf>, Vec<Diagnostic>)> {
    if !root.is_dir() || std::fs::read_dir(root).is_err() {
        return Err(SalesError::InputDirUnreadable(root.to_path_buf()));
    }

    let mut files = Vec::new();
    let mut diagnostics = Vec::new();

    for entry in walkdir::WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let subject = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                warn!("Skipping unreadable entry {}: {}", subject, e);
                diagnostics.push(Diagnostic::new(Stage::Locate, subject, e));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || name.starts_with("~$") {
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort();
    Ok((files, diagnostics))
}

/// Walk `root` and build one [`SiteFileRecord`] per account label.
///
/// A later file with the same label replaces the earlier one in place
/// (last write wins); the replacement is logged and recorded.
pub fn locate_reports(root: &Path) -> Result<LocatedReports> {
    let (files, walk_diagnostics) = find_report_files(root)?;

    let mut located = LocatedReports {
        diagnostics: walk_diagnostics,
        ..LocatedReports::default()
    };
    let mut index_by_label: HashMap<String, usize> = HashMap::new();

    for path in files {
        let file_name = match path.file_name() {
            Some(n) => n.to_string_lossy().into_owned(),
            None => continue,
        };

        let classified = match classify(&file_name) {
            Ok(c) => c,
            Err(e) => {
                warn!("{}", e);
                located
                    .diagnostics
                    .push(Diagnostic::new(Stage::Classify, file_name, e));
                continue;
            }
        };

        if let Some(previous) = located.period.as_deref() {
            if previous != classified.period {
                debug!(
                    "Period changes from {} to {} at {}",
                    previous, classified.period, file_name
                );
            }
        }
        located.period = Some(classified.period.clone());

        if !is_supported(&path) {
            warn!("Unsupported file type {}; file skipped", file_name);
            located.diagnostics.push(Diagnostic::new(
                Stage::Locate,
                file_name,
                "unsupported file type",
            ));
            continue;
        }

        let Some(profile) = LocaleProfile::find(&classified.site_name) else {
            warn!(
                "Unsupported site {} in {}; file skipped",
                classified.site_name, file_name
            );
            located.diagnostics.push(Diagnostic::new(
                Stage::Locate,
                file_name,
                format!("unsupported site {}", classified.site_name),
            ));
            continue;
        };

        let record = SiteFileRecord {
            label: classified.label(),
            account_id: classified.account_id,
            site_name: classified.site_name,
            file_path: path,
            skip_rows: profile.skip_rows(),
            period: classified.period,
        };

        debug!(
            "Found {} ({}, {} region, skip {})",
            record.label, profile.english_name, profile.region, record.skip_rows
        );

        match index_by_label.get(&record.label) {
            Some(&idx) => {
                let replaced = &located.records[idx];
                warn!(
                    "{} replaces {} for {}",
                    record.file_path.display(),
                    replaced.file_path.display(),
                    record.label
                );
                located.diagnostics.push(Diagnostic::new(
                    Stage::Locate,
                    record.label.clone(),
                    format!(
                        "{} replaced by {}",
                        replaced.file_path.display(),
                        record.file_path.display()
                    ),
                ));
                located.records[idx] = record;
            }
            None => {
                index_by_label.insert(record.label.clone(), located.records.len());
                located.records.push(record);
            }
        }
    }

    let distinct_periods: std::collections::BTreeSet<&str> =
        located.records.iter().map(|r| r.period.as_str()).collect();
    if distinct_periods.len() > 1 {
        let listed: Vec<&str> = distinct_periods.into_iter().collect();
        warn!("Reports span several periods: {}", listed.join(", "));
        located.diagnostics.push(Diagnostic::new(
            Stage::Locate,
            root.display().to_string(),
            format!("reports span several periods: {}", listed.join(", ")),
        ));
    }

    debug!(
        "Located {} reports under {} ({} diagnostics)",
        located.records.len(),
        root.display(),
        located.diagnostics.len()
    );

    Ok(located)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "x").unwrap();
        path
    }

    // ── find_report_files ─────────────────────────────────────────────────────

    #[test]
    fn test_find_report_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("2024-01");
        std::fs::create_dir_all(&sub).unwrap();
        touch(dir.path(), "b美国202401.xlsx");
        touch(&sub, "a德国202401.xlsx");
        touch(dir.path(), "a日本202401.xlsx");

        let (files, diags) = find_report_files(dir.path()).unwrap();
        assert!(diags.is_empty());
        assert_eq!(files.len(), 3);
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_find_report_files_skips_hidden_and_lock_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".DS_Store");
        touch(dir.path(), "~$a美国202401.xlsx");
        touch(dir.path(), "a美国202401.xlsx");

        let (files, _) = find_report_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_find_report_files_missing_root() {
        let err = find_report_files(Path::new("/tmp/does-not-exist-sales-test-xyz")).unwrap_err();
        assert!(matches!(err, SalesError::InputDirUnreadable(_)));
    }

    #[test]
    fn test_find_report_files_root_is_file() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "a美国202401.xlsx");
        assert!(find_report_files(&file).is_err());
    }

    // ── locate_reports ────────────────────────────────────────────────────────

    #[test]
    fn test_locate_region_skip_rows() {
        let dir = TempDir::new().unwrap();
        let sites = [
            ("美国", 7),
            ("加拿大", 7),
            ("墨西哥", 6),
            ("英国", 6),
            ("日本", 6),
            ("德国", 6),
            ("法国", 6),
            ("意大利", 6),
            ("西班牙", 6),
        ];
        for (site, _) in sites {
            touch(dir.path(), &format!("acc{}202401.xlsx", site));
        }

        let located = locate_reports(dir.path()).unwrap();
        assert_eq!(located.records.len(), sites.len());
        for (site, rows) in sites {
            let rec = located.get(&format!("acc{}", site)).unwrap();
            assert_eq!(rec.skip_rows, rows, "site {}", site);
            assert_eq!(rec.account_id, "acc");
            assert_eq!(rec.site_name, site);
        }
        assert!(located.diagnostics.is_empty());
    }

    #[test]
    fn test_locate_unsupported_site_is_reported() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "acc巴西202401.xlsx");
        touch(dir.path(), "acc美国202401.xlsx");

        let located = locate_reports(dir.path()).unwrap();
        assert_eq!(located.records.len(), 1);
        assert_eq!(located.diagnostics.len(), 1);
        assert_eq!(located.diagnostics[0].stage, Stage::Locate);
        assert!(located.diagnostics[0].message.contains("巴西"));
    }

    #[test]
    fn test_locate_classification_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "README.txt");
        touch(dir.path(), "acc德国202401.xlsx");

        let located = locate_reports(dir.path()).unwrap();
        assert_eq!(located.records.len(), 1);
        assert_eq!(located.diagnostics.len(), 1);
        assert_eq!(located.diagnostics[0].stage, Stage::Classify);
        assert_eq!(located.diagnostics[0].subject, "README.txt");
    }

    #[test]
    fn test_locate_unsupported_extension_is_reported() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "acc美国202401.pdf");

        let located = locate_reports(dir.path()).unwrap();
        assert!(located.records.is_empty());
        assert_eq!(located.diagnostics.len(), 1);
        assert_eq!(located.diagnostics[0].subject, "acc美国202401.pdf");
        // The name still classified, so its period labels the output.
        assert_eq!(located.period.as_deref(), Some("202401"));
    }

    #[test]
    fn test_locate_period_counts_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a美国202401.xlsx");
        touch(dir.path(), "b美国202402.pdf");

        let located = locate_reports(dir.path()).unwrap();
        assert_eq!(located.records.len(), 1);
        assert_eq!(located.period.as_deref(), Some("202402"));
    }

    #[test]
    fn test_locate_last_write_wins_in_place() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        touch(&a, "acc美国202401.xlsx");
        touch(dir.path(), "acc日本202401.xlsx");
        let later = touch(&b, "acc美国202401.csv");

        let located = locate_reports(dir.path()).unwrap();
        assert_eq!(located.records.len(), 2);
        // Discovery order: a/acc美国, acc日本; b/acc美国 replaces the first.
        assert_eq!(located.records[0].label, "acc美国");
        assert_eq!(located.records[0].file_path, later);
        assert_eq!(located.records[1].label, "acc日本");
        assert!(located
            .diagnostics
            .iter()
            .any(|d| d.subject == "acc美国" && d.message.contains("replaced by")));
    }

    #[test]
    fn test_locate_period_is_last_seen() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a美国202401.xlsx");
        touch(dir.path(), "b美国202402.xlsx");

        let located = locate_reports(dir.path()).unwrap();
        assert_eq!(located.period.as_deref(), Some("202402"));
        assert!(located
            .diagnostics
            .iter()
            .any(|d| d.message.contains("several periods")));
    }

    #[test]
    fn test_locate_empty_directory() {
        let dir = TempDir::new().unwrap();
        let located = locate_reports(dir.path()).unwrap();
        assert!(located.records.is_empty());
        assert!(located.period.is_none());
    }
}
