use serde::{Deserialize, Serialize};

use depot_types::Version;

/// How many versions a cleanup sweep keeps in one namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionWindow {
    /// Number of newest versions to retain.
    pub keep_count: usize,
}

impl RetentionWindow {
    pub fn new(keep_count: usize) -> Self {
        Self { keep_count }
    }
}

impl Default for RetentionWindow {
    fn default() -> Self {
        // Matches the producer pipelines' default sweep cadence.
        Self { keep_count: 5 }
    }
}

/// Outcome of one retention sweep.
///
/// Sweeps are best-effort: individual deletion failures are logged and
/// counted, and the stale artifacts they leave behind are picked up by a
/// future sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Stale versions whose artifacts were targeted for deletion.
    pub versions_removed: usize,
    /// Directories (local) or keys (object store) actually deleted.
    pub items_deleted: usize,
    /// Individual deletions that failed and were skipped.
    pub failures: usize,
}

/// Partition an enumeration of versions into stale ones.
///
/// The shared retention rule for both backends: sort descending, retain the
/// `keep_count` newest, return the rest (oldest last). Returns an empty vec
/// when nothing needs removal, which callers treat as a successful no-op.
pub fn stale_versions(mut versions: Vec<Version>, keep_count: usize) -> Vec<Version> {
    if versions.len() <= keep_count {
        return Vec::new();
    }
    versions.sort_by(|a, b| b.cmp(a));
    versions.split_off(keep_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn keeps_newest_versions() {
        let versions = vec![
            v("20250101000000"),
            v("20250103000000"),
            v("20250102000000"),
        ];
        let stale = stale_versions(versions, 2);
        assert_eq!(stale, vec![v("20250101000000")]);
    }

    #[test]
    fn no_op_when_within_window() {
        let versions = vec![v("20250101000000"), v("20250102000000")];
        assert!(stale_versions(versions.clone(), 2).is_empty());
        assert!(stale_versions(versions, 5).is_empty());
    }

    #[test]
    fn empty_enumeration_is_no_op() {
        assert!(stale_versions(Vec::new(), 3).is_empty());
    }

    #[test]
    fn keep_zero_removes_everything() {
        let versions = vec![v("20250101000000"), v("20250102000000")];
        let stale = stale_versions(versions, 0);
        assert_eq!(stale.len(), 2);
        // Newest first in the stale list as well.
        assert_eq!(stale[0], v("20250102000000"));
    }

    #[test]
    fn default_window_keeps_five() {
        assert_eq!(RetentionWindow::default().keep_count, 5);
    }
}
