use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use depot_types::{latest, ArtifactFormat, Version};

use crate::error::StoreResult;
use crate::retention::{stale_versions, RetentionWindow, SweepReport};
use crate::traits::{ArtifactSet, VersionedStore};

/// Subdirectory of the pre-versioning flat layout, `{base}/data/{name}.{ext}`.
const LEGACY_SUBDIR: &str = "data";

/// Local namespace: one format's family of version directories.
///
/// Versions of a format live under `{base}/{subdir}/{version}/`, where the
/// subdirectory defaults to the format's extension but can be pinned for
/// layouts that group differently (e.g. encoders under `encode/`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatLayout {
    pub format: ArtifactFormat,
    pub subdir: String,
}

impl FormatLayout {
    /// Layout with the format's default subdirectory.
    pub fn new(format: ArtifactFormat) -> Self {
        Self {
            format,
            subdir: format.subdir().to_string(),
        }
    }

    /// Layout with an explicit subdirectory override.
    pub fn with_subdir(format: ArtifactFormat, subdir: impl Into<String>) -> Self {
        Self {
            format,
            subdir: subdir.into(),
        }
    }

    /// File extension for artifacts in this layout.
    pub fn ext(&self) -> &'static str {
        self.format.ext()
    }
}

impl From<ArtifactFormat> for FormatLayout {
    fn from(format: ArtifactFormat) -> Self {
        Self::new(format)
    }
}

/// Filesystem-backed artifact store.
///
/// Materializes each version as a directory of files,
/// `{base}/{subdir}/{version}/{name}.{ext}`. Directory creation is eager:
/// minting paths creates the version directory even before any artifact is
/// written, and callers are responsible for the writes themselves.
#[derive(Clone, Debug)]
pub struct LocalStore {
    base_dir: PathBuf,
}

impl LocalStore {
    /// Store rooted at `base_dir`. The directory itself is created lazily
    /// by the first `create_paths` call.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The base directory all namespaces live under.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Valid version directories directly under `dir`, unsorted.
    ///
    /// Non-directories and names that fail the 14-digit pattern are skipped
    /// silently; a missing `dir` is an empty enumeration, not an error.
    fn scan_versions(&self, dir: &Path) -> StoreResult<Vec<Version>> {
        let mut versions = Vec::new();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(versions),
            Err(err) => return Err(err.into()),
        };
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Ok(version) = Version::parse(name) {
                versions.push(version);
            }
        }
        Ok(versions)
    }

    /// Pre-versioning fallback: check the flat legacy layout file-by-file,
    /// with the same partial-result semantics as versioned resolution.
    fn legacy_latest(
        &self,
        layout: &FormatLayout,
        names: &[&str],
    ) -> StoreResult<ArtifactSet<PathBuf>> {
        let mut found = ArtifactSet::new();
        for name in names {
            let path = self
                .base_dir
                .join(LEGACY_SUBDIR)
                .join(format!("{name}.{}", layout.ext()));
            if path.exists() {
                info!(name = *name, path = %path.display(), "using legacy fallback path");
                found.insert((*name).to_string(), path);
            }
        }
        Ok(found)
    }
}

impl VersionedStore for LocalStore {
    type Namespace = FormatLayout;
    type Location = PathBuf;

    fn create_paths(
        &self,
        layout: &FormatLayout,
        names: &[&str],
        version: Option<Version>,
    ) -> StoreResult<ArtifactSet<PathBuf>> {
        let version = version.unwrap_or_else(Version::now);
        let version_dir = self.base_dir.join(&layout.subdir).join(version.as_str());
        // Eager: the version directory exists even if no artifact is ever
        // written into it, and it then still counts as a version.
        fs::create_dir_all(&version_dir)?;

        let mut paths = ArtifactSet::new();
        for name in names {
            let path = version_dir.join(format!("{name}.{}", layout.ext()));
            paths.insert((*name).to_string(), path);
        }
        Ok(paths)
    }

    fn latest(
        &self,
        layout: &FormatLayout,
        names: &[&str],
    ) -> StoreResult<ArtifactSet<PathBuf>> {
        let format_dir = self.base_dir.join(&layout.subdir);
        let Some(newest) = latest(self.scan_versions(&format_dir)?) else {
            warn!(dir = %format_dir.display(), "no version directories found");
            return self.legacy_latest(layout, names);
        };

        let version_dir = format_dir.join(newest.as_str());
        let mut found = ArtifactSet::new();
        for name in names {
            let path = version_dir.join(format!("{name}.{}", layout.ext()));
            if path.exists() {
                found.insert((*name).to_string(), path);
            } else {
                warn!(name = *name, version = %newest, "artifact missing from latest version");
            }
        }
        Ok(found)
    }

    fn versions(&self, layout: &FormatLayout) -> StoreResult<Vec<Version>> {
        let mut versions = self.scan_versions(&self.base_dir.join(&layout.subdir))?;
        versions.sort_by(|a, b| b.cmp(a));
        Ok(versions)
    }

    fn list_all(&self) -> StoreResult<BTreeMap<String, Vec<(Version, PathBuf)>>> {
        let mut inventory: BTreeMap<String, Vec<(Version, PathBuf)>> = BTreeMap::new();

        for format in ArtifactFormat::DATASET_FORMATS {
            let format_dir = self.base_dir.join(format.subdir());
            let suffix = format!(".{}", format.ext());
            for version in self.scan_versions(&format_dir)? {
                let version_dir = format_dir.join(version.as_str());
                for entry in fs::read_dir(&version_dir)? {
                    let entry = entry?;
                    let file_name = entry.file_name();
                    let Some(file_name) = file_name.to_str() else {
                        continue;
                    };
                    let Some(base_name) = file_name.strip_suffix(&suffix) else {
                        continue;
                    };
                    inventory
                        .entry(base_name.to_string())
                        .or_default()
                        .push((version.clone(), entry.path()));
                }
            }
        }

        for generations in inventory.values_mut() {
            generations.sort_by(|a, b| b.0.cmp(&a.0));
        }
        Ok(inventory)
    }

    fn cleanup(
        &self,
        layout: &FormatLayout,
        window: RetentionWindow,
    ) -> StoreResult<SweepReport> {
        let format_dir = self.base_dir.join(&layout.subdir);
        let stale = stale_versions(self.scan_versions(&format_dir)?, window.keep_count);

        let mut report = SweepReport::default();
        for version in stale {
            report.versions_removed += 1;
            let version_dir = format_dir.join(version.as_str());
            match fs::remove_dir_all(&version_dir) {
                Ok(()) => {
                    info!(dir = %version_dir.display(), "removed stale version directory");
                    report.items_deleted += 1;
                }
                Err(err) => {
                    warn!(dir = %version_dir.display(), "failed to remove stale version: {err}");
                    report.failures += 1;
                }
            }
        }
        Ok(report)
    }
}
