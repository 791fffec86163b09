use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use depot_types::{latest, ArtifactFormat, ArtifactKind, Version};

use crate::client::ObjectClient;
use crate::error::StoreResult;
use crate::retention::{stale_versions, RetentionWindow, SweepReport};
use crate::retry::RetryPolicy;
use crate::traits::{ArtifactSet, VersionedStore};

/// Object-store namespace: one artifact kind in one format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectNamespace {
    pub kind: ArtifactKind,
    pub format: ArtifactFormat,
}

impl ObjectNamespace {
    pub fn new(kind: ArtifactKind, format: ArtifactFormat) -> Self {
        Self { kind, format }
    }
}

/// Object-store-backed artifact store.
///
/// Materializes each version as a common key prefix,
/// `{base_prefix}/{kind}/{version}/{name}.{ext}`. Object storage has no
/// directories, so minting paths is pure key computation with no network
/// call, and a version exists exactly when at least one key carries its
/// prefix.
///
/// Listing is paginated; every operation aggregates the listing to the last
/// page before deciding anything. Artifact presence within the newest
/// version is decided by membership in that complete listing, not by
/// per-key existence checks. This assumes listing completeness and keeps
/// resolution at one round-trip set.
pub struct ObjectStore {
    client: Arc<dyn ObjectClient>,
    base_prefix: String,
    retry: RetryPolicy,
}

impl ObjectStore {
    /// Store over `client`, rooted at `base_prefix` (e.g. `"artifacts"`).
    pub fn new(client: Arc<dyn ObjectClient>, base_prefix: impl Into<String>) -> Self {
        Self {
            client,
            base_prefix: base_prefix.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy applied to client calls.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The shared client, for callers performing the actual writes.
    pub fn client(&self) -> &Arc<dyn ObjectClient> {
        &self.client
    }

    fn kind_prefix(&self, kind: ArtifactKind) -> String {
        format!("{}/{}/", self.base_prefix, kind.segment())
    }

    fn key_for(&self, namespace: &ObjectNamespace, version: &Version, name: &str) -> String {
        format!(
            "{}/{}/{}/{}.{}",
            self.base_prefix,
            namespace.kind.segment(),
            version,
            name,
            namespace.format.ext()
        )
    }

    /// Aggregate every page of a prefix listing.
    ///
    /// A single page is never enough to decide anything: the newest version
    /// or a key's membership may sit on a later page.
    fn list_all_keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self
                .retry
                .run(|| self.client.list_page(prefix, token.as_deref()))?;
            keys.extend(page.keys);
            match page.next {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(keys)
    }

    /// Distinct valid version segments directly under `prefix`, unsorted.
    fn version_segments(prefix: &str, keys: &[String]) -> Vec<Version> {
        let mut seen = BTreeSet::new();
        for key in keys {
            let Some(relative) = key.strip_prefix(prefix) else {
                continue;
            };
            let Some((segment, _)) = relative.split_once('/') else {
                continue;
            };
            if let Ok(version) = Version::parse(segment) {
                seen.insert(version);
            }
        }
        seen.into_iter().collect()
    }
}

impl VersionedStore for ObjectStore {
    type Namespace = ObjectNamespace;
    type Location = String;

    fn create_paths(
        &self,
        namespace: &ObjectNamespace,
        names: &[&str],
        version: Option<Version>,
    ) -> StoreResult<ArtifactSet<String>> {
        let version = version.unwrap_or_else(Version::now);
        debug!(%version, kind = %namespace.kind, "computed object keys for new version");
        Ok(names
            .iter()
            .map(|name| ((*name).to_string(), self.key_for(namespace, &version, name)))
            .collect())
    }

    fn latest(
        &self,
        namespace: &ObjectNamespace,
        names: &[&str],
    ) -> StoreResult<ArtifactSet<String>> {
        let prefix = self.kind_prefix(namespace.kind);
        let keys = self.list_all_keys(&prefix)?;
        let Some(newest) = latest(Self::version_segments(&prefix, &keys)) else {
            warn!(%prefix, "no versions found under prefix");
            return Ok(ArtifactSet::new());
        };

        let key_set: BTreeSet<&str> = keys.iter().map(String::as_str).collect();
        let mut found = ArtifactSet::new();
        for name in names {
            let key = self.key_for(namespace, &newest, name);
            // Membership in the aggregated listing decides presence; no
            // per-key existence round-trips.
            if key_set.contains(key.as_str()) {
                found.insert((*name).to_string(), key);
            } else {
                warn!(name = *name, version = %newest, "artifact missing from latest version");
            }
        }
        Ok(found)
    }

    fn versions(&self, namespace: &ObjectNamespace) -> StoreResult<Vec<Version>> {
        let prefix = self.kind_prefix(namespace.kind);
        let keys = self.list_all_keys(&prefix)?;
        let mut versions = Self::version_segments(&prefix, &keys);
        versions.sort_by(|a, b| b.cmp(a));
        Ok(versions)
    }

    fn list_all(&self) -> StoreResult<BTreeMap<String, Vec<(Version, String)>>> {
        let mut inventory: BTreeMap<String, Vec<(Version, String)>> = BTreeMap::new();

        for kind in ArtifactKind::ALL {
            let prefix = self.kind_prefix(kind);
            for key in self.list_all_keys(&prefix)? {
                let Some(relative) = key.strip_prefix(&prefix) else {
                    continue;
                };
                let Some((segment, file_name)) = relative.split_once('/') else {
                    continue;
                };
                let Ok(version) = Version::parse(segment) else {
                    continue;
                };
                let Some((base_name, ext)) = file_name.rsplit_once('.') else {
                    continue;
                };
                let known_dataset = ArtifactFormat::from_ext(ext)
                    .is_ok_and(|f| ArtifactFormat::DATASET_FORMATS.contains(&f));
                if !known_dataset || base_name.is_empty() {
                    continue;
                }
                inventory
                    .entry(base_name.to_string())
                    .or_default()
                    .push((version, key));
            }
        }

        for generations in inventory.values_mut() {
            generations.sort_by(|a, b| b.0.cmp(&a.0));
        }
        Ok(inventory)
    }

    fn cleanup(
        &self,
        namespace: &ObjectNamespace,
        window: RetentionWindow,
    ) -> StoreResult<SweepReport> {
        let prefix = self.kind_prefix(namespace.kind);
        let keys = self.list_all_keys(&prefix)?;
        let stale = stale_versions(Self::version_segments(&prefix, &keys), window.keep_count);

        let mut report = SweepReport::default();
        for version in stale {
            report.versions_removed += 1;
            let stale_prefix = format!("{prefix}{version}/");
            let mut deleted = 0usize;
            for key in keys.iter().filter(|k| k.starts_with(&stale_prefix)) {
                // No recursive delete on object stores: every key goes
                // individually, and a key that vanished since the listing
                // is fine.
                match self.retry.run(|| self.client.delete(key)) {
                    Ok(true) => deleted += 1,
                    Ok(false) => debug!(%key, "stale key already gone"),
                    Err(err) => {
                        warn!(%key, "failed to delete stale key: {err}");
                        report.failures += 1;
                    }
                }
            }
            report.items_deleted += deleted;
            info!(%version, deleted, "removed stale version artifacts");
        }
        Ok(report)
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("base_prefix", &self.base_prefix)
            .field("retry", &self.retry)
            .finish()
    }
}
