use std::collections::BTreeMap;
use std::fmt;

use depot_types::Version;

use crate::error::StoreResult;
use crate::retention::{RetentionWindow, SweepReport};

/// A named artifact set resolved to backend locations.
///
/// Maps base name to location. May be a strict subset of the names a caller
/// asked for: partial versions are tolerated, and the missing names are
/// simply absent from the map.
pub type ArtifactSet<L> = BTreeMap<String, L>;

/// Timestamp-versioned artifact storage.
///
/// Both backends, the local filesystem and the object store, implement
/// this contract. All implementations must satisfy these invariants:
/// - Versions are immutable once any artifact is written into them; the
///   versioning layer itself never overwrites in place.
/// - A version exists for resolution purposes if its directory/prefix
///   exists, independent of which artifacts it actually contains.
/// - Latest resolution picks the maximum valid 14-digit version; malformed
///   version-like names are skipped, never an error.
/// - Absence is not failure: a missing version yields an empty map, a
///   missing artifact inside the newest version is warned about and omitted.
/// - Cleanup is best-effort: per-item deletion failures are logged, counted,
///   and left for a future sweep.
pub trait VersionedStore: Send + Sync {
    /// Namespace one family of versions lives under: a format subdirectory
    /// on the local backend, an artifact-kind prefix on the object store.
    type Namespace;

    /// Backend-specific locator for one artifact: an absolute path on the
    /// local backend, an object key on the object store.
    type Location: Clone + fmt::Debug;

    /// Mint locations for a new (or explicitly pinned) version.
    ///
    /// Allocates a fresh version from the wall clock when `version` is
    /// `None`. Returns one location per requested name. Never checks for
    /// collisions with an existing version: two calls within the same
    /// second share a namespace by design.
    fn create_paths(
        &self,
        namespace: &Self::Namespace,
        names: &[&str],
        version: Option<Version>,
    ) -> StoreResult<ArtifactSet<Self::Location>>;

    /// Resolve the newest version and the requested artifacts within it.
    ///
    /// Names absent from the newest version are warned about and omitted;
    /// zero matching versions yields an empty map.
    fn latest(
        &self,
        namespace: &Self::Namespace,
        names: &[&str],
    ) -> StoreResult<ArtifactSet<Self::Location>>;

    /// All valid versions in the namespace, newest first.
    fn versions(&self, namespace: &Self::Namespace) -> StoreResult<Vec<Version>>;

    /// Audit listing: every artifact of every version, grouped by base name,
    /// newest version first.
    fn list_all(&self) -> StoreResult<BTreeMap<String, Vec<(Version, Self::Location)>>>;

    /// Retention sweep: delete every version beyond the window's
    /// `keep_count` newest. A no-op when the namespace is already within
    /// the window.
    fn cleanup(
        &self,
        namespace: &Self::Namespace,
        window: RetentionWindow,
    ) -> StoreResult<SweepReport>;
}
