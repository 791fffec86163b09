use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};

/// One page of a prefix listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Keys in this page, lexicographic order.
    pub keys: Vec<String>,
    /// Continuation token for the next page, `None` on the last page.
    pub next: Option<String>,
}

/// Wire client for an S3-compatible object store.
///
/// This is the seam between the versioning layer and the network: the
/// [`ObjectStore`](crate::object::ObjectStore) backend drives these five
/// calls and nothing else. Production deployments adapt their SDK client
/// behind this trait; [`InMemoryObjectClient`] serves tests and embedding.
///
/// Contract for implementations:
/// - Listing is paginated and lexicographic; a page's `next` token resumes
///   strictly after the last key returned. Callers always aggregate to the
///   final page before acting on a listing.
/// - `get` returns `Ok(None)` for a missing key; absence is never an `Err`.
/// - `delete` is idempotent: deleting a key that is already gone returns
///   `Ok(false)`.
/// - Transient failures are reported via [`StoreError::transient`] so the
///   caller's retry policy can distinguish them from permanent ones.
pub trait ObjectClient: Send + Sync {
    /// List one page of keys under `prefix`, resuming from `token`.
    fn list_page(&self, prefix: &str, token: Option<&str>) -> StoreResult<ListPage>;

    /// Write an object at `key`, replacing any existing object.
    fn put(&self, key: &str, data: &[u8]) -> StoreResult<()>;

    /// Read the object at `key`. Returns `Ok(None)` if absent.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Check whether `key` exists.
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Delete the object at `key`. Returns `true` if it existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;
}

/// In-memory object client for tests and embedding.
///
/// Keys live in a `BTreeMap` behind an `RwLock`, which gives the
/// lexicographic listing order real object stores provide. The page size is
/// configurable so pagination aggregation can be exercised, and transient
/// failures can be injected to exercise retry handling.
pub struct InMemoryObjectClient {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
    page_size: usize,
    inject_failures: AtomicU32,
}

impl InMemoryObjectClient {
    /// Create an empty client with a large single-page listing.
    pub fn new() -> Self {
        Self::with_page_size(1000)
    }

    /// Create an empty client that lists at most `page_size` keys per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            page_size: page_size.max(1),
            inject_failures: AtomicU32::new(0),
        }
    }

    /// Make the next `count` calls fail with a transient error.
    pub fn inject_transient_failures(&self, count: u32) {
        self.inject_failures.store(count, Ordering::SeqCst);
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the client holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    fn maybe_fail(&self) -> StoreResult<()> {
        let remaining = self.inject_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.inject_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::transient("injected failure"));
        }
        Ok(())
    }
}

impl Default for InMemoryObjectClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectClient for InMemoryObjectClient {
    fn list_page(&self, prefix: &str, token: Option<&str>) -> StoreResult<ListPage> {
        self.maybe_fail()?;
        let map = self.objects.read().expect("lock poisoned");
        let keys: Vec<String> = map
            .keys()
            .filter(|k| k.starts_with(prefix))
            .filter(|k| token.map_or(true, |t| k.as_str() > t))
            .take(self.page_size)
            .cloned()
            .collect();
        // More keys remain after this page iff a full page was returned and
        // at least one matching key sorts after its last entry.
        let next = match keys.last() {
            Some(last) if keys.len() == self.page_size => map
                .keys()
                .any(|k| k.starts_with(prefix) && k.as_str() > last.as_str())
                .then(|| last.clone()),
            _ => None,
        };
        Ok(ListPage { keys, next })
    }

    fn put(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.maybe_fail()?;
        let mut map = self.objects.write().expect("lock poisoned");
        map.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.maybe_fail()?;
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        self.maybe_fail()?;
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        self.maybe_fail()?;
        let mut map = self.objects.write().expect("lock poisoned");
        Ok(map.remove(key).is_some())
    }
}

impl std::fmt::Debug for InMemoryObjectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectClient")
            .field("object_count", &self.len())
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryObjectClient {
        let client = InMemoryObjectClient::new();
        for key in ["a/1", "a/2", "a/3", "b/1"] {
            client.put(key, b"x").unwrap();
        }
        client
    }

    // -----------------------------------------------------------------------
    // Core operations
    // -----------------------------------------------------------------------

    #[test]
    fn put_get_roundtrip() {
        let client = InMemoryObjectClient::new();
        client.put("artifacts/x", b"payload").unwrap();
        assert_eq!(client.get("artifacts/x").unwrap(), Some(b"payload".to_vec()));
    }

    #[test]
    fn get_missing_returns_none() {
        let client = InMemoryObjectClient::new();
        assert!(client.get("nope").unwrap().is_none());
    }

    #[test]
    fn exists_tracks_put_and_delete() {
        let client = InMemoryObjectClient::new();
        client.put("k", b"v").unwrap();
        assert!(client.exists("k").unwrap());
        assert!(client.delete("k").unwrap());
        assert!(!client.exists("k").unwrap());
    }

    #[test]
    fn delete_is_idempotent() {
        let client = InMemoryObjectClient::new();
        client.put("k", b"v").unwrap();
        assert!(client.delete("k").unwrap());
        assert!(!client.delete("k").unwrap());
        assert!(!client.delete("never-existed").unwrap());
    }

    // -----------------------------------------------------------------------
    // Listing and pagination
    // -----------------------------------------------------------------------

    #[test]
    fn list_filters_by_prefix() {
        let client = seeded();
        let page = client.list_page("a/", None).unwrap();
        assert_eq!(page.keys, vec!["a/1", "a/2", "a/3"]);
        assert!(page.next.is_none());
    }

    #[test]
    fn list_is_lexicographic() {
        let client = InMemoryObjectClient::new();
        client.put("p/b", b"").unwrap();
        client.put("p/a", b"").unwrap();
        client.put("p/c", b"").unwrap();
        let page = client.list_page("p/", None).unwrap();
        assert_eq!(page.keys, vec!["p/a", "p/b", "p/c"]);
    }

    #[test]
    fn pagination_resumes_after_token() {
        let client = InMemoryObjectClient::with_page_size(2);
        for key in ["a/1", "a/2", "a/3", "a/4", "a/5"] {
            client.put(key, b"").unwrap();
        }

        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0;
        loop {
            let page = client.list_page("a/", token.as_deref()).unwrap();
            keys.extend(page.keys);
            pages += 1;
            match page.next {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        assert_eq!(keys, vec!["a/1", "a/2", "a/3", "a/4", "a/5"]);
        assert_eq!(pages, 3);
    }

    #[test]
    fn exact_page_boundary_terminates() {
        let client = InMemoryObjectClient::with_page_size(2);
        client.put("a/1", b"").unwrap();
        client.put("a/2", b"").unwrap();
        let page = client.list_page("a/", None).unwrap();
        assert_eq!(page.keys.len(), 2);
        assert!(page.next.is_none());
    }

    #[test]
    fn list_empty_prefix_matches_everything() {
        let client = seeded();
        let page = client.list_page("", None).unwrap();
        assert_eq!(page.keys.len(), 4);
    }

    // -----------------------------------------------------------------------
    // Failure injection
    // -----------------------------------------------------------------------

    #[test]
    fn injected_failures_are_transient_and_finite() {
        let client = seeded();
        client.inject_transient_failures(2);
        assert!(client.list_page("a/", None).unwrap_err().is_transient());
        assert!(client.get("a/1").unwrap_err().is_transient());
        // Third call goes through.
        assert!(client.exists("a/1").unwrap());
    }
}
