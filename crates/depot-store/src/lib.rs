//! Timestamp-versioned artifact storage for depot.
//!
//! This crate implements the versioning layer of the ML pipeline: named
//! groups of run outputs (dataset splits, models, inference results) stored
//! under 14-digit wall-clock versions, resolved by "newest version wins",
//! and retired by retention sweeps.
//!
//! # Storage Backends
//!
//! Both backends implement the [`VersionedStore`] trait:
//!
//! - [`LocalStore`] -- versions as directories of files under a base
//!   directory, with a legacy flat-layout fallback
//! - [`ObjectStore`] -- versions as common key prefixes, driven through the
//!   [`ObjectClient`] port ([`InMemoryObjectClient`] for tests and
//!   embedding)
//!
//! # Design Rules
//!
//! 1. Versions are immutable once any artifact is written into them.
//! 2. Absence is data, not failure: missing versions and missing artifacts
//!    yield empty or partial result maps, never errors.
//! 3. Malformed version-like names are skipped during enumeration, never
//!    aborting a scan.
//! 4. Object-store listings are aggregated to the last page before any
//!    latest/cleanup decision is made.
//! 5. Only transient backend failures are retried; retries are bounded with
//!    exponential backoff.
//! 6. Cleanup is best-effort: per-item deletion failures are logged,
//!    counted, and left for a future sweep.

pub mod client;
pub mod config;
pub mod error;
pub mod local;
pub mod object;
pub mod retention;
pub mod retry;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use client::{InMemoryObjectClient, ListPage, ObjectClient};
pub use config::{Credentials, ObjectClientConfig};
pub use error::{StoreError, StoreResult};
pub use local::{FormatLayout, LocalStore};
pub use object::{ObjectNamespace, ObjectStore};
pub use retention::{stale_versions, RetentionWindow, SweepReport};
pub use retry::RetryPolicy;
pub use traits::{ArtifactSet, VersionedStore};
