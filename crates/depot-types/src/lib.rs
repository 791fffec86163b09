//! Foundation types for depot.
//!
//! This crate provides the core identifiers shared by every depot backend:
//! timestamp versions, artifact kinds, and artifact formats. Every other
//! depot crate depends on `depot-types`.
//!
//! # Key Types
//!
//! - [`Version`] — 14-digit `YYYYMMDDHHMMSS` identifier naming one
//!   artifact-set generation; lexicographic order equals chronological order
//! - [`ArtifactKind`] — closed set of producer namespaces (data, model,
//!   inference)
//! - [`ArtifactFormat`] — closed extension/subdirectory mapping (csv,
//!   parquet, json, pkl)

pub mod artifact;
pub mod error;
pub mod version;

pub use artifact::{ArtifactFormat, ArtifactKind};
pub use error::TypeError;
pub use version::{latest, Version, VERSION_LEN};
