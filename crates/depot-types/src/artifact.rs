use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of artifact a producer run emits.
///
/// Kinds are the object-store namespace: every kind owns one key prefix
/// under which its versions live. This is a closed set selected by
/// configuration, not an open-ended extension point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Train/test dataset splits produced by the data pipeline.
    Data,
    /// Trained model binaries and their metrics.
    Model,
    /// Scored outputs produced by inference runs.
    Inference,
}

impl ArtifactKind {
    /// All kinds, in listing order.
    pub const ALL: [ArtifactKind; 3] = [Self::Data, Self::Model, Self::Inference];

    /// The key-prefix segment this kind occupies in the object store.
    pub fn segment(&self) -> &'static str {
        match self {
            Self::Data => "data_artifacts",
            Self::Model => "model_artifacts",
            Self::Inference => "inference_artifacts",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for ArtifactKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "data" | "data_artifacts" => Ok(Self::Data),
            "model" | "model_artifacts" => Ok(Self::Model),
            "inference" | "inference_artifacts" => Ok(Self::Inference),
            other => Err(TypeError::UnknownKind(other.to_string())),
        }
    }
}

/// On-disk format of an artifact.
///
/// The format fixes both the file extension and, on the local backend, the
/// subdirectory the versions live under. The mapping is an explicit closed
/// enumeration rather than string concatenation at call sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactFormat {
    /// Comma-separated dataset splits.
    Csv,
    /// Columnar dataset splits.
    Parquet,
    /// Metrics, manifests, and other structured sidecars.
    Json,
    /// Serialized model binaries.
    Pickle,
}

impl ArtifactFormat {
    /// Dataset formats scanned by the audit listing (`list_all`).
    pub const DATASET_FORMATS: [ArtifactFormat; 2] = [Self::Csv, Self::Parquet];

    /// File extension, without the leading dot.
    pub fn ext(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
            Self::Json => "json",
            Self::Pickle => "pkl",
        }
    }

    /// Default local subdirectory for this format.
    ///
    /// The local layout groups versions per format, `{base}/{subdir}/{version}/`,
    /// and the subdirectory defaults to the extension.
    pub fn subdir(&self) -> &'static str {
        self.ext()
    }

    /// Match a file name's extension against the known formats.
    pub fn from_ext(ext: &str) -> Result<Self, TypeError> {
        match ext {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            "json" => Ok(Self::Json),
            "pkl" => Ok(Self::Pickle),
            other => Err(TypeError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

impl FromStr for ArtifactFormat {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ext(s)
    }
}
