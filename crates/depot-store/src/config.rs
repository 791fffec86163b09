use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::retry::RetryPolicy;

/// Default mount point for credentials inside containers.
const MOUNTED_CREDENTIALS_PATH: &str = "/aws/credentials";

/// Credential material for the object-store client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Credentials {
    /// Explicit key pair, resolved from the environment or a mounted file.
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
    /// Defer to the SDK's default provider chain (instance profile, SSO).
    DefaultChain,
}

impl Credentials {
    /// Resolve credentials for this process.
    ///
    /// Resolution order: process environment
    /// (`AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY`), then the container
    /// credentials mount, then the default provider chain. Resolution is done
    /// once at construction and the result passed explicitly into client
    /// constructors; nothing is cached at module level and the environment is
    /// never mutated.
    pub fn resolve() -> Self {
        Self::resolve_from(
            |name| std::env::var(name).ok(),
            Path::new(MOUNTED_CREDENTIALS_PATH),
        )
    }

    /// Resolution with injectable environment and mount path, for tests.
    pub fn resolve_from(env: impl Fn(&str) -> Option<String>, mount: &Path) -> Self {
        if let (Some(access_key_id), Some(secret_access_key)) =
            (env("AWS_ACCESS_KEY_ID"), env("AWS_SECRET_ACCESS_KEY"))
        {
            debug!("using credentials from process environment");
            return Self::Static {
                access_key_id,
                secret_access_key,
            };
        }

        match std::fs::read_to_string(mount) {
            Ok(contents) => {
                if let Some(credentials) = Self::parse_credentials_file(&contents) {
                    debug!(path = %mount.display(), "using credentials from mounted file");
                    return credentials;
                }
                warn!(path = %mount.display(), "mounted credentials file is incomplete");
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %mount.display(), "failed to read mounted credentials: {err}");
            }
        }

        debug!("no explicit credentials found, deferring to default provider chain");
        Self::DefaultChain
    }

    /// Parse `key = value` lines of an AWS-style credentials file.
    fn parse_credentials_file(contents: &str) -> Option<Self> {
        let mut access_key_id = None;
        let mut secret_access_key = None;
        for line in contents.lines() {
            let Some((name, value)) = line.split_once('=') else {
                continue;
            };
            match name.trim() {
                "aws_access_key_id" => access_key_id = Some(value.trim().to_string()),
                "aws_secret_access_key" => secret_access_key = Some(value.trim().to_string()),
                _ => {}
            }
        }
        Some(Self::Static {
            access_key_id: access_key_id?,
            secret_access_key: secret_access_key?,
        })
    }
}

/// Configuration for constructing an object-store client.
///
/// Built once per process and handed to the client constructor; backends
/// receive the constructed client, never the configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectClientConfig {
    /// Bucket holding all artifact namespaces.
    pub bucket: String,
    /// Region the bucket lives in.
    pub region: String,
    /// KMS key for server-side encryption of uploads, if any.
    pub kms_key_arn: Option<String>,
    /// Credential material.
    pub credentials: Credentials,
    /// Retry policy for transient network failures.
    pub retry: RetryPolicy,
}

impl ObjectClientConfig {
    /// Configuration with resolved credentials and default retry policy.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            kms_key_arn: None,
            credentials: Credentials::resolve(),
            retry: RetryPolicy::default(),
        }
    }

    /// Read the full configuration from the process environment.
    ///
    /// `S3_BUCKET` is required; `AWS_REGION` defaults to `us-east-1`;
    /// `S3_KMS_KEY_ARN` is optional.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    /// Environment-injectable variant of [`ObjectClientConfig::from_env`].
    pub fn from_env_with(env: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let bucket = env("S3_BUCKET")
            .ok_or_else(|| StoreError::Config("S3_BUCKET is not set".into()))?;
        let region = env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string());
        let kms_key_arn = env("S3_KMS_KEY_ARN");
        Ok(Self {
            bucket,
            region,
            kms_key_arn,
            credentials: Credentials::resolve_from(env, Path::new(MOUNTED_CREDENTIALS_PATH)),
            retry: RetryPolicy::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // -----------------------------------------------------------------------
    // Credential resolution order
    // -----------------------------------------------------------------------

    #[test]
    fn env_wins_over_mounted_file() {
        let mut mount = tempfile::NamedTempFile::new().unwrap();
        writeln!(mount, "aws_access_key_id = FILEKEY").unwrap();
        writeln!(mount, "aws_secret_access_key = FILESECRET").unwrap();

        let env = env_of(&[
            ("AWS_ACCESS_KEY_ID", "ENVKEY"),
            ("AWS_SECRET_ACCESS_KEY", "ENVSECRET"),
        ]);
        let credentials = Credentials::resolve_from(env, mount.path());
        assert_eq!(
            credentials,
            Credentials::Static {
                access_key_id: "ENVKEY".into(),
                secret_access_key: "ENVSECRET".into(),
            }
        );
    }

    #[test]
    fn mounted_file_used_when_env_is_empty() {
        let mut mount = tempfile::NamedTempFile::new().unwrap();
        writeln!(mount, "[default]").unwrap();
        writeln!(mount, "aws_access_key_id = FILEKEY").unwrap();
        writeln!(mount, "aws_secret_access_key=FILESECRET").unwrap();

        let credentials = Credentials::resolve_from(env_of(&[]), mount.path());
        assert_eq!(
            credentials,
            Credentials::Static {
                access_key_id: "FILEKEY".into(),
                secret_access_key: "FILESECRET".into(),
            }
        );
    }

    #[test]
    fn partial_env_does_not_count() {
        // Only one of the pair set: fall through to the next layer.
        let env = env_of(&[("AWS_ACCESS_KEY_ID", "ENVKEY")]);
        let credentials = Credentials::resolve_from(env, Path::new("/nonexistent/credentials"));
        assert_eq!(credentials, Credentials::DefaultChain);
    }

    #[test]
    fn missing_everything_defers_to_default_chain() {
        let credentials =
            Credentials::resolve_from(env_of(&[]), Path::new("/nonexistent/credentials"));
        assert_eq!(credentials, Credentials::DefaultChain);
    }

    #[test]
    fn incomplete_mounted_file_defers_to_default_chain() {
        let mut mount = tempfile::NamedTempFile::new().unwrap();
        writeln!(mount, "aws_access_key_id = FILEKEY").unwrap();
        let credentials = Credentials::resolve_from(env_of(&[]), mount.path());
        assert_eq!(credentials, Credentials::DefaultChain);
    }

    // -----------------------------------------------------------------------
    // Client configuration
    // -----------------------------------------------------------------------

    #[test]
    fn from_env_requires_bucket() {
        let err = ObjectClientConfig::from_env_with(env_of(&[])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn from_env_defaults_region() {
        let config =
            ObjectClientConfig::from_env_with(env_of(&[("S3_BUCKET", "ml-artifacts")])).unwrap();
        assert_eq!(config.bucket, "ml-artifacts");
        assert_eq!(config.region, "us-east-1");
        assert!(config.kms_key_arn.is_none());
    }

    #[test]
    fn from_env_reads_kms_arn() {
        let config = ObjectClientConfig::from_env_with(env_of(&[
            ("S3_BUCKET", "ml-artifacts"),
            ("AWS_REGION", "eu-west-1"),
            ("S3_KMS_KEY_ARN", "arn:aws:kms:eu-west-1:1:key/k"),
        ]))
        .unwrap();
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(
            config.kms_key_arn.as_deref(),
            Some("arn:aws:kms:eu-west-1:1:key/k")
        );
    }
}
