use clap::{Args, Parser, Subcommand};

use depot_types::ArtifactFormat;

#[derive(Parser)]
#[command(
    name = "depot",
    about = "Timestamp-versioned artifact storage for ML pipelines",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base directory artifacts live under
    #[arg(long, global = true, default_value = "data/artifacts")]
    pub base_dir: String,

    /// Artifact format (fixes extension and default subdirectory)
    #[arg(long, global = true, default_value = "csv")]
    pub format: FormatArg,

    /// Override the format's default subdirectory
    #[arg(long, global = true)]
    pub subdir: Option<String>,

    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FormatArg {
    Csv,
    Parquet,
    Json,
    Pkl,
}

impl FormatArg {
    pub fn as_format(self) -> ArtifactFormat {
        match self {
            Self::Csv => ArtifactFormat::Csv,
            Self::Parquet => ArtifactFormat::Parquet,
            Self::Json => ArtifactFormat::Json,
            Self::Pkl => ArtifactFormat::Pickle,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Mint a fresh version from the wall clock
    Allocate(AllocateArgs),
    /// Mint artifact locations for a new (or pinned) version
    Paths(PathsArgs),
    /// Resolve the newest artifact set
    Latest(LatestArgs),
    /// List versions, newest first
    Versions(VersionsArgs),
    /// Audit listing of every artifact generation
    List(ListArgs),
    /// Delete all but the newest versions
    Cleanup(CleanupArgs),
}

#[derive(Args)]
pub struct AllocateArgs {}

#[derive(Args)]
pub struct PathsArgs {
    /// Artifact base names (e.g. X_train X_test Y_train Y_test)
    #[arg(required = true)]
    pub names: Vec<String>,
    /// Pin an existing version instead of allocating one
    #[arg(long)]
    pub version: Option<String>,
}

#[derive(Args)]
pub struct LatestArgs {
    #[arg(required = true)]
    pub names: Vec<String>,
}

#[derive(Args)]
pub struct VersionsArgs {}

#[derive(Args)]
pub struct ListArgs {}

#[derive(Args)]
pub struct CleanupArgs {
    /// Number of newest versions to keep
    #[arg(long, default_value = "5")]
    pub keep: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_allocate() {
        let cli = Cli::try_parse_from(["depot", "allocate"]).unwrap();
        assert!(matches!(cli.command, Command::Allocate(_)));
    }

    #[test]
    fn parse_paths_with_names() {
        let cli = Cli::try_parse_from(["depot", "paths", "X_train", "X_test"]).unwrap();
        if let Command::Paths(args) = cli.command {
            assert_eq!(args.names, vec!["X_train", "X_test"]);
            assert!(args.version.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_paths_requires_names() {
        assert!(Cli::try_parse_from(["depot", "paths"]).is_err());
    }

    #[test]
    fn parse_paths_with_pinned_version() {
        let cli =
            Cli::try_parse_from(["depot", "paths", "--version", "20250101000000", "X_train"])
                .unwrap();
        if let Command::Paths(args) = cli.command {
            assert_eq!(args.version.as_deref(), Some("20250101000000"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_latest_with_format() {
        let cli = Cli::try_parse_from(["depot", "--format", "parquet", "latest", "X_train"])
            .unwrap();
        assert!(matches!(cli.format, FormatArg::Parquet));
        assert!(matches!(cli.command, Command::Latest(_)));
    }

    #[test]
    fn parse_cleanup_keep() {
        let cli = Cli::try_parse_from(["depot", "cleanup", "--keep", "3"]).unwrap();
        if let Command::Cleanup(args) = cli.command {
            assert_eq!(args.keep, 3);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn cleanup_keep_defaults_to_five() {
        let cli = Cli::try_parse_from(["depot", "cleanup"]).unwrap();
        if let Command::Cleanup(args) = cli.command {
            assert_eq!(args.keep, 5);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_base_dir_and_subdir() {
        let cli = Cli::try_parse_from([
            "depot",
            "--base-dir",
            "/var/artifacts",
            "--subdir",
            "encode",
            "versions",
        ])
        .unwrap();
        assert_eq!(cli.base_dir, "/var/artifacts");
        assert_eq!(cli.subdir.as_deref(), Some("encode"));
    }

    #[test]
    fn parse_json_output() {
        let cli = Cli::try_parse_from(["depot", "--output", "json", "list"]).unwrap();
        assert!(matches!(cli.output, OutputFormat::Json));
    }

    #[test]
    fn format_arg_maps_to_artifact_format() {
        assert_eq!(FormatArg::Pkl.as_format(), ArtifactFormat::Pickle);
        assert_eq!(FormatArg::Csv.as_format(), ArtifactFormat::Csv);
    }
}
