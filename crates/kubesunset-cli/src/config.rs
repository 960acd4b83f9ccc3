//! Command-line flags and their validation
//!
//! Short flags match the ones common deprecation scanners use, so existing CI
//! invocations carry over. [`Config::from_cli`] turns raw flags into a validated
//! configuration; anything it rejects is a usage error.

use clap::{Parser, ValueEnum};
use kubesunset_core::{Version, parse_additional_kind};
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

/// Output file value meaning standard output
pub const STDOUT_PATH: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "kubesunset")]
#[command(author = "kubesunset Contributors")]
#[command(version, disable_version_flag = true)]
#[command(
    about = "Find deprecated and removed Kubernetes APIs in clusters, Helm releases and manifests",
    long_about = None
)]
pub struct Cli {
    /// Additional kind to report, as Kind.version.group (e.g. ManagedCertificate.v1beta1.networking.gke.io)
    #[arg(short = 'a', long = "additional-kind", value_delimiter = ',')]
    pub additional_kinds: Vec<String>,

    /// Additional annotation holding the original manifest of cluster objects
    #[arg(short = 'A', long = "additional-annotation", value_delimiter = ',')]
    pub additional_annotations: Vec<String>,

    /// Enable the cluster collector
    #[arg(
        short = 'c',
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub cluster: bool,

    /// Kubeconfig context to use
    #[arg(short = 'x', long)]
    pub context: Option<String>,

    /// Exit with a non-zero code when deprecated or removed APIs are found
    #[arg(short = 'e', long)]
    pub exit_error: bool,

    /// Manifest file or directory to scan; "-" reads standard input
    #[arg(short = 'f', long = "filename", value_delimiter = ',')]
    pub filenames: Vec<String>,

    /// Enable the Helm v3 collector
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub helm3: bool,

    /// Path to the kubeconfig file (defaults to $KUBECONFIG, then ~/.kube/config)
    #[arg(short = 'k', long)]
    pub kubeconfig: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Output file; "-" writes to standard output
    #[arg(short = 'O', long, default_value = STDOUT_PATH)]
    pub output_file: String,

    /// Log level
    #[arg(short = 'l', long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Kubernetes version to judge against (e.g. 1.26); detected from the cluster if omitted
    #[arg(short = 't', long)]
    pub target_version: Option<String>,

    /// Include resource labels in the report
    #[arg(long)]
    pub labels: bool,

    /// Print version
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    #[value(aliases = ["fatal", "panic"])]
    Error,
    #[value(alias = "disabled")]
    Off,
}

impl LogLevel {
    /// Default filter directive for this level
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub additional_kinds: Vec<String>,
    pub additional_annotations: Vec<String>,
    pub cluster: bool,
    pub context: Option<String>,
    pub exit_error: bool,
    pub filenames: Vec<String>,
    pub helm3: bool,
    pub kubeconfig: Option<PathBuf>,
    pub output: OutputFormat,
    /// `None` writes to standard output
    pub output_file: Option<PathBuf>,
    pub target_version: Option<Version>,
    pub labels: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        for kind in &cli.additional_kinds {
            parse_additional_kind(kind).map_err(|e| {
                CliError::usage_with_help(
                    e.to_string(),
                    "Additional kinds are written as Kind.version.group, e.g. ManagedCertificate.v1beta1.networking.gke.io",
                )
            })?;
        }

        let target_version = cli
            .target_version
            .as_deref()
            .map(Version::parse)
            .transpose()
            .map_err(|e| {
                CliError::usage_with_help(e.to_string(), "Use a version such as 1.26 or v1.26.3")
            })?;

        let output_file = validate_output_file(&cli.output_file)?;

        Ok(Self {
            additional_kinds: cli.additional_kinds,
            additional_annotations: cli.additional_annotations,
            cluster: cli.cluster,
            context: cli.context,
            exit_error: cli.exit_error,
            filenames: cli.filenames,
            helm3: cli.helm3,
            kubeconfig: cli.kubeconfig,
            output: cli.output,
            output_file,
            target_version,
            labels: cli.labels,
        })
    }

    /// True if either collector needs a cluster connection
    pub fn needs_cluster(&self) -> bool {
        self.cluster || self.helm3
    }
}

fn validate_output_file(value: &str) -> Result<Option<PathBuf>> {
    if value.is_empty() {
        return Err(CliError::usage("output file name must not be empty"));
    }
    if value == STDOUT_PATH {
        return Ok(None);
    }

    let path = PathBuf::from(value);
    let parent = path.parent().unwrap_or(Path::new(""));
    if !parent.as_os_str().is_empty() && !parent.is_dir() {
        return Err(CliError::usage_with_help(
            format!("output directory '{}' does not exist", parent.display()),
            "Create the directory first or write to standard output with -O -",
        ));
    }
    Ok(Some(path))
}
