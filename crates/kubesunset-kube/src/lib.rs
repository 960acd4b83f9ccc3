//! kubesunset Kube - Resource collectors for kubesunset
//!
//! This crate provides:
//! - **Collector trait**: The narrow contract every discovery path implements
//! - **File collector**: Manifests from files, directories and stdin
//! - **Cluster collector**: Live objects, judged by their last-applied configuration
//! - **Helm collector**: Manifests of deployed Helm v3 releases
//! - **Scan**: Running collectors concurrently into one aggregated report
//! - **Client**: Kubeconfig/context handling and server version detection

pub mod client;
pub mod cluster;
pub mod collector;
pub mod error;
pub mod files;
pub mod helm;
pub mod scan;

pub use client::{connect, parse_server_version, server_version};
pub use cluster::{ClusterCollector, LAST_APPLIED_ANNOTATION};
pub use collector::Collector;
pub use error::{CollectError, Result};
pub use files::{FileCollector, STDIN_PATH};
pub use helm::{HelmCollector, HelmRelease, decode_release};
pub use scan::{CollectorFailure, ScanOutcome, scan};
