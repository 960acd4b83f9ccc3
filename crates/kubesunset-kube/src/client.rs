//! Kubernetes client construction and server version detection

use kube::Client;
use kube::config::{Config, KubeConfigOptions, Kubeconfig};
use kubesunset_core::Version;
use std::path::Path;

use crate::error::{CollectError, Result};

/// Build a client from an explicit kubeconfig and/or context
///
/// Without either, the usual inference applies (`KUBECONFIG`, `~/.kube/config`,
/// then in-cluster service account).
pub async fn connect(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match (kubeconfig, context) {
        (Some(path), _) => {
            let kubeconfig = Kubeconfig::read_from(path)?;
            Config::from_custom_kubeconfig(kubeconfig, &options).await?
        }
        (None, Some(_)) => Config::from_kubeconfig(&options).await?,
        (None, None) => Config::infer().await?,
    };

    tracing::debug!(cluster_url = %config.cluster_url, "connecting to cluster");
    Ok(Client::try_from(config)?)
}

/// Ask the API server for its version
pub async fn server_version(client: &Client) -> Result<Version> {
    let info = client.apiserver_version().await?;
    let version = parse_server_version(&info.git_version)?;
    tracing::info!(%version, "detected server version");
    Ok(version)
}

/// Pre-release prefixes used by upstream Kubernetes builds
const UPSTREAM_PRERELEASES: &[&str] = &["alpha", "beta", "rc"];

/// Parse a `gitVersion` such as `v1.26.3-eks-a5565ad` or `v1.27.1+k3s1`
///
/// Vendor suffixes (`-eks-…`, `-gke.…`) mark a released build, not a
/// pre-release, and are dropped so `v1.26.0-eks-…` judges as `v1.26.0`.
pub fn parse_server_version(git_version: &str) -> Result<Version> {
    let version = Version::parse(git_version)
        .map_err(|_| CollectError::ServerVersion(git_version.to_string()))?;

    match version.pre() {
        Some(pre) if !UPSTREAM_PRERELEASES.iter().any(|p| pre.starts_with(p)) => Ok(
            Version::new(version.major(), version.minor(), version.patch()),
        ),
        _ => Ok(version),
    }
}
