//! Target version resolution
//!
//! Runs before any judging. An explicit `--target-version` wins, then the
//! version reported by the cluster. With neither, every known deprecation is
//! reported by judging against the newest boundary in the rule set.

use kube::Client;
use kubesunset_core::{RuleSet, Version};
use kubesunset_kube::server_version;

use crate::error::{CliError, Result};

/// Where the target version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    Flag,
    Cluster,
    RuleSet,
}

pub async fn resolve(
    explicit: Option<&Version>,
    cluster: Option<&Client>,
    rules: &RuleSet,
) -> Result<(Version, TargetSource)> {
    if let Some(version) = explicit {
        return Ok((version.clone(), TargetSource::Flag));
    }

    if let Some(client) = cluster {
        match server_version(client).await {
            Ok(version) => return Ok((version, TargetSource::Cluster)),
            Err(e) => tracing::warn!("failed to detect cluster version: {}", e),
        }
    }

    fallback(rules)
}

fn fallback(rules: &RuleSet) -> Result<(Version, TargetSource)> {
    let version = rules.latest_boundary().cloned().ok_or_else(|| {
        CliError::usage_with_help(
            "unable to determine the target Kubernetes version",
            "Pass --target-version, e.g. --target-version 1.26",
        )
    })?;

    tracing::warn!(
        target_version = %version,
        "target version not set and not detected; reporting every known deprecation"
    );
    Ok((version, TargetSource::RuleSet))
}
