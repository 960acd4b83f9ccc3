//! Resource identities and discovered resources
//!
//! A [`ResourceIdentity`] is the `(Kind, version, group)` triple naming an API
//! resource type. Collectors wrap it in a [`DiscoveredResource`] together with
//! the metadata needed for reporting: where the object was found and what it
//! is called.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The `(Kind, APIVersion, Group)` triple of a Kubernetes resource type
///
/// `api_version` is the bare version (`v2beta2`); `group` is empty for the
/// core API group. Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentity {
    pub kind: String,
    pub api_version: String,
    pub group: String,
}

impl ResourceIdentity {
    pub fn new(
        kind: impl Into<String>,
        api_version: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            api_version: api_version.into(),
            group: group.into(),
        }
    }

    /// Build from a manifest's `apiVersion` field (`group/version` or `version`)
    pub fn from_type_meta(kind: impl Into<String>, api_version: &str) -> Self {
        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };
        Self::new(kind, version, group)
    }

    /// The manifest form of the API version (`autoscaling/v2beta2`, `v1`)
    pub fn group_version(&self) -> String {
        if self.group.is_empty() {
            self.api_version.clone()
        } else {
            format!("{}/{}", self.group, self.api_version)
        }
    }
}

impl fmt::Display for ResourceIdentity {
    /// `Kind.version.group`, or `Kind.version` for the core group
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.api_version)?;
        if !self.group.is_empty() {
            write!(f, ".{}", self.group)?;
        }
        Ok(())
    }
}

/// Where a resource was discovered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    /// Live cluster, via the last-applied configuration
    Cluster,
    /// Manifest file on disk
    File { path: String },
    /// Manifest read from standard input
    Stdin,
    /// Manifest of a deployed Helm v3 release
    Helm {
        release: String,
        namespace: String,
        revision: u32,
    },
}

impl Source {
    /// Stable identifier used for deduplication and ordering
    pub fn id(&self) -> String {
        match self {
            Source::Cluster => "cluster".to_string(),
            Source::File { path } => format!("file:{}", path),
            Source::Stdin => "stdin".to_string(),
            Source::Helm {
                release,
                namespace,
                revision,
            } => format!("helm:{}/{}#{}", namespace, release, revision),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// A resource found by a collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredResource {
    pub identity: ResourceIdentity,
    pub name: String,
    pub namespace: Option<String>,
    pub source: Source,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl DiscoveredResource {
    pub fn new(identity: ResourceIdentity, name: impl Into<String>, source: Source) -> Self {
        Self {
            identity,
            name: name.into(),
            namespace: None,
            source,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }
}
