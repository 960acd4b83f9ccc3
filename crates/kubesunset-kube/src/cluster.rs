//! Live cluster collector
//!
//! The API server converts every object to the version it prefers, so listing
//! a resource never reveals which API version the user deployed. Instead the
//! original manifest is recovered from the `last-applied-configuration`
//! annotation written by `kubectl apply` (or a user-supplied equivalent).
//! Objects without such an annotation cannot be judged and are skipped.

use async_trait::async_trait;
use futures::future::join_all;
use kube::{
    Client,
    api::{Api, DynamicObject, ListParams},
    discovery::{ApiCapabilities, ApiResource, Discovery, verbs},
};
use kubesunset_core::{DiscoveredResource, ResourceIdentity, Source, parse_documents};
use std::collections::{BTreeMap, BTreeSet};

use crate::collector::Collector;
use crate::error::{CollectError, Result};

/// Annotation written by `kubectl apply`
pub const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Collects resources from a live cluster
pub struct ClusterCollector {
    client: Client,
    /// Kinds worth listing (those with a lifecycle rule), by API group
    targets: BTreeMap<String, BTreeSet<String>>,
    /// Annotations holding the original manifest, in lookup order
    annotations: Vec<String>,
}

impl ClusterCollector {
    pub fn new(client: Client, identities: impl IntoIterator<Item = ResourceIdentity>) -> Self {
        let mut targets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for identity in identities {
            targets.entry(identity.group).or_default().insert(identity.kind);
        }

        Self {
            client,
            targets,
            annotations: vec![LAST_APPLIED_ANNOTATION.to_string()],
        }
    }

    /// Also look for the original manifest in these annotations
    pub fn with_additional_annotations(mut self, annotations: &[String]) -> Self {
        self.annotations.extend(annotations.iter().cloned());
        self
    }

    /// API groups to discover; the core group is `""`
    fn discovery_groups(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    /// Listable API resources whose kind has a rule, one per group
    ///
    /// Discovery is limited to groups with rules, so an unavailable unrelated
    /// APIService does not fail the collector.
    async fn resources_to_list(&self) -> Result<Vec<ApiResource>> {
        let discovery = Discovery::new(self.client.clone())
            .filter(&self.discovery_groups())
            .run()
            .await?;

        let mut resources = Vec::new();
        for group in discovery.groups() {
            let Some(kinds) = self.targets.get(group.name()) else {
                continue;
            };
            for kind in kinds {
                if let Some((ar, caps)) = group.recommended_kind(kind) {
                    if is_listable(&caps) {
                        resources.push(ar);
                    }
                }
            }
        }

        tracing::debug!(count = resources.len(), "resource types to list");
        Ok(resources)
    }

    async fn list_resource(&self, ar: &ApiResource) -> Result<Vec<DiscoveredResource>> {
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), ar);
        let list = api.list(&ListParams::default()).await?;

        let mut resources = Vec::new();
        for obj in &list.items {
            if let Some(resource) = self.original_manifest(obj) {
                resources.push(resource);
            }
        }

        tracing::debug!(
            kind = %ar.kind,
            api_version = %ar.api_version,
            listed = list.items.len(),
            annotated = resources.len(),
            "listed resource type"
        );
        Ok(resources)
    }

    /// Recover the resource as it was applied, filling in metadata the
    /// annotation may omit from the live object
    fn original_manifest(&self, obj: &DynamicObject) -> Option<DiscoveredResource> {
        let annotations = obj.metadata.annotations.as_ref()?;
        let applied = self
            .annotations
            .iter()
            .find_map(|key| annotations.get(key))?;

        let mut resource = match parse_documents(applied, &Source::Cluster) {
            Ok(mut resources) if !resources.is_empty() => resources.swap_remove(0),
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!(
                    name = obj.metadata.name.as_deref().unwrap_or_default(),
                    "undecodable last-applied configuration: {}",
                    e
                );
                return None;
            }
        };

        if resource.name.is_empty() {
            resource.name = obj.metadata.name.clone().unwrap_or_default();
        }
        if resource.namespace.is_none() {
            resource.namespace = obj.metadata.namespace.clone();
        }
        if resource.labels.is_empty() {
            resource.labels = obj.metadata.labels.clone().unwrap_or_default();
        }

        Some(resource)
    }
}

fn is_listable(caps: &ApiCapabilities) -> bool {
    caps.supports_operation(verbs::LIST)
}

#[async_trait]
impl Collector for ClusterCollector {
    fn name(&self) -> &str {
        "cluster"
    }

    async fn collect(&self) -> Result<Vec<DiscoveredResource>> {
        let to_list = self.resources_to_list().await?;

        let results = join_all(to_list.iter().map(|ar| self.list_resource(ar))).await;

        let mut resources = Vec::new();
        for (ar, result) in to_list.iter().zip(results) {
            match result {
                Ok(found) => resources.extend(found),
                // Partial results: one unreadable type doesn't hide the others
                Err(e) if e.is_forbidden() || is_not_found(&e) => {
                    tracing::warn!(kind = %ar.kind, api_version = %ar.api_version, "skipping: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(count = resources.len(), "cluster collector finished");
        Ok(resources)
    }
}

fn is_not_found(e: &CollectError) -> bool {
    matches!(e, CollectError::Api(kube::Error::Api(resp)) if resp.code == 404)
}
