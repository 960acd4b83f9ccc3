//! Manifest decoding
//!
//! Turns YAML (or JSON) manifest text into [`DiscoveredResource`]s. Used by
//! every collector: files and stdin directly, Helm releases on the stored
//! release manifest, and the cluster collector on last-applied annotations.

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};
use crate::identity::{DiscoveredResource, ResourceIdentity, Source};

/// Decode every object in a (multi-document) manifest
///
/// Empty documents and documents without `apiVersion`/`kind` are skipped;
/// `kind: List` documents contribute their items.
pub fn parse_documents(content: &str, source: &Source) -> Result<Vec<DiscoveredResource>> {
    let mut resources = Vec::new();

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document).map_err(|e| CoreError::Manifest {
            source_id: source.id(),
            message: e.to_string(),
        })?;
        collect_objects(&value, source, &mut resources);
    }

    Ok(resources)
}

fn collect_objects(value: &Value, source: &Source, out: &mut Vec<DiscoveredResource>) {
    if value.is_null() {
        return;
    }

    let (Some(api_version), Some(kind)) = (
        value.get("apiVersion").and_then(Value::as_str),
        value.get("kind").and_then(Value::as_str),
    ) else {
        tracing::debug!(source = %source, "skipping document without apiVersion/kind");
        return;
    };

    if kind == "List" {
        if let Some(items) = value.get("items").and_then(Value::as_sequence) {
            for item in items {
                collect_objects(item, source, out);
            }
        }
        return;
    }

    let metadata = value.get("metadata");
    let name = metadata
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let namespace = metadata
        .and_then(|m| m.get("namespace"))
        .and_then(Value::as_str);
    let labels = metadata
        .and_then(|m| m.get("labels"))
        .map(string_map)
        .unwrap_or_default();

    let mut resource = DiscoveredResource::new(
        ResourceIdentity::from_type_meta(kind, api_version),
        name,
        source.clone(),
    )
    .with_labels(labels);
    if let Some(namespace) = namespace {
        resource = resource.with_namespace(namespace);
    }

    out.push(resource);
}

fn string_map(value: &Value) -> BTreeMap<String, String> {
    value
        .as_mapping()
        .map(|mapping| {
            mapping
                .iter()
                .filter_map(|(k, v)| {
                    let key = k.as_str()?;
                    let val = match v {
                        Value::String(s) => s.clone(),
                        Value::Bool(b) => b.to_string(),
                        Value::Number(n) => n.to_string(),
                        _ => return None,
                    };
                    Some((key.to_string(), val))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> Source {
        Source::File {
            path: "manifests/app.yaml".to_string(),
        }
    }

    #[test]
    fn test_multi_document() {
        let content = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: prod
  labels:
    app: web
    tier: "1"
---
# just a comment
---
apiVersion: autoscaling/v2beta2
kind: HorizontalPodAutoscaler
metadata:
  name: web
"#;
        let resources = parse_documents(content, &file()).unwrap();
        assert_eq!(resources.len(), 2);

        assert_eq!(resources[0].identity, ResourceIdentity::new("Deployment", "v1", "apps"));
        assert_eq!(resources[0].namespace.as_deref(), Some("prod"));
        assert_eq!(resources[0].labels.get("app").map(String::as_str), Some("web"));
        assert_eq!(resources[0].labels.get("tier").map(String::as_str), Some("1"));

        assert_eq!(
            resources[1].identity,
            ResourceIdentity::new("HorizontalPodAutoscaler", "v2beta2", "autoscaling")
        );
        assert_eq!(resources[1].namespace, None);
        assert_eq!(resources[1].source, file());
    }

    #[test]
    fn test_json_document() {
        let content = r#"{"apiVersion":"extensions/v1beta1","kind":"Ingress","metadata":{"name":"site","namespace":"web"}}"#;
        let resources = parse_documents(content, &Source::Cluster).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].identity.group, "extensions");
        assert_eq!(resources[0].name, "site");
    }

    #[test]
    fn test_list_items_expanded() {
        let content = r#"
apiVersion: v1
kind: List
items:
  - apiVersion: batch/v1beta1
    kind: CronJob
    metadata:
      name: nightly
  - apiVersion: policy/v1beta1
    kind: PodDisruptionBudget
    metadata:
      name: pdb
"#;
        let resources = parse_documents(content, &Source::Stdin).unwrap();
        let kinds: Vec<_> = resources.iter().map(|r| r.identity.kind.as_str()).collect();
        assert_eq!(kinds, ["CronJob", "PodDisruptionBudget"]);
    }

    #[test]
    fn test_documents_without_type_meta_skipped() {
        let content = "foo: bar\n---\nkind: Service\n---\napiVersion: v1\nkind: Service\n";
        let resources = parse_documents(content, &Source::Stdin).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_documents("", &Source::Stdin).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_yaml_reports_source() {
        let err = parse_documents("kind: [unclosed", &file()).unwrap_err();
        match err {
            CoreError::Manifest { source_id, .. } => assert_eq!(source_id, "file:manifests/app.yaml"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
