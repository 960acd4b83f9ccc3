//! Helm v3 release collector
//!
//! Helm v3 stores each release revision in a Secret labelled `owner=helm`.
//! The `release` key holds the release record as base64 text of (usually
//! gzip-compressed) JSON, on top of the base64 every Secret value already
//! carries on the wire. Only the deployed revision of each release is read.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use flate2::read::GzDecoder;
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use kube::api::{Api, ListParams};
use kubesunset_core::{DiscoveredResource, Source, parse_documents};
use serde::Deserialize;
use std::io::Read;

use crate::collector::Collector;
use crate::error::{CollectError, Result};

/// Label selector for deployed Helm v3 release Secrets
pub const HELM_RELEASE_SELECTOR: &str = "owner=helm,status=deployed";

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b, 0x08];

/// The parts of a Helm release record needed for judging
#[derive(Debug, Clone, Deserialize)]
pub struct HelmRelease {
    pub name: String,
    pub namespace: String,
    pub version: u32,
    #[serde(default)]
    pub manifest: String,
}

impl HelmRelease {
    /// Resources in the release manifest
    ///
    /// Objects without an explicit namespace are attributed to the release
    /// namespace, where Helm installs them.
    pub fn resources(&self) -> Result<Vec<DiscoveredResource>> {
        let source = Source::Helm {
            release: self.name.clone(),
            namespace: self.namespace.clone(),
            revision: self.version,
        };

        let mut resources = parse_documents(&self.manifest, &source)?;
        for resource in &mut resources {
            if resource.namespace.is_none() {
                resource.namespace = Some(self.namespace.clone());
            }
        }
        Ok(resources)
    }
}

/// Decode the `release` value of a Helm v3 Secret
pub fn decode_release(secret_name: &str, data: &[u8]) -> Result<HelmRelease> {
    let fail = |message: String| CollectError::HelmRelease {
        name: secret_name.to_string(),
        message,
    };

    let raw = BASE64
        .decode(data)
        .map_err(|e| fail(format!("invalid base64: {}", e)))?;

    let json = if raw.starts_with(GZIP_MAGIC) {
        let mut decoded = Vec::new();
        GzDecoder::new(raw.as_slice())
            .read_to_end(&mut decoded)
            .map_err(|e| fail(format!("invalid gzip: {}", e)))?;
        decoded
    } else {
        raw
    };

    serde_json::from_slice(&json).map_err(|e| fail(format!("invalid release JSON: {}", e)))
}

/// Collects resources from deployed Helm v3 releases
pub struct HelmCollector {
    client: Client,
}

impl HelmCollector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn release_from_secret(secret: &Secret) -> Result<HelmRelease> {
        let name = secret.metadata.name.as_deref().unwrap_or_default();
        let data = secret
            .data
            .as_ref()
            .and_then(|d| d.get("release"))
            .ok_or_else(|| CollectError::HelmRelease {
                name: name.to_string(),
                message: "Secret missing 'release' data".to_string(),
            })?;

        decode_release(name, &data.0)
    }
}

#[async_trait]
impl Collector for HelmCollector {
    fn name(&self) -> &str {
        "helm3"
    }

    async fn collect(&self) -> Result<Vec<DiscoveredResource>> {
        let api: Api<Secret> = Api::all(self.client.clone());
        let secrets = api
            .list(&ListParams::default().labels(HELM_RELEASE_SELECTOR))
            .await?;

        let mut resources = Vec::new();
        for secret in &secrets.items {
            let release = match Self::release_from_secret(secret) {
                Ok(release) => release,
                Err(e) => {
                    tracing::warn!("skipping Helm release: {}", e);
                    continue;
                }
            };

            match release.resources() {
                Ok(found) => {
                    tracing::debug!(
                        release = %release.name,
                        namespace = %release.namespace,
                        revision = release.version,
                        count = found.len(),
                        "read Helm release"
                    );
                    resources.extend(found);
                }
                Err(e) => tracing::warn!(release = %release.name, "skipping Helm release manifest: {}", e),
            }
        }

        tracing::info!(
            releases = secrets.items.len(),
            count = resources.len(),
            "helm3 collector finished"
        );
        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const RELEASE_JSON: &str = r#"{
        "name": "web",
        "namespace": "prod",
        "version": 4,
        "info": {"status": "deployed"},
        "manifest": "---\n# Source: web/templates/hpa.yaml\napiVersion: autoscaling/v2beta2\nkind: HorizontalPodAutoscaler\nmetadata:\n  name: web\n---\napiVersion: v1\nkind: Service\nmetadata:\n  name: web\n  namespace: shared\n"
    }"#;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_gzipped_release() {
        let encoded = BASE64.encode(gzip(RELEASE_JSON.as_bytes()));
        let release = decode_release("sh.helm.release.v1.web.v4", encoded.as_bytes()).unwrap();

        assert_eq!(release.name, "web");
        assert_eq!(release.namespace, "prod");
        assert_eq!(release.version, 4);
    }

    #[test]
    fn test_decode_plain_release() {
        let encoded = BASE64.encode(RELEASE_JSON);
        let release = decode_release("sh.helm.release.v1.web.v4", encoded.as_bytes()).unwrap();
        assert!(release.manifest.contains("HorizontalPodAutoscaler"));
    }

    #[test]
    fn test_decode_invalid() {
        let err = decode_release("broken", b"!!!not base64").unwrap_err();
        assert!(err.to_string().contains("invalid base64"));

        let encoded = BASE64.encode("not json");
        let err = decode_release("broken", encoded.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid release JSON"));
    }

    #[test]
    fn test_release_resources() {
        let release: HelmRelease = serde_json::from_str(RELEASE_JSON).unwrap();
        let resources = release.resources().unwrap();

        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].identity.kind, "HorizontalPodAutoscaler");
        assert_eq!(resources[0].namespace.as_deref(), Some("prod"));
        assert_eq!(resources[1].namespace.as_deref(), Some("shared"));
        assert_eq!(
            resources[0].source,
            Source::Helm {
                release: "web".to_string(),
                namespace: "prod".to_string(),
                revision: 4,
            }
        );
    }

    #[test]
    fn test_release_from_secret_missing_data() {
        let secret = Secret::default();
        let err = HelmCollector::release_from_secret(&secret).unwrap_err();
        assert!(err.to_string().contains("missing 'release'"));
    }
}
