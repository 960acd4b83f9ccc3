//! Curated lifecycle data for Kubernetes built-in APIs
//!
//! The data lives in `rules/deprecations.yaml` and is embedded at compile
//! time, so the binary carries its rule set with it.

use serde::Deserialize;

use super::LifecycleRule;
use crate::error::{CoreError, Result};
use crate::identity::ResourceIdentity;
use crate::version::Version;

const CURATED_RULES: &str = include_str!("../../rules/deprecations.yaml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CuratedFile {
    rules: Vec<CuratedEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CuratedEntry {
    kind: String,
    #[serde(default)]
    group: String,
    version: String,
    #[serde(default)]
    introduced: Option<Version>,
    #[serde(default)]
    deprecated: Option<Version>,
    #[serde(default)]
    removed: Option<Version>,
    #[serde(default)]
    replacement: Option<String>,
}

impl CuratedEntry {
    fn into_rule(self) -> Result<LifecycleRule> {
        let replacement = self
            .replacement
            .as_deref()
            .map(parse_replacement)
            .transpose()?;

        Ok(LifecycleRule {
            identity: ResourceIdentity::new(self.kind, self.version, self.group),
            introduced: self.introduced,
            deprecated: self.deprecated,
            removed: self.removed,
            replacement,
            always_report: false,
        })
    }
}

/// `Kind.version[.group]`; unlike additional kinds the group may be a single
/// segment or absent (core group)
fn parse_replacement(input: &str) -> Result<ResourceIdentity> {
    let mut parts = input.splitn(3, '.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(kind), Some(version), group) if !kind.is_empty() && !version.is_empty() => {
            Ok(ResourceIdentity::new(kind, version, group.unwrap_or("")))
        }
        _ => Err(CoreError::CuratedRules {
            message: format!("invalid replacement '{}'", input),
        }),
    }
}

/// Parse curated rules from YAML
pub fn parse_curated(content: &str) -> Result<Vec<LifecycleRule>> {
    let file: CuratedFile = serde_yaml::from_str(content).map_err(|e| CoreError::CuratedRules {
        message: e.to_string(),
    })?;

    file.rules.into_iter().map(CuratedEntry::into_rule).collect()
}

/// The curated rules embedded in this build
pub fn curated_rules() -> Result<Vec<LifecycleRule>> {
    parse_curated(CURATED_RULES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    #[test]
    fn test_embedded_rules_are_consistent() {
        let rules = curated_rules().unwrap();
        assert!(rules.len() > 40);
        // RuleSet::new validates duplicates and boundary order
        RuleSet::new(rules, &[]).unwrap();
    }

    #[test]
    fn test_every_embedded_rule_fires() {
        for rule in curated_rules().unwrap() {
            assert!(!rule.is_inert(), "{} has no boundaries", rule.identity);
        }
    }

    #[test]
    fn test_hpa_v2beta2_entry() {
        let rules = curated_rules().unwrap();
        let hpa = rules
            .iter()
            .find(|r| r.identity == ResourceIdentity::new("HorizontalPodAutoscaler", "v2beta2", "autoscaling"))
            .unwrap();

        assert_eq!(hpa.removed, Some(Version::new(1, 26, 0)));
        assert_eq!(hpa.deprecated, Some(Version::new(1, 23, 0)));
        assert_eq!(
            hpa.replacement,
            Some(ResourceIdentity::new("HorizontalPodAutoscaler", "v2", "autoscaling"))
        );
    }

    #[test]
    fn test_core_group_entry() {
        let rules = curated_rules().unwrap();
        let cs = rules
            .iter()
            .find(|r| r.identity.kind == "ComponentStatus")
            .unwrap();
        assert_eq!(cs.identity.group, "");
        assert!(cs.removed.is_none());
    }

    #[test]
    fn test_parse_curated_custom() {
        let yaml = r#"
rules:
  - kind: Widget
    group: example.com
    version: v1alpha1
    deprecated: v1.20.0
    replacement: Widget.v1.example.com
"#;
        let rules = parse_curated(yaml).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].deprecated, Some(Version::new(1, 20, 0)));
        assert_eq!(rules[0].replacement.as_ref().unwrap().group, "example.com");
    }

    #[test]
    fn test_parse_curated_rejects_bad_version() {
        let yaml = "rules:\n  - kind: Widget\n    version: v1\n    removed: soon\n";
        let err = parse_curated(yaml).unwrap_err();
        assert!(matches!(err, CoreError::CuratedRules { .. }));
    }

    #[test]
    fn test_parse_replacement() {
        assert_eq!(parse_replacement("Pod.v1").unwrap(), ResourceIdentity::new("Pod", "v1", ""));
        assert_eq!(
            parse_replacement("Lease.v1.coordination.k8s.io").unwrap(),
            ResourceIdentity::new("Lease", "v1", "coordination.k8s.io")
        );
        assert!(parse_replacement("Pod").is_err());
    }
}
