//! API lifecycle rules
//!
//! A [`RuleSet`] is built once at startup from two sources:
//! - **Curated rules**: lifecycle data for Kubernetes built-in APIs, embedded
//!   in the binary (see [`curated`])
//! - **Additional kinds**: `Kind.version.group` strings supplied by the user,
//!   reported whenever they are seen (see [`additional`])
//!
//! After construction the set is never mutated, so it can be shared between
//! concurrent collectors behind an `Arc` without locking.

pub mod additional;
pub mod curated;

pub use additional::parse_additional_kind;
pub use curated::{curated_rules, parse_curated};

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};
use crate::identity::ResourceIdentity;
use crate::version::Version;

/// Lifecycle of one API resource identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleRule {
    pub identity: ResourceIdentity,
    pub introduced: Option<Version>,
    pub deprecated: Option<Version>,
    pub removed: Option<Version>,
    pub replacement: Option<ResourceIdentity>,
    /// Report regardless of target version (user-supplied additional kinds)
    pub always_report: bool,
}

impl LifecycleRule {
    /// A rule with no lifecycle boundaries; it never fires until one is set
    pub fn new(identity: ResourceIdentity) -> Self {
        Self {
            identity,
            introduced: None,
            deprecated: None,
            removed: None,
            replacement: None,
            always_report: false,
        }
    }

    /// A rule for a user-supplied additional kind
    pub fn additional(identity: ResourceIdentity) -> Self {
        Self {
            always_report: true,
            ..Self::new(identity)
        }
    }

    pub fn introduced_in(mut self, version: Version) -> Self {
        self.introduced = Some(version);
        self
    }

    pub fn deprecated_in(mut self, version: Version) -> Self {
        self.deprecated = Some(version);
        self
    }

    pub fn removed_in(mut self, version: Version) -> Self {
        self.removed = Some(version);
        self
    }

    pub fn replaced_by(mut self, identity: ResourceIdentity) -> Self {
        self.replacement = Some(identity);
        self
    }

    /// True if the rule carries no boundary and is not always reported
    pub fn is_inert(&self) -> bool {
        !self.always_report && self.deprecated.is_none() && self.removed.is_none()
    }

    /// Version from which the identity is of interest
    pub fn since(&self) -> Option<&Version> {
        self.deprecated.as_ref().or(self.removed.as_ref())
    }

    /// Human-readable rule group, used to section reports
    pub fn label(&self) -> String {
        if self.always_report {
            "Additional resources".to_string()
        } else if let Some(removed) = &self.removed {
            format!("Deprecated APIs removed in {}", removed.release_line())
        } else {
            "Deprecated APIs".to_string()
        }
    }

    fn validate(&self) -> Result<()> {
        if let (Some(deprecated), Some(removed)) = (&self.deprecated, &self.removed) {
            if deprecated > removed {
                return Err(CoreError::InvalidLifecycle {
                    identity: self.identity.to_string(),
                    deprecated: deprecated.to_string(),
                    removed: removed.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Immutable catalog of lifecycle rules keyed by identity
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: BTreeMap<ResourceIdentity, LifecycleRule>,
}

impl RuleSet {
    /// Build from curated rules plus `Kind.version.group` additional kinds
    ///
    /// Fails on a malformed additional kind, on any identity appearing twice,
    /// or on a rule deprecated after its removal.
    pub fn new(curated: Vec<LifecycleRule>, additional: &[String]) -> Result<Self> {
        let mut rules = BTreeMap::new();

        for rule in curated {
            rule.validate()?;
            insert_unique(&mut rules, rule)?;
        }

        for kind in additional {
            let identity = parse_additional_kind(kind)?;
            insert_unique(&mut rules, LifecycleRule::additional(identity))?;
        }

        tracing::debug!(
            rules = rules.len(),
            additional = additional.len(),
            "built rule set"
        );

        Ok(Self { rules })
    }

    /// Build from the embedded curated data
    pub fn builtin(additional: &[String]) -> Result<Self> {
        Self::new(curated_rules()?, additional)
    }

    /// Exact-match lookup on the identity triple
    pub fn lookup(&self, identity: &ResourceIdentity) -> Option<&LifecycleRule> {
        self.rules.get(identity)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in identity order
    pub fn iter(&self) -> impl Iterator<Item = &LifecycleRule> {
        self.rules.values()
    }

    /// Newest deprecation or removal boundary across all rules
    ///
    /// Judging against it reports every known deprecation, which is the
    /// fallback when no target version can be determined.
    pub fn latest_boundary(&self) -> Option<&Version> {
        self.rules
            .values()
            .flat_map(|rule| [rule.deprecated.as_ref(), rule.removed.as_ref()])
            .flatten()
            .max()
    }
}

fn insert_unique(
    rules: &mut BTreeMap<ResourceIdentity, LifecycleRule>,
    rule: LifecycleRule,
) -> Result<()> {
    if rules.contains_key(&rule.identity) {
        return Err(CoreError::DuplicateRule {
            identity: rule.identity.to_string(),
        });
    }
    rules.insert(rule.identity.clone(), rule);
    Ok(())
}
