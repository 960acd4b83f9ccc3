//! Deprecation judge
//!
//! [`evaluate`] classifies one resource identity against a target Kubernetes
//! version. It only reads the [`RuleSet`], so any number of collectors can
//! call it concurrently.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::{DiscoveredResource, ResourceIdentity};
use crate::rules::{LifecycleRule, RuleSet};
use crate::version::Version;

/// Classification of a resource against a target version
///
/// Variants are declared in increasing severity, so `Ord` ranks `Removed`
/// highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Ok,
    Deprecated,
    Removed,
}

impl Verdict {
    pub fn is_ok(&self) -> bool {
        matches!(self, Verdict::Ok)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Ok => "OK",
            Verdict::Deprecated => "Deprecated",
            Verdict::Removed => "Removed",
        };
        f.write_str(s)
    }
}

/// Judge an identity against `target`
///
/// Boundaries are inclusive: a target equal to the removal version is
/// `Removed`. Identities without a rule are `Ok`.
pub fn evaluate(identity: &ResourceIdentity, target: &Version, rules: &RuleSet) -> Verdict {
    match rules.lookup(identity) {
        Some(rule) => verdict_for(rule, target),
        None => Verdict::Ok,
    }
}

fn verdict_for(rule: &LifecycleRule, target: &Version) -> Verdict {
    if rule.always_report {
        return Verdict::Deprecated;
    }
    if rule.removed.as_ref().is_some_and(|removed| target >= removed) {
        return Verdict::Removed;
    }
    if rule.deprecated.as_ref().is_some_and(|deprecated| target >= deprecated) {
        return Verdict::Deprecated;
    }
    Verdict::Ok
}

/// The outcome of judging one discovered resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub resource: DiscoveredResource,
    pub rule: Option<LifecycleRule>,
    pub verdict: Verdict,
}

/// A rule set bound to a resolved target version
#[derive(Debug, Clone, Copy)]
pub struct Judge<'a> {
    rules: &'a RuleSet,
    target: &'a Version,
}

impl<'a> Judge<'a> {
    pub fn new(rules: &'a RuleSet, target: &'a Version) -> Self {
        Self { rules, target }
    }

    /// Judge a resource and attach the matching rule
    pub fn assess(&self, resource: DiscoveredResource) -> Finding {
        let rule = self.rules.lookup(&resource.identity);
        let verdict = rule.map_or(Verdict::Ok, |rule| verdict_for(rule, self.target));

        if !verdict.is_ok() {
            tracing::debug!(
                identity = %resource.identity,
                name = %resource.name,
                %verdict,
                "resource flagged"
            );
        }

        Finding {
            rule: rule.cloned(),
            resource,
            verdict,
        }
    }
}
