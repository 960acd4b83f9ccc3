//! Finding aggregation
//!
//! Collectors feed findings into one shared [`Aggregator`]. It keeps only
//! actionable findings, collapses duplicates observed through overlapping
//! discovery paths, and hands back a report in a stable order so that
//! machine-readable output can be diffed between runs.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::identity::ResourceIdentity;
use crate::judge::{Finding, Verdict};
use crate::version::ApiVersion;

/// Deduplication key: resource identity, object, and discovery source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FindingKey {
    pub identity: ResourceIdentity,
    pub namespace: Option<String>,
    pub name: String,
    pub source: String,
}

impl FindingKey {
    pub fn of(finding: &Finding) -> Self {
        let resource = &finding.resource;
        Self {
            identity: resource.identity.clone(),
            namespace: resource.namespace.clone(),
            name: resource.name.clone(),
            source: resource.source.id(),
        }
    }
}

/// Thread-safe collector of findings
///
/// `add` may be called from many tasks at once. `report` should be called
/// once all producers are done; findings added afterwards are not part of a
/// report already taken.
#[derive(Debug, Default)]
pub struct Aggregator {
    findings: Mutex<HashMap<FindingKey, Finding>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding; `Ok` verdicts and repeats of a known key are dropped
    ///
    /// Returns whether the finding was retained.
    pub fn add(&self, finding: Finding) -> bool {
        if finding.verdict.is_ok() {
            return false;
        }

        let key = FindingKey::of(&finding);
        let mut findings = self.findings.lock().unwrap_or_else(PoisonError::into_inner);
        if findings.contains_key(&key) {
            tracing::trace!(identity = %key.identity, name = %key.name, source = %key.source, "duplicate finding dropped");
            return false;
        }
        findings.insert(key, finding);
        true
    }

    pub fn len(&self) -> usize {
        self.findings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Findings in report order
    pub fn report(&self) -> Vec<Finding> {
        let findings = self.findings.lock().unwrap_or_else(PoisonError::into_inner);
        sorted(findings.values().cloned().collect())
    }

    /// Consume the aggregator and return its findings in report order
    pub fn into_report(self) -> Vec<Finding> {
        let findings = self
            .findings
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        sorted(findings.into_values().collect())
    }
}

fn sorted(mut findings: Vec<Finding>) -> Vec<Finding> {
    findings.sort_by(report_order);
    findings
}

/// Removed before Deprecated, then Kind, then source; the remaining keys
/// only make the order total
fn report_order(a: &Finding, b: &Finding) -> Ordering {
    let (ra, rb) = (&a.resource, &b.resource);

    b.verdict
        .cmp(&a.verdict)
        .then_with(|| ra.identity.kind.cmp(&rb.identity.kind))
        .then_with(|| ra.source.id().cmp(&rb.source.id()))
        .then_with(|| {
            ApiVersion::parse(&ra.identity.api_version)
                .cmp(&ApiVersion::parse(&rb.identity.api_version))
        })
        .then_with(|| ra.identity.group.cmp(&rb.identity.group))
        .then_with(|| ra.namespace.cmp(&rb.namespace))
        .then_with(|| ra.name.cmp(&rb.name))
}

/// Count findings per verdict, `(removed, deprecated)`
pub fn summarize(findings: &[Finding]) -> (usize, usize) {
    let removed = findings
        .iter()
        .filter(|f| f.verdict == Verdict::Removed)
        .count();
    let deprecated = findings
        .iter()
        .filter(|f| f.verdict == Verdict::Deprecated)
        .count();
    (removed, deprecated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{DiscoveredResource, Source};
    use std::sync::Arc;

    fn finding(kind: &str, version: &str, name: &str, source: Source, verdict: Verdict) -> Finding {
        Finding {
            resource: DiscoveredResource::new(
                ResourceIdentity::new(kind, version, "example.io"),
                name,
                source,
            ),
            rule: None,
            verdict,
        }
    }

    fn file(path: &str) -> Source {
        Source::File {
            path: path.to_string(),
        }
    }

    #[test]
    fn test_ok_findings_discarded() {
        let aggregator = Aggregator::new();
        assert!(!aggregator.add(finding("Pod", "v1", "a", Source::Stdin, Verdict::Ok)));
        assert!(aggregator.is_empty());
        assert!(aggregator.report().is_empty());
    }

    #[test]
    fn test_duplicate_collapses() {
        let aggregator = Aggregator::new();
        let f = finding("Ingress", "v1beta1", "web", Source::Cluster, Verdict::Removed);

        assert!(aggregator.add(f.clone()));
        assert!(!aggregator.add(f));
        assert_eq!(aggregator.report().len(), 1);
    }

    #[test]
    fn test_same_resource_different_sources_kept() {
        let aggregator = Aggregator::new();
        aggregator.add(finding("Ingress", "v1beta1", "web", file("a.yaml"), Verdict::Removed));
        aggregator.add(finding("Ingress", "v1beta1", "web", Source::Stdin, Verdict::Removed));
        assert_eq!(aggregator.len(), 2);
    }

    #[test]
    fn test_report_order() {
        let aggregator = Aggregator::new();
        aggregator.add(finding("Ingress", "v1beta1", "a", file("b.yaml"), Verdict::Deprecated));
        aggregator.add(finding("CronJob", "v1beta1", "b", file("b.yaml"), Verdict::Deprecated));
        aggregator.add(finding("Ingress", "v1beta1", "c", file("a.yaml"), Verdict::Removed));
        aggregator.add(finding("Deployment", "v1beta2", "d", file("z.yaml"), Verdict::Removed));
        aggregator.add(finding("Deployment", "v1beta1", "e", file("z.yaml"), Verdict::Removed));

        let names: Vec<_> = aggregator
            .report()
            .into_iter()
            .map(|f| f.resource.name)
            .collect();
        assert_eq!(names, ["e", "d", "c", "b", "a"]);
    }

    #[test]
    fn test_report_is_stable_across_insertion_orders() {
        let findings = vec![
            finding("Ingress", "v1beta1", "a", file("x.yaml"), Verdict::Deprecated),
            finding("Ingress", "v1beta1", "b", file("x.yaml"), Verdict::Deprecated),
            finding("Lease", "v1beta1", "c", Source::Cluster, Verdict::Removed),
            finding("Lease", "v1beta1", "c", Source::Stdin, Verdict::Removed),
        ];

        let forward = Aggregator::new();
        findings.iter().cloned().for_each(|f| {
            forward.add(f);
        });
        let backward = Aggregator::new();
        findings.iter().rev().cloned().for_each(|f| {
            backward.add(f);
        });

        assert_eq!(forward.report(), backward.into_report());
    }

    #[test]
    fn test_concurrent_add() {
        let aggregator = Arc::new(Aggregator::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let aggregator = Arc::clone(&aggregator);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        // Every worker submits the same 50 findings plus one of its own
                        aggregator.add(finding("Ingress", "v1beta1", &i.to_string(), Source::Cluster, Verdict::Removed));
                    }
                    aggregator.add(finding("Lease", "v1beta1", &format!("w{worker}"), Source::Cluster, Verdict::Deprecated));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let report = Arc::try_unwrap(aggregator).unwrap().into_report();
        assert_eq!(report.len(), 58);
        assert_eq!(summarize(&report), (50, 8));
    }
}
