//! Concurrent scan across collectors
//!
//! Each collector runs as its own task and judges what it finds straight into
//! a shared [`Aggregator`]. The report is taken only after every task has
//! been joined. A failing collector contributes nothing but does not stop the
//! others; its error is returned alongside the findings.

use kubesunset_core::{Aggregator, Finding, Judge, RuleSet, Version};
use std::sync::Arc;

use crate::collector::Collector;
use crate::error::CollectError;

/// A collector that failed during the scan
#[derive(Debug)]
pub struct CollectorFailure {
    pub collector: String,
    pub error: CollectError,
}

/// Findings plus any collector failures
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Findings in report order
    pub findings: Vec<Finding>,
    pub failures: Vec<CollectorFailure>,
}

impl ScanOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run all collectors concurrently and judge their resources against `target`
pub async fn scan(
    collectors: Vec<Arc<dyn Collector>>,
    rules: Arc<RuleSet>,
    target: Version,
) -> ScanOutcome {
    let aggregator = Arc::new(Aggregator::new());
    let target = Arc::new(target);

    let handles: Vec<_> = collectors
        .into_iter()
        .map(|collector| {
            let aggregator = Arc::clone(&aggregator);
            let rules = Arc::clone(&rules);
            let target = Arc::clone(&target);
            let name = collector.name().to_string();

            let handle = tokio::spawn(async move {
                let resources = collector.collect().await?;
                let judge = Judge::new(&rules, &target);

                let mut retained = 0;
                let total = resources.len();
                for resource in resources {
                    if aggregator.add(judge.assess(resource)) {
                        retained += 1;
                    }
                }
                tracing::debug!(
                    collector = collector.name(),
                    total,
                    retained,
                    "judged resources"
                );
                Ok::<_, CollectError>(())
            });
            (name, handle)
        })
        .collect();

    let mut failures = Vec::new();
    for (collector, handle) in handles {
        let error = match handle.await {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => e,
            Err(e) => CollectError::from(e),
        };
        tracing::error!(%collector, "collector failed: {}", error);
        failures.push(CollectorFailure { collector, error });
    }

    // All tasks are joined, so no other handle to the aggregator remains
    let findings = match Arc::try_unwrap(aggregator) {
        Ok(aggregator) => aggregator.into_report(),
        Err(shared) => shared.report(),
    };

    ScanOutcome { findings, failures }
}
