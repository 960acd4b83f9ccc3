//! One scan from validated configuration to written report

use console::style;
use kube::Client;
use kubesunset_core::{RuleSet, summarize};
use kubesunset_kube::{ClusterCollector, Collector, FileCollector, HelmCollector, connect, scan};
use std::sync::Arc;

use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::exit_codes;
use crate::output;
use crate::target;

/// Run the scan and return the process exit code
pub async fn run(config: Config) -> Result<i32> {
    // Rule errors are fatal before any collector runs
    let rules = Arc::new(RuleSet::builtin(&config.additional_kinds)?);

    let mut collectors: Vec<Arc<dyn Collector>> = Vec::new();
    let mut unavailable = 0;

    if !config.filenames.is_empty() {
        collectors.push(Arc::new(FileCollector::new(config.filenames.clone())));
    }

    let client = if config.needs_cluster() {
        match connect(config.kubeconfig.as_deref(), config.context.as_deref()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::error!("failed to connect to cluster: {}", e);
                unavailable += usize::from(config.cluster) + usize::from(config.helm3);
                None
            }
        }
    } else {
        None
    };

    if let Some(client) = &client {
        add_cluster_collectors(&config, client, &rules, &mut collectors);
    }

    let cluster_for_target = client.as_ref().filter(|_| config.cluster);
    let (target, from) =
        target::resolve(config.target_version.as_ref(), cluster_for_target, &rules).await?;
    tracing::info!(target_version = %target, source = ?from, "judging against target version");

    let enabled = collectors.len() + unavailable;
    let outcome = scan(collectors, Arc::clone(&rules), target).await;

    if enabled > 0 && unavailable + outcome.failures.len() == enabled {
        return Err(CliError::collection_with_help(
            "every collector failed",
            "Check cluster access, or disable collectors with --cluster=false --helm3=false",
        ));
    }

    let (removed, deprecated) = summarize(&outcome.findings);
    tracing::info!(
        removed,
        deprecated,
        failed_collectors = outcome.failures.len() + unavailable,
        "scan finished"
    );

    let color = config.output == OutputFormat::Text
        && config.output_file.is_none()
        && console::colors_enabled();
    let writer = output::open(config.output_file.as_deref())?;
    output::write_report(
        config.output,
        &outcome.findings,
        config.labels,
        color,
        writer,
    )?;

    if let Some(path) = &config.output_file {
        eprintln!(
            "{} Report written to {}",
            style("✓").green(),
            path.display()
        );
    }

    if config.exit_error && !outcome.findings.is_empty() {
        Ok(exit_codes::ISSUES_FOUND)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

fn add_cluster_collectors(
    config: &Config,
    client: &Client,
    rules: &RuleSet,
    collectors: &mut Vec<Arc<dyn Collector>>,
) {
    if config.cluster {
        let identities = rules.iter().map(|rule| rule.identity.clone());
        collectors.push(Arc::new(
            ClusterCollector::new(client.clone(), identities)
                .with_additional_annotations(&config.additional_annotations),
        ));
    }
    if config.helm3 {
        collectors.push(Arc::new(HelmCollector::new(client.clone())));
    }
}
