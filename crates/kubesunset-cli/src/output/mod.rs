//! Report printers
//!
//! Every printer consumes findings in report order and never re-sorts them.
//! JSON and CSV share [`FindingRecord`] so both formats carry the same fields.

mod delimited;
mod json;
mod text;

use kubesunset_core::Finding;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::OutputFormat;
use crate::error::{CliError, Result};

/// Placeholder for a cluster-scoped resource
pub const UNDEFINED_NAMESPACE: &str = "<undefined>";

/// Placeholder for a missing replacement or version
pub const NONE: &str = "<none>";

/// One report row, shared by the JSON and CSV printers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FindingRecord {
    pub name: String,
    pub namespace: String,
    pub kind: String,
    pub api_version: String,
    pub rule_set: String,
    pub replace_with: String,
    pub since: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

impl FindingRecord {
    pub fn from_finding(finding: &Finding, with_labels: bool) -> Self {
        let resource = &finding.resource;
        let rule = finding.rule.as_ref();

        Self {
            name: resource.name.clone(),
            namespace: resource
                .namespace
                .clone()
                .unwrap_or_else(|| UNDEFINED_NAMESPACE.to_string()),
            kind: resource.identity.kind.clone(),
            api_version: resource.identity.group_version(),
            rule_set: rule.map(|r| r.label()).unwrap_or_default(),
            replace_with: rule
                .and_then(|r| r.replacement.as_ref())
                .map(|id| id.group_version())
                .unwrap_or_else(|| NONE.to_string()),
            since: rule
                .and_then(|r| r.since())
                .map(|v| v.as_semver().to_string())
                .unwrap_or_else(|| NONE.to_string()),
            source: resource.source.id(),
            labels: with_labels.then(|| resource.labels.clone()),
        }
    }

    /// Labels as `key=value` pairs joined by commas
    pub fn labels_column(&self) -> String {
        self.labels
            .iter()
            .flatten()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Render `findings` in `format` to `writer`
pub fn write_report<W: Write>(
    format: OutputFormat,
    findings: &[Finding],
    with_labels: bool,
    color: bool,
    writer: W,
) -> Result<()> {
    let records: Vec<_> = findings
        .iter()
        .map(|f| FindingRecord::from_finding(f, with_labels))
        .collect();

    match format {
        OutputFormat::Text => text::write(&records, with_labels, color, writer),
        OutputFormat::Json => json::write(&records, writer),
        OutputFormat::Csv => delimited::write(&records, with_labels, writer),
    }
}

/// Open the report destination; `None` is standard output
pub fn open(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                CliError::output(format!("cannot create '{}': {}", path.display(), e))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use kubesunset_core::{DiscoveredResource, Judge, ResourceIdentity, RuleSet, Source, Version};
    use std::collections::BTreeMap;

    use super::*;

    /// A small judged report against 1.26
    pub fn findings() -> Vec<Finding> {
        let rules = RuleSet::builtin(&[]).unwrap();
        let target = Version::new(1, 26, 0);
        let judge = Judge::new(&rules, &target);

        let labels = BTreeMap::from([("app".to_string(), "web".to_string())]);
        let resources = [
            DiscoveredResource::new(
                ResourceIdentity::from_type_meta("Ingress", "extensions/v1beta1"),
                "site",
                Source::File {
                    path: "ingress.yaml".to_string(),
                },
            )
            .with_namespace("prod")
            .with_labels(labels),
            DiscoveredResource::new(
                ResourceIdentity::from_type_meta("PodSecurityPolicy", "policy/v1beta1"),
                "restricted",
                Source::Stdin,
            ),
        ];

        resources.into_iter().map(|r| judge.assess(r)).collect()
    }
}
