//! CSV output
//!
//! Labels do not fit a flat row, so they are written as a single
//! `key=value,...` column, and only when requested.

use std::io::Write;

use super::FindingRecord;
use crate::error::Result;

const HEADERS: [&str; 8] = [
    "Name",
    "Namespace",
    "Kind",
    "ApiVersion",
    "RuleSet",
    "ReplaceWith",
    "Since",
    "Source",
];

pub fn write<W: Write>(records: &[FindingRecord], with_labels: bool, w: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(w);

    let mut headers = HEADERS.to_vec();
    if with_labels {
        headers.push("Labels");
    }
    writer.write_record(&headers)?;

    for record in records {
        let mut row = vec![
            record.name.clone(),
            record.namespace.clone(),
            record.kind.clone(),
            record.api_version.clone(),
            record.rule_set.clone(),
            record.replace_with.clone(),
            record.since.clone(),
            record.source.clone(),
        ];
        if with_labels {
            row.push(record.labels_column());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    fn render(with_labels: bool) -> String {
        let records: Vec<_> = fixtures::findings()
            .iter()
            .map(|f| FindingRecord::from_finding(f, with_labels))
            .collect();
        let mut out = Vec::new();
        write(&records, with_labels, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_csv_rows() {
        let out = render(false);
        let mut lines = out.lines();

        assert_eq!(
            lines.next(),
            Some("Name,Namespace,Kind,ApiVersion,RuleSet,ReplaceWith,Since,Source")
        );
        assert_eq!(
            lines.next(),
            Some(
                "site,prod,Ingress,extensions/v1beta1,Deprecated APIs removed in 1.22,networking.k8s.io/v1,1.14.0,file:ingress.yaml"
            )
        );
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn test_labels_column() {
        let out = render(true);
        assert!(out.lines().next().unwrap().ends_with(",Labels"));
        assert!(out.contains(",app=web\n"));
    }

    #[test]
    fn test_header_only_when_empty() {
        let mut out = Vec::new();
        write(&[], false, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
