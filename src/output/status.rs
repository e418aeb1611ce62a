//! Text rendering of a namespace status report.

use std::fmt::Write as _;

use colored::Colorize;
use tabled::{Table, Tabled};

use crate::output::table::apply_table_style;
use crate::status::StatusReport;

const LABEL_WIDTH: usize = 24;

#[derive(Tabled)]
struct ImageRow {
    #[tabled(rename = "COUNT")]
    count: usize,
    #[tabled(rename = "IMAGE")]
    image: String,
}

#[derive(Tabled)]
struct LabelRow {
    #[tabled(rename = "COUNT")]
    count: usize,
    #[tabled(rename = "LABEL")]
    label: String,
}

/// Render the report for `namespace`.
///
/// Images are listed by count, then name. Only labels shared by more than
/// one deployment are shown.
pub fn render_status(namespace: &str, report: &StatusReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", "Namespace:".bold(), namespace);
    let _ = writeln!(out);
    field(&mut out, "Operator Start:", &report.operator_start_time);
    field(&mut out, "Databases:", &report.num_databases.to_string());
    field(&mut out, "Backups:", &report.num_backups.to_string());
    field(&mut out, "Claims:", &report.num_claims.to_string());
    field(&mut out, "Total Volume Size:", &report.volume_cap);

    let mut images: Vec<(&String, &usize)> = report.db_tags.iter().collect();
    images.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    section(&mut out, "Database Images:");
    if images.is_empty() {
        let _ = writeln!(out, "  none");
    } else {
        let rows: Vec<ImageRow> = images
            .into_iter()
            .map(|(image, count)| ImageRow {
                count: *count,
                image: image.clone(),
            })
            .collect();
        push_table(&mut out, Table::new(&rows));
    }

    section(&mut out, "Databases Not Ready:");
    if report.not_ready.is_empty() {
        let _ = writeln!(out, "  none");
    } else {
        for name in &report.not_ready {
            let _ = writeln!(out, "  {}", name.red());
        }
    }

    section(&mut out, "Nodes:");
    if report.nodes.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for node in &report.nodes {
        let status = if node.status == "Ready" {
            node.status.green().to_string()
        } else {
            node.status.yellow().to_string()
        };
        let _ = writeln!(out, "  {}", node.name.bold());
        let _ = writeln!(out, "    Status: {}", status);
        let _ = writeln!(out, "    Labels:");
        for (key, value) in &node.labels {
            let _ = writeln!(out, "      {}={}", key, value);
        }
    }

    let shared: Vec<LabelRow> = report
        .labels
        .iter()
        .filter(|kv| kv.value > 1)
        .map(|kv| LabelRow {
            count: kv.value,
            label: kv.key.clone(),
        })
        .collect();
    section(&mut out, "Labels (count > 1):");
    if shared.is_empty() {
        let _ = writeln!(out, "  none");
    } else {
        push_table(&mut out, Table::new(&shared));
    }

    out
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{:<width$}{}", label, value, width = LABEL_WIDTH);
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title.bold());
}

fn push_table(out: &mut String, mut table: Table) {
    apply_table_style(&mut table);
    for line in table.to_string().lines() {
        let _ = writeln!(out, "  {}", line.trim_end());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::status::{KeyValue, NodeInfo};

    fn sample() -> StatusReport {
        StatusReport {
            operator_start_time: "2024-05-01T10:00:00Z".to_string(),
            num_backups: 2,
            num_claims: 2,
            num_databases: 2,
            volume_cap: "8Gi".to_string(),
            db_tags: BTreeMap::from([
                ("crunchy-postgres:13".to_string(), 1),
                ("crunchy-pgbouncer:1".to_string(), 3),
            ]),
            not_ready: vec!["hippo-6d4f".to_string()],
            nodes: vec![NodeInfo {
                name: "worker-1".to_string(),
                status: "Ready".to_string(),
                labels: BTreeMap::from([("zone".to_string(), "a".to_string())]),
            }],
            labels: vec![
                KeyValue::new("vendor=crunchydata", 3),
                KeyValue::new("pg-cluster=hippo", 1),
            ],
        }
    }

    #[test]
    fn test_render_status_fields() {
        let text = render_status("pgo", &sample());
        assert!(text.contains("Operator Start:"));
        assert!(text.contains("2024-05-01T10:00:00Z"));
        assert!(text.contains("8Gi"));
        assert!(text.contains("hippo-6d4f"));
        assert!(text.contains("worker-1"));
        assert!(text.contains("zone=a"));
    }

    #[test]
    fn test_images_ordered_by_count() {
        let text = render_status("pgo", &sample());
        let bouncer = text.find("crunchy-pgbouncer:1").unwrap();
        let postgres = text.find("crunchy-postgres:13").unwrap();
        assert!(bouncer < postgres);
    }

    #[test]
    fn test_only_shared_labels_listed() {
        let text = render_status("pgo", &sample());
        assert!(text.contains("vendor=crunchydata"));
        assert!(!text.contains("pg-cluster=hippo"));
    }

    #[test]
    fn test_empty_report() {
        let text = render_status("pgo", &StatusReport::default());
        assert!(text.contains("Database Images:"));
        assert!(text.matches("none").count() >= 4);
    }
}
