use std::fmt::Write as _;

use colored::Colorize;
use tabled::{Table, Tabled};

use crate::client::types::ShowWorkflowDetail;
use crate::output::table::apply_table_style;

#[derive(Tabled)]
struct ParameterRow {
    #[tabled(rename = "PARAMETER")]
    parameter: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

/// Workflow parameters as a two-column table, sorted by parameter name.
pub fn render_workflow(detail: &ShowWorkflowDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "cluster:".bold(), detail.cluster_name);

    if detail.parameters.is_empty() {
        let _ = writeln!(out, "No workflow parameters found.");
        return out;
    }

    let rows: Vec<ParameterRow> = detail
        .parameters
        .iter()
        .map(|(parameter, value)| ParameterRow {
            parameter: parameter.clone(),
            value: value.clone(),
        })
        .collect();

    let mut table = Table::new(&rows);
    apply_table_style(&mut table);
    let _ = writeln!(out, "{}", table);
    out
}
