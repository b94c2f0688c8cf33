//! Text and JSON output for the CLI commands.

use arlonctl_core::cluster::Cluster;
use arlonctl_core::verify::VerifyReport;
use comfy_table::{Row, Table};

const EMPTY_CELL: &str = "-";

fn cell(value: &str) -> String {
    if value.is_empty() {
        EMPTY_CELL.to_string()
    } else {
        value.to_string()
    }
}

/// One row per cluster, kubectl-style (no borders).
pub fn cluster_table(clusters: &[Cluster]) -> String {
    let mut table = Table::new();
    table.set_header(Row::from([
        "NAME",
        "TYPE",
        "CLUSTERSPEC",
        "BASECLUSTER",
        "PROFILE",
        "SECRET",
    ]));
    for cluster in clusters {
        let base = cluster
            .base_cluster
            .as_ref()
            .map(|b| b.name.as_str())
            .unwrap_or("");
        table.add_row(Row::from([
            cell(&cluster.name),
            cluster.kind().as_str().to_string(),
            cell(&cluster.cluster_spec_name),
            cell(base),
            cell(&cluster.profile_name),
            cell(&cluster.secret_name),
        ]));
    }
    table.load_preset(comfy_table::presets::NOTHING);
    table.to_string()
}

pub fn cluster_json(clusters: &[Cluster]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(clusters)
}

pub const ALL_INSTALLED: &str = "All requirements are installed";
pub const PREREQUISITES_FAILED: &str =
    "The check for Arlon prerequisites failed. Please install the missing tool(s).";

/// One line per check, a blank line, then the verdict.
pub fn verify_report(report: &VerifyReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => out.push_str(&format!(
                "Successfully verified {} status\n",
                outcome.requirement
            )),
            Err(e) => out.push_str(&format!(
                "Error while verifying {} status: {}\n",
                outcome.requirement, e
            )),
        }
    }
    out.push('\n');
    out.push_str(if report.all_passed() {
        ALL_INSTALLED
    } else {
        PREREQUISITES_FAILED
    });
    out.push('\n');
    out
}
