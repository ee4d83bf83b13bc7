//! CLI presentation: text and json formatters per command.

use crate::bucket::SlotState;
use crate::catalog::BuilderCatalog;
use crate::error::TreewireError;
use crate::policy::PolicyRegistry;
use crate::resolver::ResolutionReport;
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, TreewireError> {
    serde_json::to_string_pretty(value).map_err(|e| TreewireError::OutputError(e.to_string()))
}

fn heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn state_cell(state: SlotState) -> Cell {
    let color = match state {
        SlotState::Succeeded => Color::Green,
        SlotState::Failed => Color::Red,
        SlotState::Unresolved => Color::Yellow,
    };
    Cell::new(state.as_str()).fg(color)
}

pub fn format_resolution_text(
    report: &ResolutionReport,
    changed: usize,
    written: Option<&Path>,
) -> String {
    let mut out = heading("Resolution");
    out.push_str(&format!(
        "\n  Succeeded: {}\n  Failed: {}\n  Unresolved: {}\n  Changed members: {}",
        report.summary.succeeded, report.summary.failed, report.summary.unresolved, changed
    ));
    if let Some(reason) = &report.summary.cancelled {
        out.push_str(&format!("\n  Cancelled: {}", reason));
    }
    for pass in &report.passes {
        out.push_str(&format!(
            "\n  Pass {} ({}): {} nodes, {} members, {} unresolved after",
            pass.phase,
            pass.pipeline,
            pass.walk.nodes_visited,
            pass.walk.members_visited,
            pass.unresolved_after
        ));
    }

    if report.slots.is_empty() {
        out.push_str("\n\nNo injected fields discovered.");
    } else {
        let mut table = Table::new();
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.set_header(vec!["Owner", "Slot", "Type", "Policy", "State", "Value"]);
        for slot in &report.slots {
            let policy = match &slot.tag {
                Some(tag) => format!("{} [{}]", slot.policy, tag),
                None => slot.policy.to_string(),
            };
            table.add_row(vec![
                Cell::new(&slot.owner),
                Cell::new(&slot.slot),
                Cell::new(&slot.declared_type),
                Cell::new(policy),
                state_cell(slot.state),
                Cell::new(slot.value.as_deref().unwrap_or("-")),
            ]);
        }
        out.push_str("\n\n");
        out.push_str(&table.to_string());
    }

    if let Some(path) = written {
        out.push_str(&format!("\n\nWrote resolved scene to {}", path.display()));
    }
    out
}

pub fn format_resolution_json(
    report: &ResolutionReport,
    changed: usize,
    written: Option<&Path>,
) -> Result<String, TreewireError> {
    let out = serde_json::json!({
        "summary": report.summary,
        "changed_members": changed,
        "passes": report.passes,
        "slots": report.slots,
        "written": written.map(|p| p.display().to_string()),
    });
    to_json(&out)
}

#[derive(Serialize)]
struct PolicyRow {
    id: &'static str,
    one_shot: bool,
}

fn policy_rows(policies: &PolicyRegistry) -> Vec<PolicyRow> {
    policies
        .iter()
        .map(|policy| PolicyRow {
            id: policy.id(),
            one_shot: policy.is_one_shot(),
        })
        .collect()
}

pub fn format_policies_text(policies: &PolicyRegistry) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Policy", "Mode"]);
    for row in policy_rows(policies) {
        let mode = if row.one_shot { "one-shot" } else { "traversal" };
        table.add_row(vec![row.id, mode]);
    }
    format!("{}\n{}", heading("Matching policies"), table)
}

pub fn format_policies_json(policies: &PolicyRegistry) -> Result<String, TreewireError> {
    to_json(&policy_rows(policies))
}

pub fn format_builders_text(catalog: &BuilderCatalog, selected: (&str, &str)) -> String {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Kind", "Name", "Selected"]);
    for name in catalog.pipeline_names() {
        let mark = if name == selected.0 { "*" } else { "" };
        table.add_row(vec!["pipeline", name, mark]);
    }
    for name in catalog.context_names() {
        let mark = if name == selected.1 { "*" } else { "" };
        table.add_row(vec!["context", name, mark]);
    }
    format!("{}\n{}", heading("Builders"), table)
}

pub fn format_builders_json(
    catalog: &BuilderCatalog,
    selected: (&str, &str),
) -> Result<String, TreewireError> {
    let out = serde_json::json!({
        "pipelines": catalog.pipeline_names(),
        "contexts": catalog.context_names(),
        "selected": { "pipeline": selected.0, "context": selected.1 },
    });
    to_json(&out)
}
