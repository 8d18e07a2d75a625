//! Plain text reports for the command line
use std::fmt::Write as _;

use crate::tree::{text::EditorText, NodeId, Workspace};

/// The names from the root down to a node, separated by ` / `
pub fn location(workspace: &Workspace, id: NodeId) -> String {
    let mut names: Vec<_> = workspace
        .ancestors(id)
        .map(|ancestor| workspace.display_name(ancestor))
        .collect();
    names.reverse();
    names.push(workspace.display_name(id));
    names.join(" / ")
}

/// One line per dangling reference: where it is, and what it is looking for
pub fn lost_references(workspace: &Workspace) -> String {
    let mut report = String::new();
    for id in workspace.lost_references() {
        let _ = writeln!(report, "{}", location(workspace, id));
    }
    report
}

/// The read-only ranges of editor text, one `row:col-row:col` per line
pub fn read_only_ranges(editor: &EditorText) -> String {
    let mut report = String::new();
    for range in &editor.read_only {
        let _ = writeln!(
            report,
            "{}:{}-{}:{}",
            range.start_row, range.start_col, range.end_row, range.end_col
        );
    }
    report
}
