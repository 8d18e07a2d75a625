use crate::{NodeId, NodeKind, Resolution, Workspace};

use super::{COMMENT_MARKER, FLAGS_SEPARATOR, TEMPLATE_MARKER};

/// Settings for printing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    /// Repeated once per depth at the start of each line
    pub indent: String,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            indent: "    ".to_owned(),
        }
    }
}

/// A span of generated text that an editor should not allow to be changed
///
/// Rows and columns are zero based; columns count characters and restart on each line.
/// The end position is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReadOnlyRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

/// Text printed for an editor, with the generated spans marked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorText {
    pub text: String,
    /// Non-overlapping, in the order they appear in `text`
    pub read_only: Vec<ReadOnlyRange>,
}

/// Prints the given nodes and their subtrees for persistence
///
/// References are written as a single line; the children they borrow belong to the template.
pub fn print_file(workspace: &Workspace, roots: &[NodeId], options: &PrintOptions) -> String {
    let mut printer = Printer::new(workspace, options, FileSink::default());
    printer.nodes(roots);
    printer.sink.0
}

/// Prints the given nodes and their subtrees for an editor
///
/// Unlike [`print_file`], the children borrowed by references are printed too; being owned
/// by templates, they are entirely read-only.
pub fn print_editor(workspace: &Workspace, roots: &[NodeId], options: &PrintOptions) -> EditorText {
    let mut printer = Printer::new(workspace, options, EditorSink::default());
    printer.nodes(roots);
    printer.sink.finish()
}

/// Prints a project, including its own line, for persistence
pub fn print_project(workspace: &Workspace, project: NodeId, options: &PrintOptions) -> String {
    print_file(workspace, &[project], options)
}

/// Prints the templates of a project for persistence (empty if it has none)
pub fn print_templates(workspace: &Workspace, project: NodeId, options: &PrintOptions) -> String {
    let templates = workspace
        .find_template_root(project)
        .map(|root| workspace.children(root))
        .unwrap_or_default();
    print_file(workspace, templates, options)
}

trait Sink {
    /// Whether borrowed subtrees are left out
    const PERSISTING: bool;

    fn append(&mut self, fragment: &str, generated: bool);
}

#[derive(Default)]
struct FileSink(String);

impl Sink for FileSink {
    const PERSISTING: bool = true;

    fn append(&mut self, fragment: &str, _generated: bool) {
        self.0.push_str(fragment);
    }
}

#[derive(Default)]
struct EditorSink {
    text: String,
    row: usize,
    col: usize,
    run_start: Option<(usize, usize)>,
    ranges: Vec<ReadOnlyRange>,
}

impl EditorSink {
    fn close_run(&mut self) {
        if let Some((start_row, start_col)) = self.run_start.take() {
            self.ranges.push(ReadOnlyRange {
                start_row,
                start_col,
                end_row: self.row,
                end_col: self.col,
            });
        }
    }

    fn finish(mut self) -> EditorText {
        self.close_run();
        EditorText {
            text: self.text,
            read_only: self.ranges,
        }
    }
}

impl Sink for EditorSink {
    const PERSISTING: bool = false;

    fn append(&mut self, fragment: &str, generated: bool) {
        if fragment.is_empty() {
            return;
        }
        if generated {
            if self.run_start.is_none() {
                self.run_start = Some((self.row, self.col));
            }
        } else {
            self.close_run();
        }
        self.text.push_str(fragment);
        for ch in fragment.chars() {
            if ch == '\n' {
                self.row += 1;
                self.col = 0;
            } else {
                self.col += 1;
            }
        }
    }
}

struct Printer<'w, S> {
    workspace: &'w Workspace,
    options: &'w PrintOptions,
    sink: S,
    started: bool,
    /// Templates currently being expanded through references
    expanding: Vec<NodeId>,
}

impl<'w, S: Sink> Printer<'w, S> {
    fn new(workspace: &'w Workspace, options: &'w PrintOptions, sink: S) -> Self {
        Printer {
            workspace,
            options,
            sink,
            started: false,
            expanding: Vec::new(),
        }
    }

    fn nodes(&mut self, roots: &[NodeId]) {
        for &root in roots {
            self.node(root, 0, false);
        }
    }

    fn node(&mut self, id: NodeId, depth: usize, borrowed: bool) {
        let Some(node) = self.workspace.get(id) else {
            tracing::warn!("Skipping unknown node {} while printing", id);
            return;
        };
        if self.started {
            self.sink.append("\n", borrowed);
        }
        self.started = true;

        for _ in 0..depth {
            self.sink.append(&self.options.indent, borrowed);
        }
        if !node.enabled {
            self.sink.append(COMMENT_MARKER, borrowed);
        }
        let level = node.level();
        match node.kind() {
            NodeKind::Plain => {
                self.sink.append(level.prefix(), true);
                self.sink.append(&node.name, borrowed);
            }
            NodeKind::Template => {
                self.sink.append(TEMPLATE_MARKER, true);
                self.sink.append(level.prefix(), true);
                self.sink.append(&node.name, borrowed);
            }
            NodeKind::Reference(key) => {
                self.sink.append(level.prefix(), true);
                self.sink.append(TEMPLATE_MARKER, true);
                self.sink.append(&key.label(), true);
                if let Some(custom) = key.distinct_custom_name() {
                    self.sink.append(&format!(" \"{custom}\""), true);
                }
            }
        }
        let flags: Vec<&str> = node.flags.enabled_names().collect();
        if !flags.is_empty() {
            self.sink.append(FLAGS_SEPARATOR, borrowed);
            self.sink.append(&flags.join(","), borrowed);
        }

        match node.kind() {
            NodeKind::Plain | NodeKind::Template => {
                for &child in node.own_children() {
                    self.node(child, depth + 1, borrowed);
                }
            }
            NodeKind::Reference(_) if S::PERSISTING => {}
            NodeKind::Reference(_) => match self.workspace.resolve(id) {
                Some(Resolution::Resolved(template)) if !self.expanding.contains(&template) => {
                    self.expanding.push(template);
                    for &child in self.workspace.children(template) {
                        self.node(child, depth + 1, true);
                    }
                    self.expanding.pop();
                }
                Some(Resolution::Resolved(template)) => {
                    tracing::debug!("Not expanding {} again within itself", template);
                }
                _ => {}
            },
        }
    }
}
