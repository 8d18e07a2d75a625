use std::sync::OnceLock;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{anychar, char},
    combinator::{all_consuming, eof, map, opt, peek, recognize, rest, success, value},
    multi::many_till,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use regex::Regex;

use crate::{
    factory::placeholder_name,
    migration::{migrate, IdentityMap},
    Flags, Level, NodeId, NodeKind, ReferenceKey, TreeError, Workspace,
};

use super::{COMMENT_MARKER, LEGACY_COMMENT_MARKER, REFERENCE_SEPARATOR, TEMPLATE_MARKER};

type Result<T, E = TreeError> = std::result::Result<T, E>;

/// Rebuilds the children of a node from lines of text
///
/// Lines are fed one at a time with [`Parser::line`]; the parent's children are only
/// replaced when the parser is [finished][Parser::finish].
///
/// Since the text has no closing markers, the parser keeps one open node per level below
/// the parent: a new line attaches to the open node one level above its own, and closes
/// every open node at its own level or deeper.
#[derive(Debug)]
pub struct Parser<'w> {
    workspace: &'w mut Workspace,
    parent: NodeId,
    parent_level: Level,
    /// Whether the parent is a template root, whose lines declare templates
    templates: bool,
    /// Open nodes, one slot per level starting at `base`
    structure: Vec<Option<NodeId>>,
    /// The level of the node held by the first slot
    base: Level,
    /// Completed top level nodes
    output: Vec<NodeId>,
    /// Level of a reference whose (borrowed) children are being skipped
    reference_level: Option<Level>,
}

impl<'w> Parser<'w> {
    /// Prepares to rebuild the children of `parent`
    pub fn new(workspace: &'w mut Workspace, parent: NodeId) -> Result<Self> {
        let node = workspace.node(parent)?;
        let parent_level = node.level();
        if parent_level.is_leaf() {
            return Err(TreeError::LeafContainer(parent));
        }
        if node.reference().is_some() {
            return Err(TreeError::ReferenceContainer(parent));
        }
        let templates = workspace.is_template_root(parent);
        Ok(Parser {
            workspace,
            parent,
            parent_level,
            templates,
            structure: vec![None; Level::LEAF.ordinal() - parent_level.ordinal()],
            base: parent_level.next(),
            output: Vec::new(),
            reference_level: None,
        })
    }

    /// Reads one line of text
    pub fn line(&mut self, raw: &str) {
        let Some(line) = Line::split(raw) else {
            return;
        };
        if self.templates {
            self.template_line(line);
        } else {
            if line.declaration {
                tracing::warn!(
                    "Template declaration outside of a template root, reading as an ordinary node: {}",
                    raw.trim()
                );
            }
            let level = deeper_than(line.level, self.parent_level);
            self.place(level, line);
        }
    }

    fn template_line(&mut self, line: Line) {
        if line.declaration {
            self.finalize_top();
            self.reference_level = None;
            let id = self.workspace.create(line.level, NodeKind::Template, Some(line.text));
            self.keep_name(id, line.text);
            self.apply_line_state(id, &line);
            tracing::trace!("Declared template {} \"{}\"", line.level, line.text);
            self.base = line.level;
            self.structure.fill(None);
            self.structure[0] = Some(id);
            return;
        }
        if self.structure[0].is_none() {
            tracing::warn!(
                "Skipping \"{}\" in template root; it does not belong to any template",
                line.text
            );
            return;
        }
        let level = deeper_than(line.level, self.base);
        self.place(level, line);
    }

    fn place(&mut self, level: Level, line: Line) {
        if let Some(open) = self.reference_level {
            if level > open {
                tracing::trace!("Skipping \"{}\", borrowed by an open reference", line.text);
                return;
            }
            self.reference_level = None;
        }

        let reference = reference_key(line.text);
        let is_reference = reference.is_some();
        let id = match reference {
            Some(key) => {
                let name = key.custom_name.clone().unwrap_or_else(|| key.template.clone());
                self.workspace
                    .create(level, NodeKind::Reference(key), Some(&name))
            }
            None => {
                let id = self.workspace.create(level, NodeKind::Plain, Some(line.text));
                self.keep_name(id, line.text);
                id
            }
        };
        self.apply_line_state(id, &line);
        self.insert(level, id);
        if is_reference {
            self.reference_level = Some(level);
        }
    }

    /// Names a node exactly as written, even when that is empty
    fn keep_name(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.workspace.get_mut(id) {
            if node.name != name {
                node.name = name.to_owned();
            }
        }
    }

    fn apply_line_state(&mut self, id: NodeId, line: &Line) {
        if let Some(node) = self.workspace.get_mut(id) {
            node.enabled = line.enabled;
            node.flags = line.flags.iter().copied().collect::<Flags>();
        }
    }

    fn insert(&mut self, level: Level, id: NodeId) {
        let index = level.ordinal() - self.base.ordinal();
        if index == 0 {
            self.finalize_top();
        } else {
            let parent = self.open_ancestor(index - 1);
            if let Err(e) = self.workspace.attach(parent, &[id], None) {
                tracing::warn!("Dropping {}: {}", id, e);
                self.workspace.discard(id);
                return;
            }
        }
        self.structure[index] = Some(id);
        for slot in self.structure[index + 1..].iter_mut() {
            *slot = None;
        }
    }

    /// Returns the open node in `slot`, inserting placeholders for any missing ancestors
    fn open_ancestor(&mut self, slot: usize) -> NodeId {
        if let Some(id) = self.structure[slot] {
            return id;
        }
        let level = Level::from_ordinal(self.base.ordinal() + slot).unwrap_or(Level::LEAF);
        let name = placeholder_name(level);
        let id = self.workspace.create(level, NodeKind::Plain, Some(&name));
        tracing::debug!("Inserting placeholder {} \"{}\"", level, name);
        if slot > 0 {
            let parent = self.open_ancestor(slot - 1);
            if let Err(e) = self.workspace.attach(parent, &[id], None) {
                tracing::warn!("Could not attach placeholder {}: {}", id, e);
            }
        }
        self.structure[slot] = Some(id);
        id
    }

    fn finalize_top(&mut self) {
        if let Some(top) = self.structure[0].take() {
            self.output.push(top);
        }
    }

    /// Replaces the parent's children with the nodes read, returning them
    ///
    /// The previous children are discarded. If anything was read and an identity map is
    /// given, tracked nodes of the previous children are first migrated to their
    /// counterparts among the new ones.
    pub fn finish(mut self, migration: Option<&mut IdentityMap>) -> Result<Vec<NodeId>> {
        self.finalize_top();
        let Parser {
            workspace,
            parent,
            output,
            ..
        } = self;
        let old = workspace.replace_children(parent, output.clone())?;
        tracing::debug!(
            "Rebuilt {} with {} top level nodes, replacing {}",
            parent,
            output.len(),
            old.len()
        );
        if !output.is_empty() {
            if let Some(map) = migration {
                migrate(workspace, parent, &old, &output, map);
            }
        }
        for id in old {
            workspace.discard(id);
        }
        Ok(output)
    }
}

/// Rebuilds the children of `parent` from the given lines
pub fn parse_lines<'a>(
    workspace: &mut Workspace,
    parent: NodeId,
    lines: impl IntoIterator<Item = &'a str>,
    migration: Option<&mut IdentityMap>,
) -> Result<Vec<NodeId>> {
    let mut parser = Parser::new(workspace, parent)?;
    for line in lines {
        parser.line(line);
    }
    parser.finish(migration)
}

/// Rebuilds the children of `parent` from the lines of `text`
pub fn parse_text(
    workspace: &mut Workspace,
    parent: NodeId,
    text: &str,
    migration: Option<&mut IdentityMap>,
) -> Result<Vec<NodeId>> {
    parse_lines(workspace, parent, text.lines(), migration)
}

/// Loads a whole project from text
///
/// The project is named by a leading `Project: ` line, or `fallback_name` if there is none.
/// A project of that name already in the workspace is rebuilt in place.
pub fn load_project(
    workspace: &mut Workspace,
    text: &str,
    fallback_name: &str,
    migration: Option<&mut IdentityMap>,
) -> Result<NodeId> {
    let mut lines = text.lines().peekable();
    while lines.peek().map(|line| line.trim().is_empty()).unwrap_or(false) {
        lines.next();
    }
    let header = lines
        .peek()
        .copied()
        .and_then(Line::split)
        .filter(|line| line.level == Level::ROOT && !line.declaration);
    let (name, project_line) = match header {
        Some(line) => {
            lines.next();
            (line.text.to_owned(), Some(line))
        }
        None => (fallback_name.to_owned(), None),
    };
    let project = match workspace.project_named(&name) {
        Some(project) => project,
        None => workspace.create_project(Some(&name)),
    };
    if let Some(line) = project_line {
        let node = workspace.node_mut(project)?;
        node.enabled = line.enabled;
        node.flags = line.flags.iter().copied().collect();
    }
    parse_lines(workspace, project, lines, migration)?;
    Ok(project)
}

/// Loads the templates of a project from text, replacing any it already has
pub fn load_templates(
    workspace: &mut Workspace,
    project: NodeId,
    text: &str,
    migration: Option<&mut IdentityMap>,
) -> Result<Vec<NodeId>> {
    let root = workspace.template_root(project)?;
    parse_text(workspace, root, text, migration)
}

/// If `level` is not below `container`, the level just below it
fn deeper_than(level: Level, container: Level) -> Level {
    if level > container {
        level
    } else {
        container.next()
    }
}

/// A line stripped of its markers, before it is placed in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub enabled: bool,
    pub level: Level,
    /// Whether this declares a template
    pub declaration: bool,
    /// What follows the level prefix
    pub text: &'a str,
    pub flags: Vec<&'a str>,
}

impl<'a> Line<'a> {
    /// Strips comment markers, flags and the level prefix; returns `None` for blank lines
    pub fn split(raw: &'a str) -> Option<Self> {
        let (text, marker) = disabled_marker(raw.trim()).ok()?;
        let mut text = text.trim_start();
        if text.is_empty() {
            return None;
        }

        let mut flags = Vec::new();
        if let Some(captures) = flags_pattern().captures(text) {
            if let (Some(clause), Some(list)) = (captures.get(0), captures.get(1)) {
                flags = list
                    .as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|flag| !flag.is_empty())
                    .collect();
                text = &text[..clause.start()];
            }
        }

        let (text, (declaration, level)) = line_head(text).ok()?;
        Some(Line {
            enabled: marker.is_none(),
            level,
            declaration,
            text: text.trim(),
            flags,
        })
    }
}

fn flags_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*;\s*flags=([^;]*)$").expect("Invalid flags pattern"))
}

fn disabled_marker(input: &str) -> IResult<&str, Option<&str>> {
    opt(alt((tag(COMMENT_MARKER), tag(LEGACY_COMMENT_MARKER))))(input)
}

/// Whether the line declares a template, and its level (the leaf level if it has no prefix)
fn line_head(input: &str) -> IResult<&str, (bool, Level)> {
    alt((
        map(preceded(tag(TEMPLATE_MARKER), level_prefix), |level| {
            (true, level)
        }),
        map(level_prefix, |level| (false, level)),
        success((false, Level::LEAF)),
    ))(input)
}

fn level_prefix(input: &str) -> IResult<&str, Level> {
    alt((
        value(Level::Project, prefix(Level::Project)),
        value(Level::Suite, prefix(Level::Suite)),
        value(Level::Case, prefix(Level::Case)),
        value(Level::Step, prefix(Level::Step)),
    ))(input)
}

/// The prefix of a level; a node with an empty name loses the trailing space at the end of
/// the line
fn prefix<'a>(level: Level) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    let full = level.prefix();
    alt((tag(full), terminated(tag(full.trim_end()), eof)))
}

/// Parses `Template_project\template`, optionally followed by ` "custom name"`
fn reference_key(text: &str) -> Option<ReferenceKey> {
    let (_, (project, (template, custom_name))) = preceded(
        tag(TEMPLATE_MARKER),
        pair(project_name, template_name),
    )(text.trim_end())
    .ok()?;
    let (project, template) = (project.trim(), template.trim());
    if project.is_empty() || template.is_empty() {
        return None;
    }
    let key = ReferenceKey::new(project, template);
    Some(match custom_name.filter(|custom| !custom.is_empty()) {
        Some(custom) => key.with_custom_name(custom),
        None => key,
    })
}

fn project_name(input: &str) -> IResult<&str, &str> {
    terminated(is_not("\\\""), char(REFERENCE_SEPARATOR))(input)
}

/// The template name, and the custom name if the body ends in a quoted segment
///
/// Only the last quoted segment is the custom name; earlier ones belong to the template name.
fn template_name(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    alt((
        map(
            pair(recognize(many_till(anychar, peek(custom_name))), custom_name),
            |(template, custom)| (template, Some(custom)),
        ),
        map(rest, |template| (template, None)),
    ))(input)
}

fn custom_name(input: &str) -> IResult<&str, &str> {
    all_consuming(delimited(tag(" \""), recognize(opt(is_not("\""))), char('"')))(input)
}

#[cfg(test)]
pub(crate) fn split_for_testing(raw: &str) -> Option<Line<'_>> {
    Line::split(raw)
}

#[cfg(test)]
pub(crate) fn reference_for_testing(text: &str) -> Option<ReferenceKey> {
    reference_key(text)
}
