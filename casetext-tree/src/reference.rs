//! Resolution of references to the templates they borrow from
//!
//! A reference only stores the names of the project and template it points to. Every lookup
//! scans the currently loaded templates again, so a reference follows the templates through
//! any rebuild of a template root, and becomes dangling (rather than stale) if its template
//! goes away.
use std::borrow::Cow;

use crate::{Level, NodeId, NodeKind, ReferenceKey, Workspace};

/// The outcome of looking up the template of a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The template currently matching the reference
    Resolved(NodeId),
    /// No loaded template matches the reference
    Dangling,
}

impl Resolution {
    /// The resolved template, if any
    pub fn template(self) -> Option<NodeId> {
        match self {
            Resolution::Resolved(id) => Some(id),
            Resolution::Dangling => None,
        }
    }
}

impl Workspace {
    /// Finds a template by owning project name, template name and level
    pub fn find_template(&self, project: &str, template: &str, level: Level) -> Option<NodeId> {
        self.template_roots()
            .iter()
            .filter(|&&root| self.get(root).map(|r| r.name == project).unwrap_or(false))
            .flat_map(|&root| self.get(root).map(|r| r.own_children()).unwrap_or_default())
            .copied()
            .find(|&id| {
                self.get(id)
                    .map(|node| node.is_template() && node.level() == level && node.name == template)
                    .unwrap_or(false)
            })
    }

    /// Looks up the template of a reference
    ///
    /// Returns `None` if `id` is not a reference.
    pub fn resolve(&self, id: NodeId) -> Option<Resolution> {
        let node = self.get(id)?;
        let key = node.reference()?;
        Some(self.resolve_key(key, node.level()))
    }

    /// Looks up the template a reference key of the given level points to
    pub fn resolve_key(&self, key: &ReferenceKey, level: Level) -> Resolution {
        match self.find_template(&key.project, &key.template, level) {
            Some(template) => Resolution::Resolved(template),
            None => Resolution::Dangling,
        }
    }

    /// The children of a node, as seen through references
    ///
    /// A reference yields the children of its template, or nothing if it is dangling.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        let Some(node) = self.get(id) else {
            return &[];
        };
        match node.kind() {
            NodeKind::Plain | NodeKind::Template => node.own_children(),
            NodeKind::Reference(_) => match self.resolve(id) {
                Some(Resolution::Resolved(template)) => self
                    .get(template)
                    .map(|template| template.own_children())
                    .unwrap_or_default(),
                _ => &[],
            },
        }
    }

    /// The name of a node as seen through references
    ///
    /// References use their custom name if one is set, otherwise the name of their template.
    /// Returns `None` for a dangling reference, and for unknown nodes.
    pub fn resolved_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get(id)?;
        match node.kind() {
            NodeKind::Plain | NodeKind::Template => Some(&node.name),
            NodeKind::Reference(key) => match self.resolve_key(key, node.level()) {
                Resolution::Resolved(template) => key
                    .custom_name
                    .as_deref()
                    .or_else(|| self.get(template).map(|t| t.name.as_str())),
                Resolution::Dangling => None,
            },
        }
    }

    /// A name for display, marking dangling references as lost
    pub fn display_name(&self, id: NodeId) -> Cow<'_, str> {
        if let Some(name) = self.resolved_name(id) {
            return Cow::Borrowed(name);
        }
        match self.get(id).and_then(|node| node.reference()) {
            Some(key) => Cow::Owned(format!("<lost reference: {}>", key.label())),
            None => Cow::Borrowed("<unknown>"),
        }
    }

    /// All dangling references stored in projects and template roots
    pub fn lost_references(&self) -> Vec<NodeId> {
        self.projects()
            .iter()
            .chain(self.template_roots())
            .flat_map(|&root| self.descendants(root))
            .filter(|&id| self.resolve(id) == Some(Resolution::Dangling))
            .collect()
    }
}
