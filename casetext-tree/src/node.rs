use std::fmt::Display;

use crate::{Flags, Level};

/// Identity of a node within a [`Workspace`][crate::Workspace]
///
/// Identifiers are never reused by the workspace that issued them, so an identifier
/// for a discarded node stays invalid rather than aliasing a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The raw arena index of this identifier
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is, beyond its [`Level`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An ordinary node owning its children
    Plain,
    /// A reusable subtree, stored in a project's template root
    Template,
    /// A placeholder borrowing the children of a template, found by name
    Reference(ReferenceKey),
}

impl NodeKind {
    /// Short lowercase name of the kind, used when generating unique names
    pub fn slug(&self, level: Level) -> &'static str {
        match self {
            NodeKind::Plain => level.slug(),
            NodeKind::Template => "template",
            NodeKind::Reference(_) => "reference",
        }
    }

    /// Returns the reference key if this is a reference
    pub fn as_reference(&self) -> Option<&ReferenceKey> {
        match self {
            NodeKind::Reference(key) => Some(key),
            _ => None,
        }
    }
}

/// The names identifying the template a reference points to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceKey {
    /// Name of the project owning the template
    pub project: String,
    /// Name of the template within the project
    pub template: String,
    /// Optional name to display instead of the template's own
    pub custom_name: Option<String>,
}

impl ReferenceKey {
    /// Creates a key without a custom name
    pub fn new(project: impl Into<String>, template: impl Into<String>) -> Self {
        ReferenceKey {
            project: project.into(),
            template: template.into(),
            custom_name: None,
        }
    }

    /// Sets the custom display name
    pub fn with_custom_name(mut self, custom_name: impl Into<String>) -> Self {
        self.custom_name = Some(custom_name.into());
        self
    }

    /// The text form `project\template`
    pub fn label(&self) -> String {
        format!("{}\\{}", self.project, self.template)
    }

    /// The custom name, only if it is set and differs from the label
    pub fn distinct_custom_name(&self) -> Option<&str> {
        self.custom_name
            .as_deref()
            .filter(|custom| *custom != self.label())
    }
}

/// A node of the test plan tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) level: Level,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    /// Name, as shown in the text form
    pub name: String,
    /// Free text description (not part of the text form)
    pub description: String,
    /// Named switches
    pub flags: Flags,
    /// Disabled nodes are commented out in the text form
    pub enabled: bool,
}

impl Node {
    /// Creates a detached, enabled node without flags or description
    pub fn new(level: Level, kind: NodeKind, name: String) -> Self {
        Node {
            level,
            kind,
            parent: None,
            children: Vec::new(),
            name,
            description: String::new(),
            flags: Flags::default(),
            enabled: true,
        }
    }

    /// The level of this node in the hierarchy
    pub fn level(&self) -> Level {
        self.level
    }

    /// The kind of this node
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The node whose child list this node was last attached to
    ///
    /// A node detached by a rebuild keeps pointing at its former parent.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children stored on this node (always empty for references; see
    /// [`Workspace::children`][crate::Workspace::children] for resolved children)
    pub fn own_children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns true if this is a template
    pub fn is_template(&self) -> bool {
        matches!(self.kind, NodeKind::Template)
    }

    /// Returns the reference key if this is a reference
    pub fn reference(&self) -> Option<&ReferenceKey> {
        self.kind.as_reference()
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            NodeKind::Plain => write!(f, "{} \"{}\"", self.level, self.name)?,
            NodeKind::Template => write!(f, "Template {} \"{}\"", self.level, self.name)?,
            NodeKind::Reference(key) => write!(f, "Reference {} to {}", self.level, key.label())?,
        }
        if !self.enabled {
            write!(f, " (disabled)")?;
        }
        Ok(())
    }
}
