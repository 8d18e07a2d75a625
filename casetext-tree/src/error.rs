use crate::{DatasetId, Level, NodeId};

/// Errors raised by structural operations on a [`Workspace`][crate::Workspace]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("No such node: {0}")]
    UnknownNode(NodeId),

    #[error("A {parent} cannot contain a {child}")]
    IncompatibleLevels { parent: Level, child: Level },

    #[error("Template roots may only contain templates, found {0}")]
    NotATemplate(NodeId),

    #[error("Templates must be below the project level and above the leaf level, found {0}")]
    InvalidTemplateLevel(Level),

    #[error("Cannot attach {child} under itself or one of its descendants ({parent})")]
    CyclicAttachment { parent: NodeId, child: NodeId },

    #[error("Leaf node {0} cannot have children")]
    LeafContainer(NodeId),

    #[error("Reference {0} borrows its children and cannot own any")]
    ReferenceContainer(NodeId),

    #[error("Template {0} can only be placed in a template root")]
    MisplacedTemplate(NodeId),

    #[error("Insertion index {index} is out of bounds for {parent} with {len} children")]
    IndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },

    #[error("{0} is a project root and cannot be attached elsewhere")]
    RootAttachment(NodeId),

    #[error("No such dataset: {0}")]
    UnknownDataset(DatasetId),

    #[error("The current workspace is already in use on this thread")]
    WorkspaceInUse,
}
