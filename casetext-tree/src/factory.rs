//! Construction of nodes, and naming of nodes that are not given a unique name
use std::fmt::Debug;

use crate::{Level, Node, NodeKind};

/// Constructs nodes of a particular level and kind
///
/// The registry asks each specialized factory in turn whether it [accepts][NodeFactory::accepts]
/// a request, and falls back to the [`DefaultFactory`] otherwise. Whatever a factory builds,
/// the workspace keeps the requested level and kind.
pub trait NodeFactory: Debug + Send {
    /// Returns true if this factory wants to construct the requested node; `hint` is the
    /// requested (not yet unique) name
    fn accepts(&self, level: Level, kind: &NodeKind, hint: &str) -> bool;

    /// Constructs the node
    fn build(&self, level: Level, kind: NodeKind, name: String) -> Node;
}

/// Builds plain nodes with no flags or description
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFactory;

impl NodeFactory for DefaultFactory {
    fn accepts(&self, _level: Level, _kind: &NodeKind, _hint: &str) -> bool {
        true
    }

    fn build(&self, level: Level, kind: NodeKind, name: String) -> Node {
        Node::new(level, kind, name)
    }
}

/// The set of factories known to a workspace
#[derive(Debug, Default)]
pub struct FactoryRegistry {
    specialized: Vec<Box<dyn NodeFactory>>,
    default: DefaultFactory,
}

impl FactoryRegistry {
    /// Adds a specialized factory; earlier registrations take precedence
    pub fn register(&mut self, factory: impl NodeFactory + 'static) {
        self.specialized.push(Box::new(factory));
    }

    /// Returns the factory to use for the given request
    pub fn detect(&self, level: Level, kind: &NodeKind, hint: &str) -> &dyn NodeFactory {
        self.specialized
            .iter()
            .find(|factory| factory.accepts(level, kind, hint))
            .map(|factory| factory.as_ref())
            .unwrap_or(&self.default)
    }
}

/// Picks a name based on `base` that is not among `taken`
///
/// If `base` itself is free it is returned unchanged, otherwise `.<slug>.<n>` is appended
/// with the smallest `n` (from 1) that gives a free name.
pub fn unique_name<'a>(
    taken: impl IntoIterator<Item = &'a str> + Clone,
    base: &str,
    slug: &str,
) -> String {
    let is_taken = |candidate: &str| taken.clone().into_iter().any(|name| name == candidate);
    if !is_taken(base) {
        return base.to_owned();
    }
    (1..)
        .map(|n| format!("{base}.{slug}.{n}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_owned())
}

/// The name given to a placeholder ancestor inserted by the parser
pub fn placeholder_name(level: Level) -> String {
    format!("{}.auto", level.default_name())
}
