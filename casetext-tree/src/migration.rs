//! Re-linking of node identities held outside the tree after a subtree is rebuilt
//!
//! A rebuild from text discards every node below the rebuilt parent and creates new ones.
//! Anything that held on to the old identities (such as a scope of tests to run) would be
//! left pointing at discarded nodes. Migration finds, for each tracked identity, the new
//! node reached by following the same names from the rebuilt parent, and records the pair
//! in an [`IdentityMap`] for the holder to consult.
use std::collections::HashMap;

use indexmap::IndexSet;

use crate::{Node, NodeId, Workspace};

/// Table of tracked node identities and the old/new pairs found by [`migrate`]
///
/// The table belongs to whoever holds node identities outside the tree: they register the
/// identities they hold with [`track`][IdentityMap::track], read the pairs after a rebuild,
/// and [`clear`][IdentityMap::clear] them once applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IdentityMap {
    tracked: IndexSet<NodeId>,
    forward: HashMap<NodeId, NodeId>,
    backward: HashMap<NodeId, NodeId>,
}

impl IdentityMap {
    /// Creates an empty table
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers an identity to be migrated by future rebuilds
    pub fn track(&mut self, id: NodeId) {
        self.tracked.insert(id);
    }

    /// Stops migrating an identity
    pub fn untrack(&mut self, id: NodeId) {
        self.tracked.shift_remove(&id);
    }

    /// Returns true if the identity is registered
    pub fn is_tracked(&self, id: NodeId) -> bool {
        self.tracked.contains(&id)
    }

    /// The registered identities, in registration order
    pub fn tracked(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tracked.iter().copied()
    }

    /// The node that replaced `old`, if one was found
    pub fn new_for(&self, old: NodeId) -> Option<NodeId> {
        self.forward.get(&old).copied()
    }

    /// The first node that `new` replaced, across repeated rebuilds
    pub fn old_for(&self, new: NodeId) -> Option<NodeId> {
        self.backward.get(&new).copied()
    }

    /// All `(old, new)` pairs found since the last [`clear`][IdentityMap::clear]
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.forward.iter().map(|(&old, &new)| (old, new))
    }

    /// The number of pairs found
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns true if no pairs have been found
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Forgets the pairs found so far, keeping the tracked identities
    pub fn clear(&mut self) {
        self.forward.clear();
        self.backward.clear();
    }

    /// Forgets everything, including the tracked identities
    pub fn reset(&mut self) {
        self.clear();
        self.tracked.clear();
    }

    /// Records a pair; the new identity is tracked in place of the old one
    fn record(&mut self, old: NodeId, new: NodeId) {
        if let Some(index) = self.tracked.get_index_of(&old) {
            self.tracked.shift_remove_index(index);
            self.tracked.shift_insert(index, new);
        }
        // A chain of rebuilds maps the original identity straight to the latest node
        let original = self.backward.remove(&old).unwrap_or(old);
        self.forward.insert(old, new);
        self.forward.insert(original, new);
        self.backward.insert(new, original);
    }
}

/// Finds replacements for tracked nodes after the children of `parent` were rebuilt
///
/// `replaced` are the former children of `parent`, still present in the workspace, and
/// `rebuilt` the new ones. Only tracked nodes that were below one of the `replaced` nodes,
/// at or below the shallowest rebuilt level, are considered. The names on the path from
/// `parent` down to such a node are followed through `rebuilt`; if every name is found the
/// pair is recorded, otherwise the node is left without a replacement.
///
/// Returns the number of pairs recorded.
pub fn migrate(
    workspace: &Workspace,
    parent: NodeId,
    replaced: &[NodeId],
    rebuilt: &[NodeId],
    map: &mut IdentityMap,
) -> usize {
    let Some(shallowest) = rebuilt
        .iter()
        .filter_map(|&id| workspace.get(id))
        .map(Node::level)
        .min()
    else {
        return 0;
    };

    let mut found = Vec::new();
    for stale in map.tracked() {
        match workspace.get(stale) {
            Some(node) if node.level() >= shallowest => {}
            _ => continue,
        }
        let Some(path) = name_path(workspace, parent, replaced, stale) else {
            continue;
        };
        match follow(workspace, rebuilt, &path) {
            Some(new) => found.push((stale, new)),
            None => tracing::debug!(
                "No replacement for {} at \"{}\"",
                stale,
                path.join("\" / \"")
            ),
        }
    }

    for &(old, new) in &found {
        tracing::trace!("Migrated {} to {}", old, new);
        map.record(old, new);
    }
    tracing::debug!("Migrated {} tracked nodes below {}", found.len(), parent);
    found.len()
}

/// Names from just below `parent` down to `stale`, if `stale` was below one of `replaced`
fn name_path<'w>(
    workspace: &'w Workspace,
    parent: NodeId,
    replaced: &[NodeId],
    stale: NodeId,
) -> Option<Vec<&'w str>> {
    let mut chain = vec![stale];
    let mut reached = false;
    for ancestor in workspace.ancestors(stale) {
        if ancestor == parent {
            reached = true;
            break;
        }
        chain.push(ancestor);
    }
    let top = *chain.last()?;
    if !reached || !replaced.contains(&top) {
        return None;
    }
    chain
        .iter()
        .rev()
        .map(|&id| workspace.get(id).map(|node| node.name.as_str()))
        .collect()
}

/// Walks down from `roots`, matching one name per level
fn follow(workspace: &Workspace, roots: &[NodeId], path: &[&str]) -> Option<NodeId> {
    let mut candidates = roots;
    let mut current = None;
    for name in path {
        let next = candidates
            .iter()
            .copied()
            .find(|&id| workspace.get(id).map(|node| node.name == *name).unwrap_or(false))?;
        candidates = workspace.get(next).map(Node::own_children).unwrap_or_default();
        current = Some(next);
    }
    current
}
