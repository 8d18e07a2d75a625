use std::fmt::Display;

use indexmap::{IndexMap, IndexSet};

use casetext_tree::{DatasetId, IdentityMap, NodeId, TreeError, Workspace};

use crate::flatten::flatten;

/// Errors from changes to a [`Scope`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("No scope item {0}")]
    UnknownItem(ScopeItemId),
    #[error("Scope item {0} cannot depend on itself")]
    SelfDependency(ScopeItemId),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

type Result<T, E = ScopeError> = std::result::Result<T, E>;

/// When an item runs relative to the others
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Setting up what the actions need
    Prerequisites,
    #[default]
    Actions,
    /// Checking the outcome of the actions
    Validation,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Prerequisites => "prerequisites",
            Stage::Actions => "actions",
            Stage::Validation => "validation",
        })
    }
}

/// Identity of an item within its [`Scope`]; never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeItemId(usize);

impl Display for ScopeItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// One entry of an execution plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeItem {
    node: NodeId,
    dataset: Option<DatasetId>,
    stage: Stage,
    depends_on: Option<ScopeItemId>,
}

impl ScopeItem {
    /// The tree node this item runs
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The data set the node runs with, if any
    pub fn dataset(&self) -> Option<DatasetId> {
        self.dataset
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The item that must have run before this one, if any
    pub fn depends_on(&self) -> Option<ScopeItemId> {
        self.depends_on
    }
}

/// An ordered execution plan referring to nodes of a tree by identity
///
/// Since rebuilding a tree from text replaces its nodes, a scope registers the nodes it
/// refers to with an [`IdentityMap`] ([`Scope::track`]) and re-points its items after each
/// rebuild ([`Scope::apply_migration`]).
#[derive(Debug, Default, Clone)]
pub struct Scope {
    items: IndexMap<ScopeItemId, ScopeItem>,
    next_id: usize,
}

impl Scope {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends an item running `node`
    pub fn add(&mut self, workspace: &Workspace, node: NodeId) -> Result<ScopeItemId> {
        workspace.node(node)?;
        let id = ScopeItemId(self.next_id);
        self.next_id += 1;
        self.items.insert(
            id,
            ScopeItem {
                node,
                dataset: None,
                stage: Stage::default(),
                depends_on: None,
            },
        );
        Ok(id)
    }

    /// Removes an item, along with any dependency on it
    pub fn remove(&mut self, id: ScopeItemId) -> Option<ScopeItem> {
        let removed = self.items.shift_remove(&id)?;
        for item in self.items.values_mut() {
            if item.depends_on == Some(id) {
                item.depends_on = None;
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: ScopeItemId) -> Option<&ScopeItem> {
        self.items.get(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the items in the order they were added
    pub fn iter(&self) -> impl Iterator<Item = (ScopeItemId, &ScopeItem)> {
        self.items.iter().map(|(&id, item)| (id, item))
    }

    fn item_mut(&mut self, id: ScopeItemId) -> Result<&mut ScopeItem> {
        self.items.get_mut(&id).ok_or(ScopeError::UnknownItem(id))
    }

    /// Sets or clears the data set of an item
    pub fn set_dataset(
        &mut self,
        workspace: &Workspace,
        id: ScopeItemId,
        dataset: Option<DatasetId>,
    ) -> Result<()> {
        if let Some(dataset) = dataset {
            if workspace.dataset(dataset).is_none() {
                return Err(TreeError::UnknownDataset(dataset).into());
            }
        }
        self.item_mut(id)?.dataset = dataset;
        Ok(())
    }

    pub fn set_stage(&mut self, id: ScopeItemId, stage: Stage) -> Result<()> {
        self.item_mut(id)?.stage = stage;
        Ok(())
    }

    /// Sets or clears the item that must run before `id`
    pub fn set_dependency(
        &mut self,
        id: ScopeItemId,
        depends_on: Option<ScopeItemId>,
    ) -> Result<()> {
        if let Some(dependency) = depends_on {
            if dependency == id {
                return Err(ScopeError::SelfDependency(id));
            }
            if !self.items.contains_key(&dependency) {
                return Err(ScopeError::UnknownItem(dependency));
            }
        }
        self.item_mut(id)?.depends_on = depends_on;
        Ok(())
    }

    /// The items grouped by stage, keeping the order they were added within each stage
    pub fn execution_order(&self) -> Vec<ScopeItemId> {
        let mut order: Vec<(ScopeItemId, Stage)> =
            self.items.iter().map(|(&id, item)| (id, item.stage)).collect();
        order.sort_by_key(|&(_, stage)| stage);
        order.into_iter().map(|(id, _)| id).collect()
    }

    /// Registers every node referred to, so rebuilds look for their replacements
    pub fn track(&self, map: &mut IdentityMap) {
        for item in self.items.values() {
            map.track(item.node);
        }
    }

    /// Re-points items at the replacements found by a rebuild, returning how many changed
    pub fn apply_migration(&mut self, map: &IdentityMap) -> usize {
        let mut updated = 0;
        for (id, item) in self.items.iter_mut() {
            match map.new_for(item.node) {
                Some(new) if new != item.node => {
                    tracing::trace!("Scope {} now runs {} (was {})", id, new, item.node);
                    item.node = new;
                    updated += 1;
                }
                _ => {}
            }
        }
        tracing::debug!("Re-pointed {} of {} scope items", updated, self.items.len());
        updated
    }

    /// Items whose node no longer exists in the workspace
    pub fn lost_items(&self, workspace: &Workspace) -> Vec<ScopeItemId> {
        self.items
            .iter()
            .filter(|(_, item)| !workspace.contains(item.node))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Replaces all dependencies with a flattened form of `graph`
    ///
    /// Each item ends up depending on at most one other (see [`flatten`]). Edges naming
    /// items not in this scope are ignored. Returns the number of dependencies set.
    pub fn apply_dependencies(
        &mut self,
        graph: &IndexMap<ScopeItemId, IndexSet<ScopeItemId>>,
    ) -> usize {
        let known: IndexMap<ScopeItemId, IndexSet<ScopeItemId>> = graph
            .iter()
            .filter(|(id, _)| self.items.contains_key(*id))
            .map(|(&id, dependencies)| {
                let dependencies = dependencies
                    .iter()
                    .copied()
                    .filter(|dependency| self.items.contains_key(dependency))
                    .collect();
                (id, dependencies)
            })
            .collect();
        for item in self.items.values_mut() {
            item.depends_on = None;
        }
        let flat = flatten(&known);
        for (&id, &dependency) in &flat {
            if let Some(item) = self.items.get_mut(&id) {
                item.depends_on = Some(dependency);
            }
        }
        tracing::debug!("Set {} scope dependencies", flat.len());
        flat.len()
    }
}
