use std::{cell::RefCell, fmt::Display};

use crate::{
    factory::{unique_name, FactoryRegistry},
    Level, Node, NodeId, NodeKind, TreeError,
};

type Result<T, E = TreeError> = std::result::Result<T, E>;

/// Owner of every node, project, template root and dataset of one job
///
/// All structural operations go through the workspace, which keeps parent pointers and
/// child lists consistent.
#[derive(Debug, Default)]
pub struct Workspace {
    nodes: Vec<Option<Node>>,
    projects: Vec<NodeId>,
    template_roots: Vec<NodeId>,
    datasets: Vec<Option<Dataset>>,
    factories: FactoryRegistry,
}

/// Identity of a [`Dataset`] within a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetId(usize);

impl Display for DatasetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dataset#{}", self.0)
    }
}

/// Named test data owned by a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    project: NodeId,
    /// Unique among the datasets of the owning project
    pub name: String,
    /// Free text description
    pub description: String,
}

impl Dataset {
    /// The project owning this dataset
    pub fn project(&self) -> NodeId {
        self.project
    }
}

impl Workspace {
    /// Creates an empty workspace
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an empty workspace using the given factories
    pub fn with_factories(factories: FactoryRegistry) -> Self {
        Workspace {
            factories,
            ..Default::default()
        }
    }

    /// The factories used to create nodes
    pub fn factories_mut(&mut self) -> &mut FactoryRegistry {
        &mut self.factories
    }

    /// Returns the node, if it exists
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Returns the node for modification, if it exists
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Returns the node, or an error if it does not exist
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Returns the node for modification, or an error if it does not exist
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Returns true if the node exists
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// The number of nodes held, attached or not
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns true if the workspace holds no nodes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a detached node
    ///
    /// An empty or missing name is replaced by the default name of the level.
    pub fn create(&mut self, level: Level, kind: NodeKind, name: Option<&str>) -> NodeId {
        let base = name
            .filter(|name| !name.is_empty())
            .unwrap_or(level.default_name());
        let name = base.to_owned();
        self.build(level, kind, base, name)
    }

    /// Creates a node and appends it to `parent`, giving it a name unique among its siblings
    pub fn create_in(
        &mut self,
        parent: NodeId,
        level: Level,
        kind: NodeKind,
        name: Option<&str>,
    ) -> Result<NodeId> {
        let base = name
            .filter(|name| !name.is_empty())
            .unwrap_or(level.default_name());
        let siblings = self.sibling_names(parent)?;
        let name = unique_name(
            siblings.iter().map(String::as_str),
            base,
            kind.slug(level),
        );
        let id = self.build(level, kind, base, name);
        if let Err(e) = self.attach(parent, &[id], None) {
            self.discard(id);
            return Err(e);
        }
        Ok(id)
    }

    fn build(&mut self, level: Level, kind: NodeKind, hint: &str, name: String) -> NodeId {
        let factory = self.factories.detect(level, &kind, hint);
        let mut node = factory.build(level, kind.clone(), name);
        if node.level != level || node.kind != kind {
            tracing::warn!(
                "Factory {:?} built {} when asked for {:?} {}; correcting",
                factory,
                node,
                kind,
                level
            );
            node.level = level;
            node.kind = kind;
        }
        node.parent = None;
        node.children.clear();
        self.insert(node)
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    fn sibling_names(&self, parent: NodeId) -> Result<Vec<String>> {
        Ok(self
            .node(parent)?
            .children
            .iter()
            .filter_map(|&child| self.get(child))
            .map(|child| child.name.clone())
            .collect())
    }

    /// Creates a new project root, named uniquely among the projects
    pub fn create_project(&mut self, name: Option<&str>) -> NodeId {
        let base = name
            .filter(|name| !name.is_empty())
            .unwrap_or(Level::ROOT.default_name());
        let name = unique_name(
            self.projects
                .iter()
                .filter_map(|&id| self.get(id))
                .map(|project| project.name.as_str())
                .collect::<Vec<_>>(),
            base,
            Level::ROOT.slug(),
        );
        let id = self.build(Level::ROOT, NodeKind::Plain, base, name);
        self.projects.push(id);
        id
    }

    /// The project roots, in creation order
    pub fn projects(&self) -> &[NodeId] {
        &self.projects
    }

    /// Finds a project by name
    pub fn project_named(&self, name: &str) -> Option<NodeId> {
        self.projects
            .iter()
            .copied()
            .find(|&id| self.get(id).map(|p| p.name == name).unwrap_or(false))
    }

    /// The template roots of all projects
    pub fn template_roots(&self) -> &[NodeId] {
        &self.template_roots
    }

    /// Returns true if the node is the template root of some project
    pub fn is_template_root(&self, id: NodeId) -> bool {
        self.template_roots.contains(&id)
    }

    /// Finds the template root of a project, if it has one
    pub fn find_template_root(&self, project: NodeId) -> Option<NodeId> {
        let name = &self.get(project)?.name;
        self.template_roots
            .iter()
            .copied()
            .find(|&id| self.get(id).map(|root| &root.name == name).unwrap_or(false))
    }

    /// Returns the template root of a project, creating it if needed
    pub fn template_root(&mut self, project: NodeId) -> Result<NodeId> {
        if let Some(root) = self.find_template_root(project) {
            return Ok(root);
        }
        let name = self.node(project)?.name.clone();
        let id = self.insert(Node::new(Level::ROOT, NodeKind::Plain, name));
        self.template_roots.push(id);
        Ok(id)
    }

    /// The project a node belongs to, found through its ancestors
    ///
    /// Nodes inside a template root belong to the project of the same name.
    pub fn owning_project(&self, id: NodeId) -> Option<NodeId> {
        let top = self.ancestors(id).last().unwrap_or(id);
        if self.projects.contains(&top) {
            Some(top)
        } else if self.template_roots.contains(&top) {
            self.project_named(&self.get(top)?.name)
        } else {
            None
        }
    }

    /// Iterates from the parent of `id` up to its root
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            workspace: self,
            next: self.get(id).and_then(Node::parent),
        }
    }

    /// All nodes stored beneath `id` (not following references), depth first, pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self
            .get(id)
            .map(|node| node.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            found.push(next);
            if let Some(node) = self.get(next) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        found
    }

    /// Checks whether `child` may be placed directly in `parent`
    ///
    /// This is a pure predicate over the two nodes; it does not look at any other children.
    pub fn check_compatible(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if self.projects.contains(&child) || self.template_roots.contains(&child) {
            return Err(TreeError::RootAttachment(child));
        }
        if self.template_roots.contains(&parent) {
            if !child_node.is_template() {
                return Err(TreeError::NotATemplate(child));
            }
            if child_node.level.is_root() || child_node.level.is_leaf() {
                return Err(TreeError::InvalidTemplateLevel(child_node.level));
            }
            return Ok(());
        }
        if child_node.is_template() {
            return Err(TreeError::MisplacedTemplate(child));
        }
        if parent_node.level.is_leaf() {
            return Err(TreeError::LeafContainer(parent));
        }
        if parent_node.reference().is_some() {
            return Err(TreeError::ReferenceContainer(parent));
        }
        if !parent_node.level.can_contain(child_node.level) {
            return Err(TreeError::IncompatibleLevels {
                parent: parent_node.level,
                child: child_node.level,
            });
        }
        if parent == child || self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(TreeError::CyclicAttachment { parent, child });
        }
        Ok(())
    }

    /// Attaches nodes to `parent`, at `at` or at the end, keeping their order
    ///
    /// Nodes already attached elsewhere are moved. Nothing changes if any node fails the
    /// [compatibility check][Workspace::check_compatible].
    pub fn attach(&mut self, parent: NodeId, nodes: &[NodeId], at: Option<usize>) -> Result<()> {
        for &child in nodes {
            self.check_compatible(parent, child)?;
        }
        let len = self.node(parent)?.children.len();
        let mut index = at.unwrap_or(len);
        if index > len {
            return Err(TreeError::IndexOutOfBounds { parent, index, len });
        }
        for (position, &child) in nodes.iter().enumerate() {
            if nodes[..position].contains(&child) {
                continue;
            }
            // Moving within the same parent shifts the insertion point
            let current = self
                .get(parent)
                .and_then(|p| p.children.iter().position(|&c| c == child));
            if let Some(current) = current {
                if current < index {
                    index -= 1;
                }
            }
            self.unlink(child);
            self.node_mut(child)?.parent = Some(parent);
            self.node_mut(parent)?.children.insert(index, child);
            index += 1;
        }
        Ok(())
    }

    /// Removes nodes from their parents' child lists; nodes not attached are ignored
    pub fn detach(&mut self, nodes: &[NodeId]) {
        for &id in nodes {
            self.unlink(id);
            if let Some(node) = self.get_mut(id) {
                node.parent = None;
            }
        }
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).and_then(Node::parent) else {
            return;
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.retain(|&child| child != id);
        }
    }

    /// Replaces the whole child list of `parent`, returning the previous children
    ///
    /// The previous children are left detached, but still know their former parent, so that
    /// their position in the old tree can be described after the rebuild.
    pub fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> Result<Vec<NodeId>> {
        for &child in &children {
            self.check_compatible(parent, child)?;
        }
        for &child in &children {
            self.unlink(child);
        }
        let old = std::mem::take(&mut self.node_mut(parent)?.children);
        for &child in &children {
            self.node_mut(child)?.parent = Some(parent);
        }
        self.node_mut(parent)?.children = children;
        Ok(old)
    }

    /// Frees a node and everything stored beneath it
    ///
    /// The node is first removed from its parent's child list (if it is still there).
    pub fn discard(&mut self, id: NodeId) {
        self.unlink(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(next.0).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        self.projects.retain(|&project| project != id);
        self.template_roots.retain(|&root| root != id);
        for slot in self.datasets.iter_mut() {
            if slot.as_ref().map(|dataset| dataset.project == id).unwrap_or(false) {
                *slot = None;
            }
        }
    }

    /// Creates a dataset for a project, named uniquely among that project's datasets
    pub fn create_dataset(&mut self, project: NodeId, name: Option<&str>) -> Result<DatasetId> {
        if !self.projects.contains(&project) {
            return Err(TreeError::UnknownNode(project));
        }
        let base = name.filter(|name| !name.is_empty()).unwrap_or("Dataset");
        let name = unique_name(
            self.datasets
                .iter()
                .flatten()
                .filter(|dataset| dataset.project == project)
                .map(|dataset| dataset.name.as_str())
                .collect::<Vec<_>>(),
            base,
            "dataset",
        );
        self.datasets.push(Some(Dataset {
            project,
            name,
            description: String::new(),
        }));
        Ok(DatasetId(self.datasets.len() - 1))
    }

    /// Returns the dataset, if it exists
    pub fn dataset(&self, id: DatasetId) -> Option<&Dataset> {
        self.datasets.get(id.0).and_then(Option::as_ref)
    }

    /// Returns the dataset for modification, if it exists
    pub fn dataset_mut(&mut self, id: DatasetId) -> Option<&mut Dataset> {
        self.datasets.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Iterates over the datasets of a project
    pub fn datasets_of(&self, project: NodeId) -> impl Iterator<Item = (DatasetId, &Dataset)> {
        self.datasets
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|dataset| (DatasetId(index), dataset)))
            .filter(move |(_, dataset)| dataset.project == project)
    }
}

/// Iterator over the ancestors of a node, see [`Workspace::ancestors`]
pub struct Ancestors<'w> {
    workspace: &'w Workspace,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.workspace.get(current).and_then(Node::parent);
        Some(current)
    }
}

thread_local! {
    static CURRENT: RefCell<Workspace> = RefCell::new(Workspace::new());
}

/// Runs `f` with the current thread's workspace
///
/// Each thread lazily gets its own workspace, so jobs on different threads never see each
/// other's trees. A thread reused for an unrelated job must call [`reset_current`] first.
/// Fails with [`TreeError::WorkspaceInUse`] when called from within `f`.
pub fn with_current<R>(f: impl FnOnce(&mut Workspace) -> R) -> Result<R> {
    CURRENT.with(|workspace| {
        let mut workspace = workspace
            .try_borrow_mut()
            .map_err(|_| TreeError::WorkspaceInUse)?;
        Ok(f(&mut workspace))
    })
}

/// Replaces the current thread's workspace with an empty one
pub fn reset_current() -> Result<()> {
    with_current(|workspace| *workspace = Workspace::new())
}
