use crate::{
    factory::unique_name, reset_current, text::load_templates, with_current, DefaultFactory,
    FactoryRegistry, Flag, Flags, Level, Node, NodeFactory, NodeId, NodeKind, ReferenceKey,
    Resolution, TreeError, Workspace,
};

fn suite_and_case(workspace: &mut Workspace) -> (NodeId, NodeId, NodeId) {
    let project = workspace.create_project(Some("Demo"));
    let suite = workspace
        .create_in(project, Level::Suite, NodeKind::Plain, Some("Suite"))
        .unwrap();
    let case = workspace
        .create_in(suite, Level::Case, NodeKind::Plain, Some("Case"))
        .unwrap();
    (project, suite, case)
}

#[test]
fn test_level_order() {
    assert!(Level::Project < Level::Suite);
    assert!(Level::Step < Level::Action);
    assert_eq!(Level::Project.next(), Level::Suite);
    assert_eq!(Level::Action.next(), Level::Action);
    assert_eq!(Level::Project.previous(), Level::Project);
    assert_eq!(Level::Case.previous(), Level::Suite);
    assert!(Level::Action.is_leaf());
    assert!(Level::Project.is_root());
    assert!(Level::Case.can_contain(Level::Step));
    assert!(!Level::Case.can_contain(Level::Action));
    assert!(!Level::Action.can_contain(Level::Action));
    for level in Level::ALL {
        assert_eq!(Level::from_ordinal(level.ordinal()), Some(level));
    }
    assert_eq!(Level::from_ordinal(5), None);
}

#[test]
fn test_unique_names() {
    assert_eq!(unique_name(["a", "b"], "c", "case"), "c");
    assert_eq!(unique_name(["c"], "c", "case"), "c.case.1");
    assert_eq!(unique_name(["c", "c.case.1"], "c", "case"), "c.case.2");
}

#[test]
fn test_create_in_names_uniquely() {
    let mut workspace = Workspace::new();
    let (_, suite, _) = suite_and_case(&mut workspace);
    let second = workspace
        .create_in(suite, Level::Case, NodeKind::Plain, Some("Case"))
        .unwrap();
    let third = workspace
        .create_in(suite, Level::Case, NodeKind::Plain, Some("Case"))
        .unwrap();
    let unnamed = workspace
        .create_in(suite, Level::Case, NodeKind::Plain, None)
        .unwrap();
    assert_eq!(workspace.node(second).unwrap().name, "Case.case.1");
    assert_eq!(workspace.node(third).unwrap().name, "Case.case.2");
    assert_eq!(workspace.node(unnamed).unwrap().name, "TestCase");
    assert_eq!(workspace.children(suite).len(), 4);
}

#[test]
fn test_create_project_names_uniquely() {
    let mut workspace = Workspace::new();
    let first = workspace.create_project(None);
    let second = workspace.create_project(None);
    assert_eq!(workspace.node(first).unwrap().name, "Project");
    assert_eq!(workspace.node(second).unwrap().name, "Project.project.1");
    assert_eq!(workspace.projects(), &[first, second]);
}

#[test]
fn test_attach_rejects_wrong_level() {
    let mut workspace = Workspace::new();
    let (_, suite, _) = suite_and_case(&mut workspace);
    let action = workspace.create(Level::Action, NodeKind::Plain, Some("Click"));
    assert_eq!(
        workspace.attach(suite, &[action], None),
        Err(TreeError::IncompatibleLevels {
            parent: Level::Suite,
            child: Level::Action
        })
    );
    assert_eq!(workspace.node(action).unwrap().parent(), None);
}

#[test]
fn test_attach_rejects_leaf_parent() {
    let mut workspace = Workspace::new();
    let first = workspace.create(Level::Action, NodeKind::Plain, Some("A"));
    let second = workspace.create(Level::Action, NodeKind::Plain, Some("B"));
    assert_eq!(
        workspace.attach(first, &[second], None),
        Err(TreeError::LeafContainer(first))
    );
}

#[test]
fn test_node_cannot_contain_itself() {
    let mut workspace = Workspace::new();
    let (_, suite, case) = suite_and_case(&mut workspace);
    assert_eq!(
        workspace.check_compatible(case, case),
        Err(TreeError::IncompatibleLevels {
            parent: Level::Case,
            child: Level::Case
        })
    );
    assert!(workspace.check_compatible(suite, case).is_ok());
}

#[test]
fn test_attach_rejects_roots() {
    let mut workspace = Workspace::new();
    let (project, _, _) = suite_and_case(&mut workspace);
    let other = workspace.create_project(Some("Other"));
    assert_eq!(
        workspace.attach(project, &[other], None),
        Err(TreeError::RootAttachment(other))
    );
}

#[test]
fn test_attach_at_index_and_move() {
    let mut workspace = Workspace::new();
    let (_, suite, first) = suite_and_case(&mut workspace);
    let second = workspace
        .create_in(suite, Level::Case, NodeKind::Plain, Some("Second"))
        .unwrap();
    let inserted = workspace.create(Level::Case, NodeKind::Plain, Some("Inserted"));
    workspace.attach(suite, &[inserted], Some(1)).unwrap();
    assert_eq!(workspace.children(suite), &[first, inserted, second]);

    // Moving within the same parent
    workspace.attach(suite, &[first], Some(3)).unwrap();
    assert_eq!(workspace.children(suite), &[inserted, second, first]);

    assert_eq!(
        workspace.attach(suite, &[first], Some(7)),
        Err(TreeError::IndexOutOfBounds {
            parent: suite,
            index: 7,
            len: 3
        })
    );
}

#[test]
fn test_attach_moves_between_parents() {
    let mut workspace = Workspace::new();
    let (project, suite, case) = suite_and_case(&mut workspace);
    let other = workspace
        .create_in(project, Level::Suite, NodeKind::Plain, Some("Other"))
        .unwrap();
    workspace.attach(other, &[case], None).unwrap();
    assert!(workspace.children(suite).is_empty());
    assert_eq!(workspace.children(other), &[case]);
    assert_eq!(workspace.node(case).unwrap().parent(), Some(other));
}

#[test]
fn test_detach() {
    let mut workspace = Workspace::new();
    let (_, suite, case) = suite_and_case(&mut workspace);
    let loose = workspace.create(Level::Case, NodeKind::Plain, Some("Loose"));
    workspace.detach(&[case, loose]);
    assert!(workspace.children(suite).is_empty());
    assert_eq!(workspace.node(case).unwrap().parent(), None);
    assert_eq!(workspace.node(case).unwrap().level(), Level::Case);
    assert!(workspace.contains(loose));
}

#[test]
fn test_discard_frees_subtree() {
    let mut workspace = Workspace::new();
    let (project, suite, case) = suite_and_case(&mut workspace);
    let step = workspace
        .create_in(case, Level::Step, NodeKind::Plain, None)
        .unwrap();
    workspace.discard(suite);
    assert!(!workspace.contains(suite));
    assert!(!workspace.contains(case));
    assert!(!workspace.contains(step));
    assert!(workspace.children(project).is_empty());
    assert_eq!(workspace.len(), 1);

    // Identities are not reused
    let fresh = workspace.create(Level::Suite, NodeKind::Plain, None);
    assert_ne!(fresh, suite);
    assert_ne!(fresh, case);
    assert_ne!(fresh, step);
}

#[test]
fn test_ancestors_and_descendants() {
    let mut workspace = Workspace::new();
    let (project, suite, case) = suite_and_case(&mut workspace);
    let step = workspace
        .create_in(case, Level::Step, NodeKind::Plain, None)
        .unwrap();
    let second_case = workspace
        .create_in(suite, Level::Case, NodeKind::Plain, None)
        .unwrap();
    assert_eq!(
        workspace.ancestors(step).collect::<Vec<_>>(),
        vec![case, suite, project]
    );
    assert_eq!(
        workspace.descendants(project),
        vec![suite, case, step, second_case]
    );
    assert_eq!(workspace.owning_project(step), Some(project));
}

#[test]
fn test_datasets() {
    let mut workspace = Workspace::new();
    let (project, _, _) = suite_and_case(&mut workspace);
    let other = workspace.create_project(Some("Other"));
    let first = workspace.create_dataset(project, None).unwrap();
    let second = workspace.create_dataset(project, None).unwrap();
    let elsewhere = workspace.create_dataset(other, None).unwrap();
    assert_eq!(workspace.dataset(first).unwrap().name, "Dataset");
    assert_eq!(workspace.dataset(second).unwrap().name, "Dataset.dataset.1");
    assert_eq!(workspace.dataset(elsewhere).unwrap().name, "Dataset");
    assert_eq!(workspace.datasets_of(project).count(), 2);

    let data = workspace.dataset_mut(second).unwrap();
    data.name = "Card numbers".to_owned();
    data.description = "Valid and expired cards".to_owned();
    let names: Vec<_> = workspace
        .datasets_of(project)
        .map(|(_, dataset)| dataset.name.as_str())
        .collect();
    assert_eq!(names, vec!["Dataset", "Card numbers"]);
    assert_eq!(workspace.dataset(second).unwrap().project(), project);

    workspace.discard(other);
    assert!(workspace.dataset_mut(elsewhere).is_none());
    assert!(workspace.dataset(elsewhere).is_none());
    assert!(workspace.dataset(second).is_some());

    let suite = workspace.children(project)[0];
    assert_eq!(
        workspace.create_dataset(suite, None),
        Err(TreeError::UnknownNode(suite))
    );
}

#[test]
fn test_flags() {
    let mut flags: Flags = ["X", "Y"].into_iter().collect();
    flags.set("Z", Flag::disabled());
    assert!(flags.is_enabled("X"));
    assert!(!flags.is_enabled("Z"));
    assert!(!flags.is_enabled("missing"));
    assert_eq!(flags.enabled_names().collect::<Vec<_>>(), vec!["X", "Y"]);
    flags.disable("X");
    flags.enable("Z");
    assert_eq!(flags.enabled_names().collect::<Vec<_>>(), vec!["Y", "Z"]);
    assert!(flags.remove("Y").is_some());
    assert_eq!(flags.iter().count(), 2);
}

#[derive(Debug)]
struct SlowCaseFactory;

impl NodeFactory for SlowCaseFactory {
    fn accepts(&self, level: Level, kind: &NodeKind, hint: &str) -> bool {
        level == Level::Case && matches!(kind, NodeKind::Plain) && hint.starts_with("Slow")
    }

    fn build(&self, level: Level, kind: NodeKind, name: String) -> Node {
        let mut node = Node::new(level, kind, name);
        node.flags.enable("Slow");
        node
    }
}

#[test]
fn test_factory_registry() {
    let mut registry = FactoryRegistry::default();
    registry.register(SlowCaseFactory);
    assert!(format!("{:?}", registry.detect(Level::Case, &NodeKind::Plain, "Slow one"))
        .contains("SlowCaseFactory"));
    assert!(format!("{:?}", registry.detect(Level::Case, &NodeKind::Plain, "Quick"))
        .contains(&format!("{:?}", DefaultFactory)));

    let mut workspace = Workspace::with_factories(registry);
    let (_, suite, plain) = suite_and_case(&mut workspace);
    let slow = workspace
        .create_in(suite, Level::Case, NodeKind::Plain, Some("Slow login"))
        .unwrap();
    assert!(workspace.node(slow).unwrap().flags.is_enabled("Slow"));
    assert!(!workspace.node(plain).unwrap().flags.is_enabled("Slow"));
}

#[derive(Debug)]
struct WrongLevelFactory;

impl NodeFactory for WrongLevelFactory {
    fn accepts(&self, _level: Level, _kind: &NodeKind, _hint: &str) -> bool {
        true
    }

    fn build(&self, _level: Level, _kind: NodeKind, name: String) -> Node {
        Node::new(Level::Action, NodeKind::Plain, name)
    }
}

#[test]
fn test_factory_result_is_corrected() {
    let mut workspace = Workspace::new();
    workspace.factories_mut().register(WrongLevelFactory);
    let id = workspace.create(Level::Step, NodeKind::Template, Some("T"));
    let node = workspace.node(id).unwrap();
    assert_eq!(node.level(), Level::Step);
    assert!(node.is_template());
}

fn with_templates(workspace: &mut Workspace) -> NodeId {
    let project = workspace.create_project(Some("Shared"));
    load_templates(
        workspace,
        project,
        "Template_TestCase: Login\n    TestStep: Open page\n    TestStep: Submit\n",
        None,
    )
    .unwrap();
    project
}

#[test]
fn test_reference_resolves_to_template_children() {
    let mut workspace = Workspace::new();
    with_templates(&mut workspace);
    let (_, suite, _) = suite_and_case(&mut workspace);
    let reference = workspace
        .create_in(
            suite,
            Level::Case,
            NodeKind::Reference(ReferenceKey::new("Shared", "Login")),
            Some("Login"),
        )
        .unwrap();

    let template = workspace.find_template("Shared", "Login", Level::Case).unwrap();
    assert_eq!(
        workspace.resolve(reference),
        Some(Resolution::Resolved(template))
    );
    assert_eq!(workspace.children(reference), workspace.children(template));
    assert_eq!(workspace.children(reference).len(), 2);
    assert_eq!(workspace.resolved_name(reference), Some("Login"));
    assert!(workspace.node(reference).unwrap().own_children().is_empty());
}

#[test]
fn test_reference_level_must_match() {
    let mut workspace = Workspace::new();
    with_templates(&mut workspace);
    let (_, _, case) = suite_and_case(&mut workspace);
    let reference = workspace
        .create_in(
            case,
            Level::Step,
            NodeKind::Reference(ReferenceKey::new("Shared", "Login")),
            None,
        )
        .unwrap();
    assert_eq!(workspace.resolve(reference), Some(Resolution::Dangling));
}

#[test]
fn test_dangling_reference() {
    let mut workspace = Workspace::new();
    let (_, suite, case) = suite_and_case(&mut workspace);
    let reference = workspace
        .create_in(
            suite,
            Level::Case,
            NodeKind::Reference(ReferenceKey::new("Shared", "Gone")),
            None,
        )
        .unwrap();
    assert_eq!(workspace.resolve(reference), Some(Resolution::Dangling));
    assert_eq!(workspace.resolve(case), None);
    assert!(workspace.children(reference).is_empty());
    assert_eq!(workspace.resolved_name(reference), None);
    assert_eq!(
        workspace.display_name(reference),
        "<lost reference: Shared\\Gone>"
    );
    assert_eq!(workspace.lost_references(), vec![reference]);
}

#[test]
fn test_reference_follows_template_rebuild() {
    let mut workspace = Workspace::new();
    let shared = with_templates(&mut workspace);
    let (_, suite, _) = suite_and_case(&mut workspace);
    let reference = workspace
        .create_in(
            suite,
            Level::Case,
            NodeKind::Reference(ReferenceKey::new("Shared", "Login").with_custom_name("Sign in")),
            None,
        )
        .unwrap();
    assert_eq!(workspace.resolved_name(reference), Some("Sign in"));

    load_templates(
        &mut workspace,
        shared,
        "Template_TestCase: Login\n    TestStep: Only step\n",
        None,
    )
    .unwrap();
    assert_eq!(workspace.children(reference).len(), 1);

    load_templates(&mut workspace, shared, "Template_TestCase: Logout\n", None).unwrap();
    assert_eq!(workspace.resolve(reference), Some(Resolution::Dangling));
}

#[test]
fn test_template_root_accepts_only_templates() {
    let mut workspace = Workspace::new();
    let project = workspace.create_project(Some("P"));
    let root = workspace.template_root(project).unwrap();
    assert_eq!(workspace.template_root(project).unwrap(), root);
    assert!(workspace.is_template_root(root));
    assert!(!workspace.projects().contains(&root));

    let plain = workspace.create(Level::Case, NodeKind::Plain, None);
    assert_eq!(
        workspace.attach(root, &[plain], None),
        Err(TreeError::NotATemplate(plain))
    );
    let leaf = workspace.create(Level::Action, NodeKind::Template, None);
    assert_eq!(
        workspace.attach(root, &[leaf], None),
        Err(TreeError::InvalidTemplateLevel(Level::Action))
    );
    let step = workspace.create(Level::Step, NodeKind::Template, None);
    assert!(workspace.attach(root, &[step], None).is_ok());
    assert_eq!(workspace.owning_project(step), Some(project));

    let (_, suite, _) = suite_and_case(&mut workspace);
    let case = workspace.create(Level::Case, NodeKind::Template, None);
    assert_eq!(
        workspace.attach(suite, &[case], None),
        Err(TreeError::MisplacedTemplate(case))
    );
}

#[test]
fn test_current_workspace_is_per_thread() {
    reset_current().unwrap();
    with_current(|workspace| {
        workspace.create_project(Some("Main thread"));
    })
    .unwrap();
    let seen_elsewhere =
        std::thread::spawn(|| with_current(|workspace| workspace.projects().len()).unwrap())
            .join()
            .unwrap();
    assert_eq!(seen_elsewhere, 0);
    assert_eq!(with_current(|workspace| workspace.projects().len()), Ok(1));
    reset_current().unwrap();
    assert_eq!(with_current(|workspace| workspace.is_empty()), Ok(true));
}

#[test]
fn test_current_workspace_nested_use() {
    let nested = with_current(|_| with_current(|workspace| workspace.len()));
    assert_eq!(nested, Ok(Err(TreeError::WorkspaceInUse)));
    let nested_reset = with_current(|_| reset_current());
    assert_eq!(nested_reset, Ok(Err(TreeError::WorkspaceInUse)));
    // Still usable afterwards
    assert!(with_current(|workspace| workspace.len()).is_ok());
}
