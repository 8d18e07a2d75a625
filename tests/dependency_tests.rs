use casetext::dependencies::DependencyFile;
use indoc::indoc;

#[test]
fn test_dependency_file() {
    let file = DependencyFile::try_from(indoc! {r#"
        [dependencies]
        checkout = ["login", "basket"]
        basket = ["login"]
    "#})
    .unwrap();
    assert_eq!(file.dependencies.len(), 2);

    let graph = file.graph();
    assert_eq!(graph.keys().collect::<Vec<_>>(), vec!["basket", "checkout"]);
    assert_eq!(
        graph["checkout"].iter().collect::<Vec<_>>(),
        vec!["login", "basket"]
    );
}

#[test]
fn test_dependency_file_flatten() {
    let file = DependencyFile::try_from(indoc! {r#"
        [dependencies]
        checkout = ["login", "basket"]
        basket = ["login"]
    "#})
    .unwrap();
    let flat: Vec<_> = file
        .flatten()
        .into_iter()
        .map(|(name, dependency)| format!("{name} -> {dependency}"))
        .collect();
    assert_eq!(flat, vec!["basket -> login", "checkout -> basket"]);
}

#[test]
fn test_empty_dependency_file() {
    let file = DependencyFile::try_from("").unwrap();
    assert!(file.flatten().is_empty());
}

#[test]
fn test_bad_dependency_file() {
    assert!(DependencyFile::try_from("dependencies = 1").is_err());
    assert!(DependencyFile::try_from("[dependencies]\na = \"b\"").is_err());
    let error = DependencyFile::load("/no/such/deps.toml").unwrap_err();
    assert!(format!("{error:#}").contains("Reading dependency file"));
}
