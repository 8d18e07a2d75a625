//! Reduction of a dependency graph to at most one dependency per node
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// Flattens a graph of "depends on" edges so that each key depends on at most one other
///
/// Edges are taken in iteration order. When a key already has a dependency, the earlier
/// dependency is pushed down to become a dependency of the new one, so that
/// `a -> {b, c}` becomes the chain `a -> c -> b`. Self edges are dropped.
///
/// The result is lossy where chains collide, and terminates on cyclic input: every step
/// either inserts a fresh edge or removes one before going further.
pub fn flatten<K>(graph: &IndexMap<K, IndexSet<K>>) -> IndexMap<K, K>
where
    K: Hash + Eq + Clone,
{
    let mut flat = IndexMap::new();
    for (key, dependencies) in graph {
        for dependency in dependencies {
            insert_edge(&mut flat, key.clone(), dependency.clone());
        }
    }
    flat
}

fn insert_edge<K>(flat: &mut IndexMap<K, K>, key: K, value: K)
where
    K: Hash + Eq + Clone,
{
    if key == value {
        return;
    }
    if let Some(prior) = flat.shift_remove(&key) {
        insert_edge(flat, value.clone(), prior);
    }
    flat.insert(key, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(
        edges: &[(&'static str, &'static str)],
    ) -> IndexMap<&'static str, IndexSet<&'static str>> {
        let mut graph: IndexMap<_, IndexSet<_>> = IndexMap::new();
        for &(key, dependency) in edges {
            graph.entry(key).or_default().insert(dependency);
        }
        graph
    }

    #[test]
    fn test_multiple_dependencies_become_a_chain() {
        let flat = flatten(&graph(&[("a", "b"), ("a", "c")]));
        assert_eq!(flat.get("a"), Some(&"c"));
        assert_eq!(flat.get("c"), Some(&"b"));
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn test_self_edges_are_dropped() {
        let flat = flatten(&graph(&[("a", "a"), ("b", "b"), ("b", "a")]));
        assert_eq!(flat.into_iter().collect::<Vec<_>>(), vec![("b", "a")]);
    }

    #[test]
    fn test_cycles_terminate() {
        let flat = flatten(&graph(&[("a", "b"), ("b", "c"), ("c", "a")]));
        assert_eq!(flat.len(), 3);
        for (key, value) in &flat {
            assert_ne!(key, value);
        }
    }

    #[test]
    fn test_colliding_chains_terminate() {
        let flat = flatten(&graph(&[
            ("a", "b"),
            ("a", "c"),
            ("a", "a"),
            ("b", "a"),
            ("b", "c"),
            ("c", "b"),
            ("c", "a"),
        ]));
        assert!(flat.len() <= 3);
        for (key, value) in &flat {
            assert_ne!(key, value);
        }
    }

    #[test]
    fn test_chains_are_kept() {
        let flat = flatten(&graph(&[("c", "b"), ("b", "a")]));
        assert_eq!(
            flat.into_iter().collect::<Vec<_>>(),
            vec![("c", "b"), ("b", "a")]
        );
    }
}
