//! Topological sort over the property/binding dependency graph.
//!
//! An edge `from -> to` means "`from`'s initializer reads `to`", i.e. `from`
//! depends on `to`. The sort emits nodes with no remaining unresolved
//! dependency first — a leaf in the "depends on" sense — then works
//! outward, so for every edge `from -> to`, `to` precedes `from` in the
//! output. This is Kahn's algorithm run against out-degree rather than
//! in-degree.

use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortResult {
    Success(Vec<String>),
    LoopDetected { witness: String },
    EmptyGraph,
}

/// Sorts `nodes` given a dependency edge list `from -> to`. Nodes with no
/// outgoing edge at all are still included, ordered first (alongside any
/// other zero-out-degree node).
pub fn topological_sort(nodes: &[String], edges: &[(String, String)]) -> SortResult {
    if nodes.is_empty() {
        return SortResult::EmptyGraph;
    }

    let mut out_degree: HashMap<&str, usize> = nodes.iter().map(|n| (n.as_str(), 0)).collect();
    let mut predecessors: HashMap<&str, Vec<&str>> = nodes.iter().map(|n| (n.as_str(), Vec::new())).collect();

    for (from, to) in edges {
        // Self-dependency and duplicate edges both inflate out-degree
        // without changing which nodes can ever reach zero, so a cycle
        // through a self-edge is detected the same way as any other cycle.
        if let Some(deg) = out_degree.get_mut(from.as_str()) {
            *deg += 1;
        }
        predecessors.entry(to.as_str()).or_default().push(from.as_str());
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(|n| n.as_str())
        .filter(|n| out_degree[n] == 0)
        .collect();

    let mut emitted = Vec::with_capacity(nodes.len());
    let mut seen: HashSet<&str> = HashSet::new();

    while let Some(n) = queue.pop_front() {
        if !seen.insert(n) {
            continue;
        }
        emitted.push(n.to_string());
        if let Some(preds) = predecessors.get(n) {
            for &p in preds {
                let deg = out_degree.get_mut(p).unwrap();
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(p);
                }
            }
        }
    }

    if emitted.len() < nodes.len() {
        let witness = nodes
            .iter()
            .find(|n| out_degree[n.as_str()] > 0)
            .cloned()
            .unwrap_or_else(|| nodes[0].clone());
        return SortResult::LoopDetected { witness };
    }

    SortResult::Success(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn e(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    #[test]
    fn no_edges_emits_every_node_in_some_order() {
        let result = topological_sort(&v(&["a", "b", "c"]), &[]);
        match result {
            SortResult::Success(order) => assert_eq!(order.len(), 3),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn dependency_precedes_dependent() {
        // b depends on a: b -> a, so a must come before b.
        let result = topological_sort(&v(&["a", "b"]), &e(&[("b", "a")]));
        match result {
            SortResult::Success(order) => {
                let ai = order.iter().position(|n| n == "a").unwrap();
                let bi = order.iter().position(|n| n == "b").unwrap();
                assert!(ai < bi);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let result = topological_sort(&v(&["p"]), &e(&[("p", "p")]));
        assert!(matches!(result, SortResult::LoopDetected { witness } if witness == "p"));
    }

    #[test]
    fn mutual_dependency_is_a_cycle_with_a_witness() {
        let result = topological_sort(&v(&["p", "q"]), &e(&[("p", "q"), ("q", "p")]));
        match result {
            SortResult::LoopDetected { witness } => assert!(witness == "p" || witness == "q"),
            other => panic!("expected a loop, got {other:?}"),
        }
    }

    #[test]
    fn empty_node_set_is_reported_distinctly() {
        assert_eq!(topological_sort(&[], &[]), SortResult::EmptyGraph);
    }

    #[test]
    fn diamond_dependency_resolves_producers_before_consumers() {
        // d depends on b and c; b and c both depend on a.
        let result = topological_sort(
            &v(&["a", "b", "c", "d"]),
            &e(&[("b", "a"), ("c", "a"), ("d", "b"), ("d", "c")]),
        );
        match result {
            SortResult::Success(order) => {
                let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
                assert!(pos("a") < pos("b"));
                assert!(pos("a") < pos("c"));
                assert!(pos("b") < pos("d"));
                assert!(pos("c") < pos("d"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }
}
