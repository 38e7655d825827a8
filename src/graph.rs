//! Dependency graph over tasks and the longest-chain (critical path) walk.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::{Task, TaskId};

/// Read-only view of the dependency edges between a set of tasks.
///
/// Edges run from a task to each of its prerequisites. Dependency IDs that
/// do not name a task in the set are dropped when the graph is built.
#[derive(Debug, Clone)]
pub struct DependencyGraph<'a> {
    tasks: &'a [Task],
    index: HashMap<&'a str, usize>,
    /// Resolved prerequisites per task, in `Task::dependencies` order.
    prerequisites: Vec<Vec<usize>>,
    /// Tasks depending on each task, in document order.
    dependents: Vec<Vec<usize>>,
}

impl<'a> DependencyGraph<'a> {
    pub fn new(tasks: &'a [Task]) -> Self {
        let mut index = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            index.entry(task.id.as_str()).or_insert(i);
        }

        let mut prerequisites = vec![Vec::new(); tasks.len()];
        let mut dependents = vec![Vec::new(); tasks.len()];
        for (i, task) in tasks.iter().enumerate() {
            for dep in &task.dependencies {
                match index.get(dep.as_str()) {
                    Some(&j) => {
                        prerequisites[i].push(j);
                        dependents[j].push(i);
                    }
                    None => {
                        tracing::warn!(task = %task.id, dependency = %dep, "dependency references unknown task");
                    }
                }
            }
        }

        Self {
            tasks,
            index,
            prerequisites,
            dependents,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&'a Task> {
        self.index.get(id).map(|&i| &self.tasks[i])
    }

    /// Position of the task in the input slice.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Prerequisites of `id` that exist in the graph.
    pub fn dependencies_of(&self, id: &str) -> Vec<&'a Task> {
        self.position(id)
            .map(|i| self.prerequisites[i].iter().map(|&j| &self.tasks[j]).collect())
            .unwrap_or_default()
    }

    /// Tasks that list `id` as a dependency.
    pub fn dependents_of(&self, id: &str) -> Vec<&'a Task> {
        self.position(id)
            .map(|i| self.dependents[i].iter().map(|&j| &self.tasks[j]).collect())
            .unwrap_or_default()
    }

    /// All resolvable edges as `(prerequisite, dependent)` positions.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.prerequisites
            .iter()
            .enumerate()
            .flat_map(|(i, deps)| deps.iter().map(move |&j| (j, i)))
    }

    /// Prerequisites-first ordering, or `None` if the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        topological_order_of(&self.prerequisites)
    }

    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_some()
    }

    /// The longest dependency chain, earliest prerequisite first.
    ///
    /// On ties the first candidate wins (dependency-list order, then
    /// document order). If the graph has cycles, every edge that closes a
    /// cycle is ignored first (see [`Self::without_cycle_edges`]), so the
    /// chain is truncated where it would come back to a task already on it.
    /// Runs in `O(tasks + dependencies)` either way.
    pub fn critical_path(&self) -> Vec<TaskId> {
        let chain = match self.topological_order() {
            Some(order) => longest_chain(&self.prerequisites, &order),
            None => {
                tracing::warn!("dependency graph contains a cycle, critical path is truncated");
                let reduced = self.without_cycle_edges();
                match topological_order_of(&reduced) {
                    Some(order) => longest_chain(&reduced, &order),
                    None => Vec::new(),
                }
            }
        };
        chain.into_iter().map(|i| self.tasks[i].id.clone()).collect()
    }

    /// Prerequisite lists with every cycle-closing edge removed.
    ///
    /// A depth-first search runs from each task in document order and
    /// follows dependents. An edge leading back to a task still open on the
    /// search stack is dropped. Removing those back edges leaves an acyclic
    /// graph. The search keeps an explicit stack, so long cycles cannot
    /// exhaust the call stack.
    pub fn without_cycle_edges(&self) -> Vec<Vec<usize>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let n = self.tasks.len();
        let mut mark = vec![Mark::New; n];
        // (dependent, prerequisite) pairs to ignore
        let mut dropped: HashSet<(usize, usize)> = HashSet::new();
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if mark[root] != Mark::New {
                continue;
            }
            mark[root] = Mark::Open;
            stack.push((root, 0));

            while let Some(frame) = stack.last_mut() {
                let (node, cursor) = *frame;
                match self.dependents[node].get(cursor) {
                    Some(&next) => {
                        frame.1 += 1;
                        match mark[next] {
                            Mark::New => {
                                mark[next] = Mark::Open;
                                stack.push((next, 0));
                            }
                            Mark::Open => {
                                dropped.insert((next, node));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        mark[node] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }

        self.prerequisites
            .iter()
            .enumerate()
            .map(|(i, deps)| {
                deps.iter()
                    .copied()
                    .filter(|&j| !dropped.contains(&(i, j)))
                    .collect()
            })
            .collect()
    }
}

/// Kahn's algorithm over per-task prerequisite lists.
fn topological_order_of(prerequisites: &[Vec<usize>]) -> Option<Vec<usize>> {
    let n = prerequisites.len();
    let mut dependents = vec![Vec::new(); n];
    for (i, deps) in prerequisites.iter().enumerate() {
        for &j in deps {
            dependents[j].push(i);
        }
    }

    let mut in_degree: Vec<usize> = prerequisites.iter().map(Vec::len).collect();
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);

    while let Some(i) = queue.pop_front() {
        order.push(i);
        for &next in &dependents[i] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    (order.len() == n).then_some(order)
}

/// Dynamic programming over a topological order of an acyclic graph.
fn longest_chain(prerequisites: &[Vec<usize>], order: &[usize]) -> Vec<usize> {
    let n = prerequisites.len();
    let mut length = vec![0usize; n];
    let mut via: Vec<Option<usize>> = vec![None; n];

    for &i in order {
        let mut best: Option<usize> = None;
        for &dep in &prerequisites[i] {
            if best.map_or(true, |b| length[dep] > length[b]) {
                best = Some(dep);
            }
        }
        length[i] = 1 + best.map_or(0, |b| length[b]);
        via[i] = best;
    }

    let mut end: Option<usize> = None;
    for i in 0..n {
        if end.map_or(true, |e| length[i] > length[e]) {
            end = Some(i);
        }
    }

    let mut chain = Vec::new();
    let mut cursor = end;
    while let Some(i) = cursor {
        chain.push(i);
        cursor = via[i];
    }
    chain.reverse();
    chain
}

/// Longest dependency chain across `tasks`, earliest first; empty for no
/// tasks.
pub fn find_critical_path(tasks: &[Task]) -> Vec<TaskId> {
    DependencyGraph::new(tasks).critical_path()
}

/// True if each consecutive pair `(a, b)` in `path` has `a` among
/// `b`'s dependencies.
pub fn is_valid_chain(tasks: &[Task], path: &[TaskId]) -> bool {
    let graph = DependencyGraph::new(tasks);
    path.iter().all(|id| graph.get(id).is_some())
        && path.windows(2).all(|pair| {
            graph
                .get(&pair[1])
                .is_some_and(|task| task.depends_on(&pair[0]))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn task(id: &str, deps: &[&str]) -> Task {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Task::new(id, id.to_uppercase(), day, day).with_dependencies(deps.iter().copied())
    }

    fn ids(path: &[&str]) -> Vec<TaskId> {
        path.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_input_has_no_path() {
        assert!(find_critical_path(&[]).is_empty());
    }

    #[test]
    fn single_task_is_its_own_path() {
        assert_eq!(find_critical_path(&[task("a", &[])]), ids(&["a"]));
    }

    #[test]
    fn linear_chain() {
        let tasks = vec![task("a", &[]), task("b", &["a"]), task("c", &["b"])];
        assert_eq!(find_critical_path(&tasks), ids(&["a", "b", "c"]));
    }

    #[test]
    fn chain_in_reverse_document_order() {
        let tasks = vec![task("c", &["b"]), task("b", &["a"]), task("a", &[])];
        assert_eq!(find_critical_path(&tasks), ids(&["a", "b", "c"]));
    }

    #[test]
    fn longest_branch_wins() {
        // d <- a, d <- c <- b
        let tasks = vec![
            task("a", &[]),
            task("b", &[]),
            task("c", &["b"]),
            task("d", &["a", "c"]),
        ];
        assert_eq!(find_critical_path(&tasks), ids(&["b", "c", "d"]));
    }

    #[test]
    fn ties_go_to_first_dependency() {
        let tasks = vec![task("a", &[]), task("b", &[]), task("c", &["b", "a"])];
        assert_eq!(find_critical_path(&tasks), ids(&["b", "c"]));
    }

    #[test]
    fn ties_between_chains_go_to_document_order() {
        let tasks = vec![
            task("a", &[]),
            task("b", &["a"]),
            task("x", &[]),
            task("y", &["x"]),
        ];
        assert_eq!(find_critical_path(&tasks), ids(&["a", "b"]));
    }

    #[test]
    fn dangling_dependencies_are_leaves() {
        let tasks = vec![task("a", &["ghost"]), task("b", &["a", "phantom"])];
        assert_eq!(find_critical_path(&tasks), ids(&["a", "b"]));
    }

    #[test]
    fn two_node_cycle_terminates() {
        let tasks = vec![task("a", &["b"]), task("b", &["a"])];
        let path = find_critical_path(&tasks);
        assert_eq!(path, ids(&["a", "b"]));
        assert!(is_valid_chain(&tasks, &path));
    }

    #[test]
    fn self_dependency_terminates() {
        let tasks = vec![task("a", &["a"]), task("b", &["a"])];
        let path = find_critical_path(&tasks);
        assert_eq!(path, ids(&["a", "b"]));
    }

    #[test]
    fn cycle_behind_a_chain_is_truncated() {
        // a <-> b, c depends on b
        let tasks = vec![task("a", &["b"]), task("b", &["a"]), task("c", &["b"])];
        let path = find_critical_path(&tasks);
        assert_eq!(path, ids(&["a", "b", "c"]));
        assert!(is_valid_chain(&tasks, &path));
    }

    #[test]
    fn acyclic_graph_keeps_every_edge() {
        let tasks = vec![
            task("a", &[]),
            task("b", &["a"]),
            task("c", &["a"]),
            task("d", &["c", "b"]),
            task("e", &["d"]),
            task("f", &["b"]),
        ];
        let graph = DependencyGraph::new(&tasks);
        assert_eq!(graph.without_cycle_edges(), graph.prerequisites);
        assert_eq!(find_critical_path(&tasks), ids(&["a", "c", "d", "e"]));
    }

    #[test]
    fn only_cycle_closing_edges_are_dropped() {
        // a -> b -> c -> a, d depends on c
        let tasks = vec![
            task("a", &["c"]),
            task("b", &["a"]),
            task("c", &["b"]),
            task("d", &["c"]),
        ];
        let graph = DependencyGraph::new(&tasks);
        assert!(!graph.is_acyclic());
        let reduced = graph.without_cycle_edges();
        assert_eq!(reduced, vec![vec![], vec![0], vec![1], vec![2]]);
        assert_eq!(find_critical_path(&tasks), ids(&["a", "b", "c", "d"]));
    }

    fn layered_with_back_edge(layers: usize) -> Vec<Task> {
        // two tasks per layer, each depending on both tasks of the layer before
        let mut tasks = Vec::with_capacity(layers * 2);
        for layer in 0..layers {
            for side in 0..2 {
                let id = format!("l{layer}s{side}");
                let deps: Vec<String> = if layer == 0 {
                    // close the loop from the last layer back to the first
                    vec![format!("l{}s0", layers - 1)]
                } else {
                    vec![format!("l{}s0", layer - 1), format!("l{}s1", layer - 1)]
                };
                tasks.push(task(&id, &[]).with_dependencies(deps));
            }
        }
        tasks
    }

    #[test]
    fn layered_graph_with_a_cycle_is_linear() {
        let tasks = layered_with_back_edge(2_000);
        let path = find_critical_path(&tasks);
        // the dropped back edges still leave one chain through every task
        assert_eq!(path.len(), tasks.len());
        assert_eq!(path.first().map(String::as_str), Some("l0s0"));
        assert!(is_valid_chain(&tasks, &path));
    }

    #[test]
    fn long_ring_does_not_exhaust_the_stack() {
        let n = 50_000;
        let tasks: Vec<Task> = (0..n)
            .map(|i| {
                let prev = if i == 0 { n - 1 } else { i - 1 };
                task(&format!("t{i}"), &[]).with_dependencies([format!("t{prev}")])
            })
            .collect();
        let path = find_critical_path(&tasks);
        assert_eq!(path.len(), n);
        assert_eq!(path.first().map(String::as_str), Some("t0"));
        assert!(is_valid_chain(&tasks, &path));
    }

    #[test]
    fn graph_queries() {
        let tasks = vec![task("a", &[]), task("b", &["a"]), task("c", &["a", "zzz"])];
        let graph = DependencyGraph::new(&tasks);
        let dependents: Vec<&str> = graph.dependents_of("a").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(dependents, vec!["b", "c"]);
        let deps: Vec<&str> = graph.dependencies_of("c").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(deps, vec!["a"]);
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(0, 1), (0, 2)]);
        assert!(graph.is_acyclic());
        assert!(graph.dependents_of("missing").is_empty());
    }

    #[test]
    fn chain_validity() {
        let tasks = vec![task("a", &[]), task("b", &["a"]), task("c", &[])];
        assert!(is_valid_chain(&tasks, &ids(&["a", "b"])));
        assert!(!is_valid_chain(&tasks, &ids(&["b", "a"])));
        assert!(!is_valid_chain(&tasks, &ids(&["a", "c"])));
        assert!(!is_valid_chain(&tasks, &ids(&["nope"])));
        assert!(is_valid_chain(&tasks, &[]));
    }
}
