//! Dependency graph building and deterministic topological ordering

use crate::error::{CoreError, CoreResult};
use crate::model::Model;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BinaryHeap, HashMap, HashSet};

/// A directed acyclic graph of model dependencies
///
/// Nodes hold model names only; the registry keeps ownership of the models
/// themselves. Edges point from a dependency to its dependent, so topological
/// order yields dependencies first.
#[derive(Debug)]
pub struct ModelDag {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl ModelDag {
    /// Create a new empty DAG
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Build the DAG from the registry's models
    ///
    /// Every `depends_on` entry must name a model in the registry; source
    /// dependencies are opaque externals and never become edges. Fails with
    /// `UnresolvedReference` or `CircularDependency`.
    pub fn build(models: &HashMap<String, Model>) -> CoreResult<Self> {
        let mut dag = Self::new();

        for name in models.keys() {
            dag.add_node(name);
        }

        for (name, model) in models {
            for dep in &model.depends_on {
                if !models.contains_key(dep) {
                    return Err(CoreError::UnresolvedReference {
                        model: name.clone(),
                        reference: dep.clone(),
                    });
                }
                dag.add_edge(dep, name);
            }
        }

        dag.validate()?;
        Ok(dag)
    }

    /// Build from a plain name -> dependencies map (used by tests and callers
    /// that have already resolved references)
    pub fn from_dependencies(dependencies: &HashMap<String, Vec<String>>) -> CoreResult<Self> {
        let mut dag = Self::new();

        for name in dependencies.keys() {
            dag.add_node(name);
        }
        for (name, deps) in dependencies {
            for dep in deps {
                if !dependencies.contains_key(dep) {
                    return Err(CoreError::UnresolvedReference {
                        model: name.clone(),
                        reference: dep.clone(),
                    });
                }
                dag.add_edge(dep, name);
            }
        }

        dag.validate()?;
        Ok(dag)
    }

    fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(name) {
            idx
        } else {
            let idx = self.graph.add_node(name.to_string());
            self.node_map.insert(name.to_string(), idx);
            idx
        }
    }

    /// Add an edge from a dependency to its dependent
    fn add_edge(&mut self, dep: &str, dependent: &str) {
        let dep_idx = self.add_node(dep);
        let dependent_idx = self.add_node(dependent);
        self.graph.add_edge(dep_idx, dependent_idx, ());
    }

    /// Validate acyclicity, reporting the cycle path on failure
    pub fn validate(&self) -> CoreResult<()> {
        match self.find_cycle() {
            None => Ok(()),
            Some(cycle) => Err(CoreError::CircularDependency {
                cycle: cycle.join(" -> "),
            }),
        }
    }

    /// Iterative DFS over node indices with an explicit recursion stack.
    ///
    /// Returns the cycle path (first node repeated at the end) when a
    /// neighbor still on the current path is revisited.
    fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnPath,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.graph.node_count()];

        for start in self.graph.node_indices() {
            if marks[start.index()] != Mark::Unvisited {
                continue;
            }

            let mut stack = vec![(start, self.graph.neighbors(start))];
            let mut path = vec![start];
            marks[start.index()] = Mark::OnPath;

            while let Some((_, neighbors)) = stack.last_mut() {
                if let Some(next) = neighbors.next() {
                    match marks[next.index()] {
                        Mark::Unvisited => {
                            marks[next.index()] = Mark::OnPath;
                            path.push(next);
                            stack.push((next, self.graph.neighbors(next)));
                        }
                        Mark::OnPath => {
                            // Revisited a node on the current path: cycle.
                            let pos = path.iter().position(|&n| n == next)?;
                            let mut cycle: Vec<String> = path[pos..]
                                .iter()
                                .map(|&n| self.graph[n].clone())
                                .collect();
                            cycle.push(self.graph[next].clone());
                            return Some(cycle);
                        }
                        Mark::Done => {}
                    }
                } else {
                    let (node, _) = stack.pop()?;
                    marks[node.index()] = Mark::Done;
                    path.pop();
                }
            }
        }

        None
    }

    /// Topological order with ties broken by model name ascending.
    ///
    /// Kahn's algorithm over a min-heap keyed on name, so repeated runs over
    /// unchanged input produce an identical execution order.
    pub fn topological_order(&self) -> CoreResult<Vec<String>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                (
                    idx,
                    self.graph
                        .neighbors_directed(idx, petgraph::Direction::Incoming)
                        .count(),
                )
            })
            .collect();

        let mut ready: BinaryHeap<std::cmp::Reverse<(String, NodeIndex)>> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&idx, _)| std::cmp::Reverse((self.graph[idx].clone(), idx)))
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());

        while let Some(std::cmp::Reverse((name, idx))) = ready.pop() {
            order.push(name);
            for next in self.graph.neighbors(idx) {
                let deg = in_degree.get_mut(&next).map(|d| {
                    *d -= 1;
                    *d
                });
                if deg == Some(0) {
                    ready.push(std::cmp::Reverse((self.graph[next].clone(), next)));
                }
            }
        }

        if order.len() != self.graph.node_count() {
            let cycle = self
                .find_cycle()
                .map(|c| c.join(" -> "))
                .unwrap_or_else(|| "unknown".to_string());
            return Err(CoreError::CircularDependency { cycle });
        }

        Ok(order)
    }

    /// Direct dependencies of a model
    pub fn dependencies(&self, model: &str) -> Vec<String> {
        match self.node_map.get(model) {
            Some(&idx) => self
                .graph
                .neighbors_directed(idx, petgraph::Direction::Incoming)
                .map(|n| self.graph[n].clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// All transitive dependencies (ancestors) of a model
    pub fn ancestors(&self, model: &str) -> Vec<String> {
        self.collect_reachable(model, petgraph::Direction::Incoming)
    }

    /// All transitive dependents (descendants) of a model
    pub fn descendants(&self, model: &str) -> Vec<String> {
        self.collect_reachable(model, petgraph::Direction::Outgoing)
    }

    fn collect_reachable(&self, model: &str, direction: petgraph::Direction) -> Vec<String> {
        let Some(&start) = self.node_map.get(model) else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(start);
        let mut pending = vec![start];

        while let Some(current) = pending.pop() {
            for neighbor in self.graph.neighbors_directed(current, direction) {
                if visited.insert(neighbor) {
                    result.push(self.graph[neighbor].clone());
                    pending.push(neighbor);
                }
            }
        }

        result
    }

    /// Check if a model exists in the DAG
    pub fn contains(&self, model: &str) -> bool {
        self.node_map.contains_key(model)
    }

    /// All model names in the DAG
    pub fn models(&self) -> Vec<String> {
        self.node_map.keys().cloned().collect()
    }
}

impl Default for ModelDag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
