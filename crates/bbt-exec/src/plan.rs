//! Execution planning: run units and dependency levels

use bbt_core::Materialization;
use std::collections::{HashMap, HashSet};

/// One model prepared for execution
///
/// Carries only what the executor needs: the compiled SELECT, the relation
/// name to materialize into, and the upstream names for skip propagation.
#[derive(Debug, Clone)]
pub struct ExecutableModel {
    pub name: String,
    pub sql: String,
    pub materialization: Materialization,
    pub depends_on: HashSet<String>,
    pub unique_key: Option<String>,
}

/// Group models into dependency levels
///
/// Models within one level have no edges between each other, so a level can
/// run fully in parallel once every earlier level has settled. `order` must
/// be a topological order of the selected set.
pub fn compute_levels(
    order: &[String],
    models: &HashMap<String, ExecutableModel>,
) -> Vec<Vec<String>> {
    let mut levels: Vec<Vec<String>> = Vec::new();
    let mut placed: HashSet<String> = HashSet::new();

    let order_set: HashSet<&String> = order.iter().collect();
    let mut remaining: Vec<String> = order.to_vec();

    while !remaining.is_empty() {
        let mut current: Vec<String> = Vec::new();

        for name in &remaining {
            if let Some(model) = models.get(name) {
                // Upstreams outside the selected set are treated as satisfied
                let ready = model
                    .depends_on
                    .iter()
                    .all(|dep| placed.contains(dep) || !order_set.contains(dep));
                if ready {
                    current.push(name.clone());
                }
            }
        }

        if current.is_empty() {
            // Unreachable for a valid topological order, but never loop
            levels.push(remaining.clone());
            break;
        }

        for name in &current {
            placed.insert(name.clone());
        }
        let current_set: HashSet<&String> = current.iter().collect();
        remaining.retain(|name| !current_set.contains(name));

        levels.push(current);
    }

    levels
}
