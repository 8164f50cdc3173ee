//! Selector parsing and model selection
//!
//! Supported expressions:
//! - `model_name` - exact model name
//! - `+model_name` - model and all ancestors
//! - `model_name+` - model and all descendants
//! - `+model_name+` - model, ancestors, and descendants
//! - `tag:daily` - models carrying the tag

use crate::dag::ModelDag;
use crate::error::{CoreError, CoreResult};
use crate::model::Model;
use std::collections::{HashMap, HashSet};

/// Parsed selector expression
#[derive(Debug, Clone, PartialEq)]
enum SelectorType {
    /// Model name with optional +prefix/suffix for ancestors/descendants
    Model {
        name: String,
        include_ancestors: bool,
        include_descendants: bool,
    },
    /// Tag-based selection
    Tag { tag: String },
}

/// A single parsed selector
#[derive(Debug)]
pub struct Selector {
    selector_type: SelectorType,
}

impl Selector {
    /// Parse a selector expression
    pub fn parse(selector: &str) -> CoreResult<Self> {
        let selector = selector.trim();

        if let Some(tag) = selector.strip_prefix("tag:") {
            if tag.is_empty() {
                return Err(CoreError::InvalidSelector {
                    selector: selector.to_string(),
                    reason: "tag: selector requires a tag name".to_string(),
                });
            }
            return Ok(Self {
                selector_type: SelectorType::Tag {
                    tag: tag.to_string(),
                },
            });
        }

        let include_ancestors = selector.starts_with('+');
        let include_descendants = selector.ends_with('+');
        let name = selector
            .trim_start_matches('+')
            .trim_end_matches('+')
            .to_string();

        if name.is_empty() {
            return Err(CoreError::InvalidSelector {
                selector: selector.to_string(),
                reason: "model name cannot be empty".to_string(),
            });
        }
        if name.contains('+') {
            return Err(CoreError::InvalidSelector {
                selector: selector.to_string(),
                reason: "'+' is only valid as a prefix or suffix".to_string(),
            });
        }

        Ok(Self {
            selector_type: SelectorType::Model {
                name,
                include_ancestors,
                include_descendants,
            },
        })
    }

    /// Apply this selector, returning the matching model names (unordered)
    fn apply(
        &self,
        models: &HashMap<String, Model>,
        dag: &ModelDag,
    ) -> CoreResult<HashSet<String>> {
        match &self.selector_type {
            SelectorType::Model {
                name,
                include_ancestors,
                include_descendants,
            } => {
                if !dag.contains(name) {
                    return Err(CoreError::InvalidSelector {
                        selector: name.clone(),
                        reason: "unknown model name".to_string(),
                    });
                }

                let mut selected = HashSet::from([name.clone()]);
                if *include_ancestors {
                    selected.extend(dag.ancestors(name));
                }
                if *include_descendants {
                    selected.extend(dag.descendants(name));
                }
                Ok(selected)
            }
            SelectorType::Tag { tag } => {
                let selected: HashSet<String> = models
                    .iter()
                    .filter(|(_, model)| model.all_tags().contains(tag.as_str()))
                    .map(|(name, _)| name.clone())
                    .collect();

                if selected.is_empty() {
                    return Err(CoreError::InvalidSelector {
                        selector: format!("tag:{}", tag),
                        reason: "no model carries this tag".to_string(),
                    });
                }
                Ok(selected)
            }
        }
    }
}

/// Resolve selector expressions into a concrete model list.
///
/// Expressions union their results; an empty list selects every model. The
/// returned list is in stable topological order, so it is directly usable as
/// an execution order. Pure function of (models, dag, expressions).
pub fn apply_selectors(
    expressions: &[String],
    models: &HashMap<String, Model>,
    dag: &ModelDag,
) -> CoreResult<Vec<String>> {
    let order = dag.topological_order()?;

    if expressions.is_empty() {
        return Ok(order);
    }

    let mut selected: HashSet<String> = HashSet::new();
    for expr in expressions {
        let selector = Selector::parse(expr)?;
        selected.extend(selector.apply(models, dag)?);
    }

    Ok(order.into_iter().filter(|m| selected.contains(m)).collect())
}
