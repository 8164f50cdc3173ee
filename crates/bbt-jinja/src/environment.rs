//! Jinja environment setup for BlockBT model rendering

use crate::error::JinjaResult;
use crate::functions::{
    make_config_fn, make_ref_fn, make_source_fn, make_var_fn, yaml_to_json, ConfigCapture,
    RefCapture, SourceCapture,
};
use minijinja::{Environment, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// The outcome of rendering one model's SQL
#[derive(Debug, Clone)]
pub struct RenderedModel {
    /// Rendered SQL with reference markers expanded to relation names
    pub sql: String,

    /// Model names captured from ref() calls
    pub refs: HashSet<String>,

    /// Qualified source tables captured from source() calls
    pub sources: HashSet<String>,

    /// Raw config() keyword values
    config: HashMap<String, Value>,
}

impl RenderedModel {
    /// A string-valued config key (e.g. `materialized`, `unique_key`)
    pub fn config_str(&self, key: &str) -> Option<String> {
        self.config
            .get(key)
            .and_then(|v| v.as_str().map(String::from))
    }

    /// A string-list config key (e.g. `tags`)
    pub fn config_str_list(&self, key: &str) -> Vec<String> {
        self.config
            .get(key)
            .and_then(|v| {
                v.try_iter().ok().map(|iter| {
                    iter.filter_map(|item| item.as_str().map(String::from))
                        .collect()
                })
            })
            .unwrap_or_default()
    }
}

/// Templating environment wiring ref()/source()/config()/var() into minijinja
pub struct JinjaEnvironment<'a> {
    env: Environment<'a>,
    ref_capture: RefCapture,
    source_capture: SourceCapture,
    config_capture: ConfigCapture,
}

impl JinjaEnvironment<'_> {
    /// Create an environment with project vars available via var()
    pub fn new(vars: &HashMap<String, serde_yaml::Value>) -> Self {
        let mut env = Environment::new();

        let ref_capture: RefCapture = Arc::new(Mutex::new(HashSet::new()));
        let source_capture: SourceCapture = Arc::new(Mutex::new(HashSet::new()));
        let config_capture: ConfigCapture = Arc::new(Mutex::new(HashMap::new()));

        let json_vars: HashMap<String, serde_json::Value> = vars
            .iter()
            .map(|(k, v)| (k.clone(), yaml_to_json(v)))
            .collect();

        env.add_function("ref", make_ref_fn(ref_capture.clone()));
        env.add_function("source", make_source_fn(source_capture.clone()));
        env.add_function("config", make_config_fn(config_capture.clone()));
        env.add_function("var", make_var_fn(json_vars));

        Self {
            env,
            ref_capture,
            source_capture,
            config_capture,
        }
    }

    /// Render one model's SQL, collecting references and config as a side
    /// effect of the render. Captures are cleared per call, so one
    /// environment can render a whole project.
    pub fn render_model(&self, template: &str) -> JinjaResult<RenderedModel> {
        self.ref_capture.lock().unwrap().clear();
        self.source_capture.lock().unwrap().clear();
        self.config_capture.lock().unwrap().clear();

        let sql = self.env.render_str(template, ())?;

        Ok(RenderedModel {
            sql,
            refs: self.ref_capture.lock().unwrap().clone(),
            sources: self.source_capture.lock().unwrap().clone(),
            config: self.config_capture.lock().unwrap().clone(),
        })
    }
}

impl Default for JinjaEnvironment<'_> {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}
