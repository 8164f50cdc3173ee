//! Template functions: ref(), source(), config(), var()

use minijinja::value::{Kwargs, Value};
use minijinja::Error;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Model references captured from ref() calls during a render
pub(crate) type RefCapture = Arc<Mutex<HashSet<String>>>;

/// Source tables captured from source() calls during a render
pub(crate) type SourceCapture = Arc<Mutex<HashSet<String>>>;

/// Config values captured from config() calls during a render
pub(crate) type ConfigCapture = Arc<Mutex<HashMap<String, Value>>>;

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Create the ref() function
///
/// Records the referenced model name and expands to the quoted relation name
/// the model will be materialized as.
///
/// ```jinja
/// SELECT * FROM {{ ref('stg_blocks') }}
/// ```
pub(crate) fn make_ref_fn(
    capture: RefCapture,
) -> impl Fn(&str) -> Result<String, Error> + Send + Sync + Clone + 'static {
    move |name: &str| {
        if name.is_empty() {
            return Err(Error::new(
                minijinja::ErrorKind::InvalidOperation,
                "ref() requires a model name",
            ));
        }
        capture
            .lock()
            .map_err(|e| {
                Error::new(
                    minijinja::ErrorKind::InvalidOperation,
                    format!("ref capture mutex poisoned: {e}"),
                )
            })?
            .insert(name.to_string());
        Ok(quote_ident(name))
    }
}

/// Create the source() function
///
/// Records the chain-data source table and expands to the quoted qualified
/// name. The source name is opaque to the core.
///
/// ```jinja
/// SELECT * FROM {{ source('ethereum', 'blocks') }}
/// ```
pub(crate) fn make_source_fn(
    capture: SourceCapture,
) -> impl Fn(&str, &str) -> Result<String, Error> + Send + Sync + Clone + 'static {
    move |namespace: &str, table: &str| {
        if namespace.is_empty() || table.is_empty() {
            return Err(Error::new(
                minijinja::ErrorKind::InvalidOperation,
                "source() requires a namespace and a table name",
            ));
        }
        capture
            .lock()
            .map_err(|e| {
                Error::new(
                    minijinja::ErrorKind::InvalidOperation,
                    format!("source capture mutex poisoned: {e}"),
                )
            })?
            .insert(format!("{}.{}", namespace, table));
        Ok(format!("{}.{}", quote_ident(namespace), quote_ident(table)))
    }
}

/// Create the config() function that captures model configuration
///
/// ```jinja
/// {{ config(materialized='incremental', unique_key='tx_hash', tags=['daily']) }}
/// ```
pub(crate) fn make_config_fn(
    capture: ConfigCapture,
) -> impl Fn(Kwargs) -> Result<String, Error> + Send + Sync + Clone + 'static {
    move |kwargs: Kwargs| {
        let mut captured = capture.lock().map_err(|e| {
            Error::new(
                minijinja::ErrorKind::InvalidOperation,
                format!("config capture mutex poisoned: {e}"),
            )
        })?;

        for key in kwargs.args() {
            let value = kwargs.get::<Value>(key).map_err(|e| {
                Error::new(
                    minijinja::ErrorKind::InvalidOperation,
                    format!("failed to read config kwarg '{}': {}", key, e),
                )
            })?;
            captured.insert(key.to_string(), value);
        }

        // config() contributes no SQL output
        Ok(String::new())
    }
}

/// Create the var() function backed by project vars
///
/// ```jinja
/// WHERE block_number >= {{ var('start_block', 0) }}
/// ```
pub(crate) fn make_var_fn(
    vars: HashMap<String, serde_json::Value>,
) -> impl Fn(&str, Option<Value>) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    move |name: &str, default: Option<Value>| {
        if let Some(value) = vars.get(name) {
            Ok(json_to_value(value))
        } else if let Some(default_val) = default {
            Ok(default_val)
        } else {
            Err(Error::new(
                minijinja::ErrorKind::UndefinedError,
                format!("variable '{}' is not defined and no default provided", name),
            ))
        }
    }
}

/// Convert a YAML value to JSON for template consumption
pub(crate) fn yaml_to_json(value: &serde_yaml::Value) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

fn json_to_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::from(()),
        serde_json::Value::Bool(b) => Value::from(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else {
                Value::from(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::from(s.clone()),
        serde_json::Value::Array(items) => {
            Value::from(items.iter().map(json_to_value).collect::<Vec<_>>())
        }
        serde_json::Value::Object(map) => Value::from_iter(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_value(v))),
        ),
    }
}
