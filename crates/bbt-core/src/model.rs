//! Model representation

use crate::config::Materialization;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// A SQL model discovered in the project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Model name (derived from filename without extension)
    pub name: String,

    /// Path to the source SQL file
    pub path: PathBuf,

    /// Raw SQL content (before template rendering)
    pub raw_sql: String,

    /// Compiled SQL content (after template rendering)
    #[serde(default)]
    pub compiled_sql: Option<String>,

    /// Model configuration captured from config() in the SQL
    #[serde(default)]
    pub config: ModelConfig,

    /// Upstream models referenced via ref()
    #[serde(default)]
    pub depends_on: HashSet<String>,

    /// Chain-data source tables referenced via source()
    #[serde(default)]
    pub source_deps: HashSet<String>,

    /// Schema metadata from the 1:1 .yml file, if present
    #[serde(default)]
    pub schema: Option<ModelSchema>,
}

/// Configuration for a model captured from the config() function
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Materialization strategy (view, table, or incremental)
    #[serde(default)]
    pub materialized: Option<Materialization>,

    /// Tags for selection
    #[serde(default)]
    pub tags: Vec<String>,

    /// Unique key column guarding incremental appends against duplicates
    #[serde(default)]
    pub unique_key: Option<String>,
}

/// Schema metadata for a single model (1:1 .yml file next to the .sql file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Schema format version
    pub version: u32,

    /// Model description
    #[serde(default)]
    pub description: Option<String>,

    /// Tags for selection
    #[serde(default)]
    pub tags: Vec<String>,

    /// Column definitions
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

/// Column definition in a model schema file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,

    /// Column description
    #[serde(default)]
    pub description: Option<String>,

    /// Data tests to run on this column
    #[serde(default)]
    pub tests: Vec<TestDefinition>,
}

/// A test definition: either a bare name or a parameterized map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestDefinition {
    /// Simple test with no parameters (e.g. "unique", "not_null")
    Simple(String),
    /// Parameterized test (e.g. accepted_values with a values list)
    Parameterized(std::collections::HashMap<String, TestParams>),
}

/// Parameters for parameterized tests
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestParams {
    /// Values for the accepted_values test
    #[serde(default)]
    pub values: Vec<serde_yaml::Value>,
}

/// Types of data tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    /// Column values must be unique
    Unique,
    /// Column values must not be null
    NotNull,
    /// Column values must be in the allowed list
    AcceptedValues {
        /// List of allowed values, rendered as quoted SQL literals
        values: Vec<String>,
    },
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestType::Unique => write!(f, "unique"),
            TestType::NotNull => write!(f, "not_null"),
            TestType::AcceptedValues { .. } => write!(f, "accepted_values"),
        }
    }
}

/// A data test attached to a model column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaTest {
    /// Test type
    pub test_type: TestType,

    /// Column under test
    pub column: String,

    /// Model under test
    pub model: String,
}

/// Parse a test definition into a TestType, skipping unknown names
pub fn parse_test_definition(test_def: &TestDefinition) -> Option<TestType> {
    match test_def {
        TestDefinition::Simple(name) => match name.as_str() {
            "unique" => Some(TestType::Unique),
            "not_null" => Some(TestType::NotNull),
            _ => None,
        },
        TestDefinition::Parameterized(map) => {
            let (test_name, params) = map.iter().next()?;
            match test_name.as_str() {
                "accepted_values" => {
                    let values = params
                        .values
                        .iter()
                        .map(|v| match v {
                            serde_yaml::Value::String(s) => s.clone(),
                            serde_yaml::Value::Number(n) => n.to_string(),
                            serde_yaml::Value::Bool(b) => b.to_string(),
                            _ => v.as_str().unwrap_or("").to_string(),
                        })
                        .collect();
                    Some(TestType::AcceptedValues { values })
                }
                _ => None,
            }
        }
    }
}

impl ModelSchema {
    /// Load schema from a file path
    pub fn load(path: &std::path::Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        let schema: ModelSchema = serde_yaml::from_str(&content)?;
        Ok(schema)
    }

    /// Extract data tests declared on this schema's columns
    pub fn extract_tests(&self, model_name: &str) -> Vec<SchemaTest> {
        let mut tests = Vec::new();
        for column in &self.columns {
            for test_def in &column.tests {
                if let Some(test_type) = parse_test_definition(test_def) {
                    tests.push(SchemaTest {
                        test_type,
                        column: column.name.clone(),
                        model: model_name.to_string(),
                    });
                }
            }
        }
        tests
    }
}

impl Model {
    /// Create a model from a SQL file, loading the matching 1:1 schema file
    /// (same stem with .yml or .yaml extension) when present
    pub fn from_file(path: PathBuf) -> Result<Self, CoreError> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| CoreError::ModelParseError {
                name: path.display().to_string(),
                message: "invalid file name".to_string(),
            })?
            .to_string();

        let raw_sql = std::fs::read_to_string(&path)?;
        if raw_sql.trim().is_empty() {
            return Err(CoreError::ModelParseError {
                name,
                message: "model file is empty".to_string(),
            });
        }

        let yml_path = path.with_extension("yml");
        let yaml_path = path.with_extension("yaml");
        let schema = if yml_path.exists() {
            Some(ModelSchema::load(&yml_path)?)
        } else if yaml_path.exists() {
            Some(ModelSchema::load(&yaml_path)?)
        } else {
            None
        };

        Ok(Self {
            name,
            path,
            raw_sql,
            compiled_sql: None,
            config: ModelConfig::default(),
            depends_on: HashSet::new(),
            source_deps: HashSet::new(),
            schema,
        })
    }

    /// Materialization for this model, falling back to the project default
    pub fn materialization(&self, default: Materialization) -> Materialization {
        self.config.materialized.unwrap_or(default)
    }

    /// All tags on this model: config() tags plus schema file tags
    pub fn all_tags(&self) -> HashSet<&str> {
        let mut tags: HashSet<&str> = self.config.tags.iter().map(String::as_str).collect();
        if let Some(schema) = &self.schema {
            tags.extend(schema.tags.iter().map(String::as_str));
        }
        tags
    }

    /// Data tests from the model's 1:1 schema file
    pub fn schema_tests(&self) -> Vec<SchemaTest> {
        match &self.schema {
            Some(schema) => schema.extract_tests(&self.name),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_schema() {
        let yaml = r#"
version: 1
description: "Staged blocks from the chain source"
tags:
  - staging
columns:
  - name: block_number
    description: "Block height"
    tests:
      - unique
      - not_null
  - name: miner
    tests:
      - not_null
"#;
        let schema: ModelSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.version, 1);
        assert_eq!(schema.tags, vec!["staging"]);
        assert_eq!(schema.columns.len(), 2);

        let tests = schema.extract_tests("stg_blocks");
        assert_eq!(tests.len(), 3);
        assert!(tests
            .iter()
            .any(|t| t.column == "block_number" && t.test_type == TestType::Unique));
    }

    #[test]
    fn test_parse_accepted_values() {
        let yaml = r#"
version: 1
columns:
  - name: status
    tests:
      - accepted_values:
          values: [pending, confirmed, dropped]
"#;
        let schema: ModelSchema = serde_yaml::from_str(yaml).unwrap();
        let tests = schema.extract_tests("txs");
        assert_eq!(tests.len(), 1);
        match &tests[0].test_type {
            TestType::AcceptedValues { values } => {
                assert_eq!(values, &["pending", "confirmed", "dropped"]);
            }
            _ => panic!("expected AcceptedValues"),
        }
    }

    #[test]
    fn test_unknown_test_skipped() {
        let def = TestDefinition::Simple("fibonacci".to_string());
        assert!(parse_test_definition(&def).is_none());
    }

    #[test]
    fn test_all_tags_union() {
        let model = Model {
            name: "m".to_string(),
            path: PathBuf::from("m.sql"),
            raw_sql: "SELECT 1".to_string(),
            compiled_sql: None,
            config: ModelConfig {
                materialized: None,
                tags: vec!["daily".to_string()],
                unique_key: None,
            },
            depends_on: HashSet::new(),
            source_deps: HashSet::new(),
            schema: Some(ModelSchema {
                version: 1,
                description: None,
                tags: vec!["staging".to_string(), "daily".to_string()],
                columns: vec![],
            }),
        };
        let tags = model.all_tags();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("daily"));
        assert!(tags.contains("staging"));
    }

    #[test]
    fn test_materialization_fallback() {
        let mut model = Model {
            name: "m".to_string(),
            path: PathBuf::from("m.sql"),
            raw_sql: "SELECT 1".to_string(),
            compiled_sql: None,
            config: ModelConfig::default(),
            depends_on: HashSet::new(),
            source_deps: HashSet::new(),
            schema: None,
        };
        assert_eq!(
            model.materialization(Materialization::View),
            Materialization::View
        );
        model.config.materialized = Some(Materialization::Incremental);
        assert_eq!(
            model.materialization(Materialization::View),
            Materialization::Incremental
        );
    }
}
