//! Project discovery: builds the model registry from source directories

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::model::Model;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A loaded BlockBT project: configuration plus the model registry
#[derive(Debug)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,

    /// Project configuration
    pub config: Config,

    /// Models keyed by name
    pub models: HashMap<String, Model>,
}

impl Project {
    /// Load a project from a directory
    ///
    /// Fails before any execution when the directory is missing, the config
    /// does not parse, or any model file fails to load.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let root = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        if !root.exists() {
            return Err(CoreError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }

        let config = Config::load_from_dir(&root)?;
        let models = Self::discover_models(&root, &config)?;

        Ok(Self {
            root,
            config,
            models,
        })
    }

    /// Discover all SQL model files under the configured model paths
    fn discover_models(root: &Path, config: &Config) -> CoreResult<HashMap<String, Model>> {
        let mut models = HashMap::new();

        for model_path in config.model_paths_absolute(root) {
            if !model_path.exists() {
                continue;
            }
            Self::discover_models_recursive(&model_path, &mut models)?;
        }

        Ok(models)
    }

    fn discover_models_recursive(
        dir: &Path,
        models: &mut HashMap<String, Model>,
    ) -> CoreResult<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                Self::discover_models_recursive(&path, models)?;
            } else if path.extension().is_some_and(|e| e == "sql") {
                let model = Model::from_file(path)?;

                if models.contains_key(&model.name) {
                    return Err(CoreError::DuplicateModel {
                        name: model.name.clone(),
                    });
                }

                models.insert(model.name.clone(), model);
            }
        }

        Ok(())
    }

    /// Get a model by name
    pub fn get_model(&self, name: &str) -> CoreResult<&Model> {
        self.models.get(name).ok_or_else(|| CoreError::ModelNotFound {
            name: name.to_string(),
        })
    }

    /// Get a mutable model by name
    pub fn get_model_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.models.get_mut(name)
    }

    /// All model names, sorted for stable output
    pub fn model_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The target directory path
    pub fn target_dir(&self) -> PathBuf {
        self.config.target_path_absolute(&self.root)
    }

    /// Directory where compiled SQL is written
    pub fn compiled_dir(&self) -> PathBuf {
        self.target_dir().join("compiled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_project(dir: &Path) {
        fs::write(dir.join("bbt_project.yml"), "name: test_project\n").unwrap();
        fs::create_dir_all(dir.join("models/staging")).unwrap();
        fs::write(
            dir.join("models/staging/stg_blocks.sql"),
            "SELECT * FROM {{ source('ethereum', 'blocks') }}",
        )
        .unwrap();
        fs::write(
            dir.join("models/block_stats.sql"),
            "SELECT COUNT(*) AS n FROM {{ ref('stg_blocks') }}",
        )
        .unwrap();
    }

    #[test]
    fn test_load_project() {
        let dir = tempdir().unwrap();
        write_project(dir.path());

        let project = Project::load(dir.path()).unwrap();
        assert_eq!(project.config.name, "test_project");
        assert_eq!(project.models.len(), 2);
        assert_eq!(project.model_names(), vec!["block_stats", "stg_blocks"]);
    }

    #[test]
    fn test_get_model_missing() {
        let dir = tempdir().unwrap();
        write_project(dir.path());

        let project = Project::load(dir.path()).unwrap();
        let result = project.get_model("no_such_model");
        assert!(matches!(result, Err(CoreError::ModelNotFound { .. })));
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let dir = tempdir().unwrap();
        write_project(dir.path());
        // Same stem in a different subdirectory
        fs::create_dir_all(dir.path().join("models/marts")).unwrap();
        fs::write(
            dir.path().join("models/marts/stg_blocks.sql"),
            "SELECT 1",
        )
        .unwrap();

        let result = Project::load(dir.path());
        assert!(matches!(result, Err(CoreError::DuplicateModel { .. })));
    }

    #[test]
    fn test_missing_project_dir() {
        let result = Project::load(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(CoreError::ProjectNotFound { .. })));
    }

    #[test]
    fn test_empty_model_file_rejected() {
        let dir = tempdir().unwrap();
        write_project(dir.path());
        fs::write(dir.path().join("models/empty.sql"), "   \n").unwrap();

        let result = Project::load(dir.path());
        assert!(matches!(result, Err(CoreError::ModelParseError { .. })));
    }
}
