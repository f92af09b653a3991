use crate::error::{Result, TypeGraphError};
use crate::validation::{CheckOptions, DEFAULT_PLACEHOLDER_MARKERS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "typegraph.yaml";

/// Generator settings, usually read from `typegraph.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_entities")]
    pub entities: HierarchySource,
    #[serde(default = "default_predicates")]
    pub predicates: HierarchySource,
    #[serde(default = "default_placeholder_markers")]
    pub placeholder_markers: Vec<String>,
    /// Entities no emitter writes out.
    #[serde(default)]
    pub exclude_entities: Vec<String>,
    /// Fields no emitter writes out.
    #[serde(default)]
    pub exclude_fields: Vec<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Where a hierarchy lives and what its root node is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchySource {
    pub root: PathBuf,
    pub label: String,
}

fn default_entities() -> HierarchySource {
    HierarchySource {
        root: PathBuf::from("entityHierarchy"),
        label: "Item".into(),
    }
}

fn default_predicates() -> HierarchySource {
    HierarchySource {
        root: PathBuf::from("predicateHierarchy"),
        label: "EdgeOrProperty".into(),
    }
}

fn default_placeholder_markers() -> Vec<String> {
    DEFAULT_PLACEHOLDER_MARKERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            entities: default_entities(),
            predicates: default_predicates(),
            placeholder_markers: default_placeholder_markers(),
            exclude_entities: Vec::new(),
            exclude_fields: Vec::new(),
            output_dir: default_output_dir(),
        }
    }
}

impl GeneratorConfig {
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            placeholder_markers: self.placeholder_markers.clone(),
        }
    }

    /// Resolve relative paths against `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        for path in [
            &mut self.entities.root,
            &mut self.predicates.root,
            &mut self.output_dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}

/// Load a config file; relative paths inside it are taken from its directory.
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TypeGraphError::read(path, e))?;
    let config = parse_config_str(&content)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(config.resolve_paths(base))
}

pub fn parse_config_str(content: &str) -> Result<GeneratorConfig> {
    if content.trim().is_empty() {
        return Ok(GeneratorConfig::default());
    }
    let config: GeneratorConfig = serde_yaml::from_str(content)?;
    if config.entities.label.is_empty() || config.predicates.label.is_empty() {
        return Err(TypeGraphError::Config(
            "hierarchy labels must not be empty".into(),
        ));
    }
    Ok(config)
}
