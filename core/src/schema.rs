//! Conversion schema: which descriptor fields carry structure.
//!
//! The descriptor tree is produced by an external JSON/XML-to-object layer, so
//! the names of its structural fields (identifier, children, kind tag) are not
//! fixed. A [`ConversionSchema`] names them, lists the keys to strip from
//! argument definitions, and locates the collective of commands inside a
//! larger container.
//!
//! # Example YAML
//!
//! ```yaml
//! labels:
//!   commandNameId: name
//!   commandOptions: Arguments
//!   descendants: _children
//!   elements: _
//!   validationGroups: ArgumentGroups
//! exclusions:
//!   options: [name, _]
//! paths:
//!   collective: cli/commands
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Field and kind names used to walk a descriptor tree.
///
/// # Examples
///
/// ```
/// # use command_tree_core::Labels;
/// let labels = Labels::default();
/// assert_eq!(labels.command_name_id, "name");
/// assert_eq!(labels.descendants, "_children");
/// assert_eq!(labels.elements, "_");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Labels {
    /// Field holding a command's (or argument ref's) identifier.
    pub command_name_id: String,
    /// Kind of the node that holds a command's argument definitions.
    pub command_options: String,
    /// Field holding a node's children.
    pub descendants: String,
    /// Field holding a node's kind tag.
    pub elements: String,
    /// Kind of the node that holds a command's validation groups.
    pub validation_groups: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            command_name_id: "name".to_string(),
            command_options: "Arguments".to_string(),
            descendants: "_children".to_string(),
            elements: "_".to_string(),
            validation_groups: "ArgumentGroups".to_string(),
        }
    }
}

/// Keys removed from descriptor content before it reaches the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exclusions {
    /// Keys stripped from every argument definition.
    pub options: Vec<String>,
}

impl Default for Exclusions {
    fn default() -> Self {
        Self {
            options: vec!["name".to_string(), "_".to_string()],
        }
    }
}

/// Locations inside a container document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Slash-separated path to the collective of commands.
    pub collective: String,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            collective: "commands".to_string(),
        }
    }
}

/// Complete conversion schema.
///
/// Loaded from JSON or YAML; every key is optional and falls back to the
/// defaults shown on [`Labels`], [`Exclusions`] and [`Paths`].
///
/// # Examples
///
/// ```
/// # use command_tree_core::ConversionSchema;
/// let schema = ConversionSchema::from_json_str(
///     r#"{ "labels": { "descendants": "children" }, "paths": { "collective": "cli/commands" } }"#,
/// ).unwrap();
/// assert_eq!(schema.labels.descendants, "children");
/// assert_eq!(schema.labels.elements, "_");
/// assert_eq!(schema.paths.collective, "cli/commands");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSchema {
    pub labels: Labels,
    pub exclusions: Exclusions,
    pub paths: Paths,
}

impl ConversionSchema {
    /// Parses a schema from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a schema from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a schema from a file.
    ///
    /// Files ending in `.yaml` or `.yml` are read as YAML, everything else as
    /// JSON.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::BuildError::IoError) if the file cannot be
    /// read, or a [`JsonError`](crate::BuildError::JsonError) /
    /// [`YamlError`](crate::BuildError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        if is_yaml_path(path) {
            Ok(serde_yaml::from_reader(reader)?)
        } else {
            Ok(serde_json::from_reader(reader)?)
        }
    }

    /// Returns `true` if `key` is excluded from argument definitions.
    pub fn is_excluded_option(&self, key: &str) -> bool {
        self.exclusions.options.iter().any(|k| k == key)
    }
}

/// Returns `true` if `path` has a YAML file extension.
pub fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}
