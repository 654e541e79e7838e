//! Typed descriptor model.
//!
//! The external conversion layer produces generic JSON-like trees. The
//! [`DescriptorReader`] resolves the schema's field-name indirection once and
//! turns an (adapted) command tree into a [`CommandDescriptor`], so that the
//! builder never does dynamic property access.

use serde_json::{Map, Value};
use tracing::debug;

use crate::definition::{ArgumentDefinition, ArgumentMap};
use crate::error::{BuildError, Result};
use crate::helpers::split_positional;
use crate::schema::Labels;

/// Kind tag of a mutual-exclusion group.
pub const CONFLICTS_KIND: &str = "Conflicts";
/// Kind tag of an implication group.
pub const IMPLIES_KIND: &str = "Implies";

/// Reference to an argument from inside a validation group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentRef {
    pub name: String,
}

/// A cross-argument constraint over its member arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationGroup {
    /// Members are mutually exclusive.
    Conflicts(Vec<ArgumentRef>),
    /// The first member of each pair requires the second.
    Implies(Vec<ArgumentRef>),
    /// A group kind this version does not know; ignored when building.
    Unrecognized { kind: String },
}

impl ValidationGroup {
    /// Returns the group's kind tag.
    pub fn kind(&self) -> &str {
        match self {
            ValidationGroup::Conflicts(_) => CONFLICTS_KIND,
            ValidationGroup::Implies(_) => IMPLIES_KIND,
            ValidationGroup::Unrecognized { kind } => kind,
        }
    }

    /// Returns the referenced arguments (empty for unrecognized groups).
    pub fn members(&self) -> &[ArgumentRef] {
        match self {
            ValidationGroup::Conflicts(refs) | ValidationGroup::Implies(refs) => refs,
            ValidationGroup::Unrecognized { .. } => &[],
        }
    }
}

/// Node holding a command's argument definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentContainer {
    pub arguments: ArgumentMap,
}

/// A direct child of a command descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorNode {
    Arguments(ArgumentContainer),
    ArgumentGroups(Vec<ValidationGroup>),
    /// Any other kind; carried but not acted on.
    Other { kind: Option<String> },
}

/// A command, ready for registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandDescriptor {
    pub name: String,
    pub describe: Option<String>,
    /// Space-separated names of arguments supplied by position.
    pub positional: Option<String>,
    /// Whether this is the fallback command when no command name is given.
    pub is_default: bool,
    pub descendants: Vec<DescriptorNode>,
}

impl CommandDescriptor {
    /// Creates an empty command descriptor.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Returns the argument definitions of the first argument container.
    pub fn arguments(&self) -> Option<&ArgumentMap> {
        self.descendants.iter().find_map(|node| match node {
            DescriptorNode::Arguments(container) => Some(&container.arguments),
            _ => None,
        })
    }

    /// Returns the validation groups of the first group node, if any.
    pub fn validation_groups(&self) -> Option<&[ValidationGroup]> {
        self.descendants.iter().find_map(|node| match node {
            DescriptorNode::ArgumentGroups(groups) => Some(groups.as_slice()),
            _ => None,
        })
    }

    /// Returns the positional argument names in declaration order.
    pub fn positional_names(&self) -> Vec<&str> {
        self.positional.as_deref().map(split_positional).unwrap_or_default()
    }

    /// Returns `true` if `name` is one of the positional arguments.
    pub fn is_positional(&self, name: &str) -> bool {
        self.positional_names().contains(&name)
    }
}

/// Reads raw descriptor trees into typed nodes using a schema's labels.
///
/// # Examples
///
/// ```
/// use command_tree_core::{DescriptorReader, Labels};
/// use serde_json::json;
///
/// let labels = Labels::default();
/// let reader = DescriptorReader::new(&labels);
/// let command = reader.read_command(&json!({
///     "name": "copy",
///     "describe": "Copy file",
///     "positional": "from",
///     "_children": [
///         { "_": "Arguments", "_children": { "from": { "describe": "source" } } }
///     ]
/// })).unwrap();
///
/// assert_eq!(command.name, "copy");
/// assert_eq!(command.positional_names(), vec!["from"]);
/// assert!(command.arguments().unwrap().contains("from"));
/// assert!(command.validation_groups().is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DescriptorReader<'a> {
    labels: &'a Labels,
}

impl<'a> DescriptorReader<'a> {
    pub fn new(labels: &'a Labels) -> Self {
        Self { labels }
    }

    /// Reads a command descriptor.
    ///
    /// # Errors
    ///
    /// [`BuildError::MissingCommandName`] if the identifier field is absent,
    /// [`BuildError::MalformedArgument`] if an argument definition is not an
    /// object or has invalid known fields, and
    /// [`BuildError::MalformedDescriptor`] for other structural problems.
    pub fn read_command(&self, value: &Value) -> Result<CommandDescriptor> {
        let object = value.as_object().ok_or_else(|| {
            BuildError::MalformedDescriptor("command descriptor must be an object".to_string())
        })?;

        let name = object
            .get(&self.labels.command_name_id)
            .and_then(Value::as_str)
            .ok_or_else(|| BuildError::MissingCommandName(self.labels.command_name_id.clone()))?
            .to_string();

        let describe = object
            .get("describe")
            .or_else(|| object.get("description"))
            .and_then(Value::as_str)
            .map(String::from);

        let positional = match object.get("positional") {
            None | Some(Value::Null) => None,
            Some(Value::String(spec)) => Some(spec.clone()),
            Some(_) => {
                return Err(BuildError::MalformedDescriptor(format!(
                    "`positional` of command `{name}` must be a string"
                )));
            }
        };

        let is_default = match object.get("default") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => {
                return Err(BuildError::MalformedDescriptor(format!(
                    "`default` of command `{name}` must be a boolean"
                )));
            }
        };

        let descendants = match object.get(&self.labels.descendants) {
            Some(Value::Array(nodes)) => nodes
                .iter()
                .map(|node| self.read_node(&name, node))
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(CommandDescriptor {
            name,
            describe,
            positional,
            is_default,
            descendants,
        })
    }

    fn kind_of<'v>(&self, node: &'v Value) -> Option<&'v str> {
        node.get(&self.labels.elements).and_then(Value::as_str)
    }

    fn read_node(&self, command: &str, node: &Value) -> Result<DescriptorNode> {
        let kind = self.kind_of(node);
        if kind == Some(self.labels.command_options.as_str()) {
            let arguments = match node.get(&self.labels.descendants) {
                Some(Value::Object(children)) => read_arguments(command, children)?,
                _ => ArgumentMap::new(),
            };
            Ok(DescriptorNode::Arguments(ArgumentContainer { arguments }))
        } else if kind == Some(self.labels.validation_groups.as_str()) {
            let groups = match node.get(&self.labels.descendants) {
                Some(Value::Array(groups)) => groups
                    .iter()
                    .map(|group| self.read_group(command, group))
                    .collect::<Result<Vec<_>>>()?,
                _ => Vec::new(),
            };
            Ok(DescriptorNode::ArgumentGroups(groups))
        } else {
            debug!(command, kind = ?kind, "Ignoring descriptor node of unhandled kind");
            Ok(DescriptorNode::Other {
                kind: kind.map(String::from),
            })
        }
    }

    fn read_group(&self, command: &str, group: &Value) -> Result<ValidationGroup> {
        let kind = self.kind_of(group).unwrap_or_default();
        if kind != CONFLICTS_KIND && kind != IMPLIES_KIND {
            return Ok(ValidationGroup::Unrecognized {
                kind: kind.to_string(),
            });
        }

        let refs = match group.get(&self.labels.descendants) {
            Some(Value::Array(refs)) => refs
                .iter()
                .map(|r| {
                    r.get(&self.labels.command_name_id)
                        .and_then(Value::as_str)
                        .map(|name| ArgumentRef {
                            name: name.to_string(),
                        })
                        .ok_or_else(|| {
                            BuildError::MalformedDescriptor(format!(
                                "argument reference in `{kind}` group of command `{command}` \
                                 is missing its `{}` field",
                                self.labels.command_name_id
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(if kind == CONFLICTS_KIND {
            ValidationGroup::Conflicts(refs)
        } else {
            ValidationGroup::Implies(refs)
        })
    }
}

fn read_arguments(command: &str, children: &Map<String, Value>) -> Result<ArgumentMap> {
    let mut arguments = ArgumentMap::new();
    for (name, raw) in children {
        if !raw.is_object() {
            return Err(BuildError::MalformedArgument {
                command: command.to_string(),
                argument: name.clone(),
                reason: "definition is not an object".to_string(),
            });
        }
        let definition: ArgumentDefinition =
            serde_json::from_value(raw.clone()).map_err(|err| BuildError::MalformedArgument {
                command: command.to_string(),
                argument: name.clone(),
                reason: err.to_string(),
            })?;
        if !definition.extensions.is_empty() {
            debug!(
                command,
                argument = name.as_str(),
                keys = ?definition.extensions.keys().collect::<Vec<_>>(),
                "Argument carries extension keys"
            );
        }
        arguments.insert(name.clone(), definition);
    }
    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn read(value: Value) -> Result<CommandDescriptor> {
        let labels = Labels::default();
        DescriptorReader::new(&labels).read_command(&value)
    }

    #[test]
    fn test_reads_groups_and_refs() {
        let command = read(json!({
            "name": "copy",
            "_children": [
                {
                    "_": "ArgumentGroups",
                    "_children": [
                        { "_": "Conflicts", "_children": [ { "name": "log" }, { "name": "print" } ] },
                        { "_": "Implies", "_children": [ { "name": "from" }, { "name": "to" } ] },
                        { "_": "Requires", "_children": [] }
                    ]
                }
            ]
        }))
        .unwrap();

        let groups = command.validation_groups().unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].kind(), "Conflicts");
        assert_eq!(groups[0].members()[1].name, "print");
        assert_eq!(groups[1].kind(), "Implies");
        assert_eq!(
            groups[2],
            ValidationGroup::Unrecognized {
                kind: "Requires".to_string()
            }
        );
        assert!(groups[2].members().is_empty());
        assert!(command.arguments().is_none());
    }

    #[test]
    fn test_missing_descendants_is_empty_command() {
        let command = read(json!({"name": "copy", "describe": "Copy file"})).unwrap();
        assert!(command.descendants.is_empty());
        assert_eq!(command.describe.as_deref(), Some("Copy file"));
        assert!(command.positional_names().is_empty());
        assert!(!command.is_default);
    }

    #[test]
    fn test_description_fallback_and_default_flag() {
        let command = read(json!({"name": "list", "description": "List", "default": true})).unwrap();
        assert_eq!(command.describe.as_deref(), Some("List"));
        assert!(command.is_default);
    }

    #[test]
    fn test_missing_name_is_error() {
        let err = read(json!({"describe": "nameless"})).unwrap_err();
        assert!(matches!(err, BuildError::MissingCommandName(label) if label == "name"));
    }

    #[test]
    fn test_non_object_argument_is_error() {
        let err = read(json!({
            "name": "copy",
            "_children": [ { "_": "Arguments", "_children": { "to": "not an object" } } ]
        }))
        .unwrap_err();
        assert!(matches!(err, BuildError::MalformedArgument { argument, .. } if argument == "to"));
    }

    #[test]
    fn test_ref_without_identifier_is_error() {
        let err = read(json!({
            "name": "copy",
            "_children": [
                { "_": "ArgumentGroups", "_children": [ { "_": "Implies", "_children": [ { "_": "ArgumentRef" } ] } ] }
            ]
        }))
        .unwrap_err();
        assert!(matches!(err, BuildError::MalformedDescriptor(_)));
    }

    #[test]
    fn test_custom_labels() {
        let labels = Labels {
            command_name_id: "id".to_string(),
            descendants: "kids".to_string(),
            elements: "kind".to_string(),
            ..Labels::default()
        };
        let command = DescriptorReader::new(&labels)
            .read_command(&json!({
                "id": "push",
                "kids": [ { "kind": "Arguments", "kids": { "force": { "type": "boolean" } } } ]
            }))
            .unwrap();
        assert_eq!(command.name, "push");
        assert!(command.arguments().unwrap().contains("force"));
    }

    #[test]
    fn test_is_positional() {
        let command = read(json!({"name": "copy", "positional": "from to"})).unwrap();
        assert!(command.is_positional("to"));
        assert!(!command.is_positional("log"));
    }
}
