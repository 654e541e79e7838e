//! Argument definitions in the parser's option vocabulary.
//!
//! An [`ArgumentDefinition`] is the part of a descriptor that is handed to the
//! argument parser. Known fields are typed so that a misspelling of a known
//! key shows up as an unknown extension instead of silently doing nothing;
//! everything else is kept in [`ArgumentDefinition::extensions`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value type of an argument.
///
/// # Examples
///
/// ```
/// # use command_tree_core::ArgumentType;
/// let ty: ArgumentType = serde_json::from_str("\"boolean\"").unwrap();
/// assert_eq!(ty, ArgumentType::Boolean);
/// assert_eq!(ArgumentType::default(), ArgumentType::String);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    /// Single string value (the default).
    #[default]
    String,
    /// Single numeric value.
    Number,
    /// Flag without a value.
    Boolean,
    /// Flag counted by occurrence (`-vvv`).
    Count,
    /// One or more values.
    Array,
}

/// A single alias or a list of aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Aliases {
    One(String),
    Many(Vec<String>),
}

impl Aliases {
    /// Iterates the aliases in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            Aliases::One(alias) => std::slice::from_ref(alias),
            Aliases::Many(aliases) => aliases.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

/// Definition of a single argument.
///
/// # Examples
///
/// ```
/// # use command_tree_core::{ArgumentDefinition, ArgumentType};
/// let def: ArgumentDefinition = serde_json::from_value(serde_json::json!({
///     "alias": "t",
///     "describe": "destination file location",
///     "demandOption": true,
///     "coerce": "path"
/// })).unwrap();
///
/// assert!(def.is_required());
/// assert_eq!(def.aliases().collect::<Vec<_>>(), vec!["t"]);
/// assert_eq!(def.effective_type(), ArgumentType::String);
/// assert!(def.extensions.contains_key("coerce"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<Aliases>,
    #[serde(
        default,
        alias = "description",
        alias = "desc",
        skip_serializing_if = "Option::is_none"
    )]
    pub describe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_option: Option<bool>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ArgumentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    /// Keys outside the known vocabulary, kept verbatim.
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl ArgumentDefinition {
    /// Returns `true` if the argument must be supplied.
    pub fn is_required(&self) -> bool {
        self.demand_option.unwrap_or(false)
    }

    /// Iterates declared aliases.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.alias.iter().flat_map(Aliases::iter)
    }

    /// Returns the declared type, or one inferred from the default value.
    pub fn effective_type(&self) -> ArgumentType {
        if let Some(ty) = self.value_type {
            return ty;
        }
        match &self.default {
            Some(Value::Bool(_)) => ArgumentType::Boolean,
            Some(Value::Number(_)) => ArgumentType::Number,
            Some(Value::Array(_)) => ArgumentType::Array,
            _ => ArgumentType::String,
        }
    }

    /// Choices rendered as strings; non-scalar choices are skipped.
    pub fn choice_strings(&self) -> Vec<String> {
        self.choices
            .iter()
            .flatten()
            .filter_map(scalar_to_string)
            .collect()
    }

    /// Default value(s) rendered as strings.
    ///
    /// A scalar default yields one entry and an array default one entry per
    /// scalar element. `null` yields nothing.
    pub fn default_strings(&self) -> Vec<String> {
        match &self.default {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
            Some(other) => scalar_to_string(other).into_iter().collect(),
        }
    }
}

/// Renders a scalar JSON value as the string a command line would carry.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Insertion-ordered map of argument name to definition.
///
/// # Examples
///
/// ```
/// # use command_tree_core::{ArgumentDefinition, ArgumentMap};
/// let mut map = ArgumentMap::new();
/// map.insert("from", ArgumentDefinition::default());
/// map.insert("to", ArgumentDefinition::default());
/// assert_eq!(map.names().collect::<Vec<_>>(), vec!["from", "to"]);
/// assert!(map.contains("to"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentMap {
    entries: Vec<(String, ArgumentDefinition)>,
}

impl ArgumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a definition, replacing any existing one with the same name in
    /// place.
    pub fn insert(&mut self, name: impl Into<String>, definition: ArgumentDefinition) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = definition,
            None => self.entries.push((name, definition)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, def)| def)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentDefinition)> {
        self.entries.iter().map(|(n, def)| (n.as_str(), def))
    }
}

impl FromIterator<(String, ArgumentDefinition)> for ArgumentMap {
    fn from_iter<I: IntoIterator<Item = (String, ArgumentDefinition)>>(iter: I) -> Self {
        let mut map = ArgumentMap::new();
        for (name, def) in iter {
            map.insert(name, def);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_description_aliases_map_to_describe() {
        let a: ArgumentDefinition = serde_json::from_value(json!({"description": "x"})).unwrap();
        let b: ArgumentDefinition = serde_json::from_value(json!({"desc": "x"})).unwrap();
        assert_eq!(a.describe.as_deref(), Some("x"));
        assert_eq!(b.describe.as_deref(), Some("x"));
        assert!(a.extensions.is_empty());
    }

    #[test]
    fn test_alias_list() {
        let def: ArgumentDefinition =
            serde_json::from_value(json!({"alias": ["l", "logfile"]})).unwrap();
        assert_eq!(def.aliases().collect::<Vec<_>>(), vec!["l", "logfile"]);
    }

    #[test]
    fn test_effective_type_inferred_from_default() {
        let flag: ArgumentDefinition = serde_json::from_value(json!({"default": false})).unwrap();
        assert_eq!(flag.effective_type(), ArgumentType::Boolean);

        let explicit: ArgumentDefinition =
            serde_json::from_value(json!({"default": 3, "type": "count"})).unwrap();
        assert_eq!(explicit.effective_type(), ArgumentType::Count);
    }

    #[test]
    fn test_misspelled_known_field_lands_in_extensions() {
        let def: ArgumentDefinition =
            serde_json::from_value(json!({"demandOptoin": true})).unwrap();
        assert!(!def.is_required());
        assert_eq!(def.extensions.get("demandOptoin"), Some(&json!(true)));
    }

    #[test]
    fn test_invalid_known_field_is_rejected() {
        let result = serde_json::from_value::<ArgumentDefinition>(json!({"type": "matrix"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_choice_and_default_strings() {
        let def: ArgumentDefinition = serde_json::from_value(
            json!({"choices": ["json", 2, true, {"x": 1}], "default": ["a", 1]}),
        )
        .unwrap();
        assert_eq!(def.choice_strings(), vec!["json", "2", "true"]);
        assert_eq!(def.default_strings(), vec!["a", "1"]);
    }

    #[test]
    fn test_argument_map_insert_replaces_in_place() {
        let mut map = ArgumentMap::new();
        map.insert("a", ArgumentDefinition::default());
        map.insert("b", ArgumentDefinition::default());
        map.insert(
            "a",
            ArgumentDefinition {
                demand_option: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(map.get("a").unwrap().is_required());
    }
}
