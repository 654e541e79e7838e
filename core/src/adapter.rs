//! Pruning of raw command descriptors before they are built.
//!
//! The conversion layer tags every argument definition with structural fields
//! (its identifier and kind) that the argument parser does not understand.
//! The [`Adapter`] returns a copy of the command with those fields removed.

use serde_json::{Map, Value};

use crate::locate::find_descendant_with_index;
use crate::schema::ConversionSchema;

/// Turns a raw command descriptor into one ready for building.
pub trait CommandAdapter {
    /// Returns an adapted copy of `command`; the input is never modified.
    fn adapt(&self, command: &Value) -> Value;
}

/// Default adapter: strips `exclusions.options` from argument definitions.
///
/// # Examples
///
/// ```
/// use command_tree_core::{Adapter, CommandAdapter, ConversionSchema};
/// use serde_json::json;
///
/// let adapter = Adapter::new(ConversionSchema::default());
/// let raw = json!({
///     "name": "copy",
///     "_children": [
///         { "_": "Arguments", "_children": { "to": { "name": "to", "_": "Argument", "alias": "t" } } }
///     ]
/// });
///
/// let adapted = adapter.adapt(&raw);
/// assert_eq!(adapted["_children"][0]["_children"]["to"], json!({ "alias": "t" }));
/// assert_eq!(raw["_children"][0]["_children"]["to"]["name"], "to");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Adapter {
    schema: ConversionSchema,
}

impl Adapter {
    pub fn new(schema: ConversionSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &ConversionSchema {
        &self.schema
    }

    fn strip_exclusions(&self, children: &Map<String, Value>) -> Map<String, Value> {
        children
            .iter()
            .map(|(name, definition)| {
                let cleaned = match definition {
                    Value::Object(fields) => Value::Object(
                        fields
                            .iter()
                            .filter(|(key, _)| !self.schema.is_excluded_option(key))
                            .map(|(key, value)| (key.clone(), value.clone()))
                            .collect(),
                    ),
                    other => other.clone(),
                };
                (name.clone(), cleaned)
            })
            .collect()
    }
}

impl CommandAdapter for Adapter {
    fn adapt(&self, command: &Value) -> Value {
        let labels = &self.schema.labels;
        let mut adapted = command.clone();

        let Some(Value::Array(descendants)) = adapted.get(&labels.descendants) else {
            return adapted;
        };
        let Some((index, container)) =
            find_descendant_with_index(&labels.command_options, descendants, &labels.elements)
        else {
            return adapted;
        };
        let Some(Value::Object(children)) = container.get(&labels.descendants) else {
            return adapted;
        };
        let cleaned = Value::Object(self.strip_exclusions(children));

        if let Some(slot) = adapted
            .get_mut(&labels.descendants)
            .and_then(|d| d.get_mut(index))
            .and_then(|c| c.get_mut(&labels.descendants))
        {
            *slot = cleaned;
        }
        adapted
    }
}
