//! Lookup of descendant nodes by kind.
//!
//! Structural children of a command are an ordered list of nodes, each tagged
//! with a kind under a schema-configured field. Absence is not an error: a
//! command without an argument container simply has no arguments.

use serde_json::Value;

/// Finds the first node in `nodes` whose `kind_field` equals `kind`.
pub fn find_descendant<'a>(kind: &str, nodes: &'a [Value], kind_field: &str) -> Option<&'a Value> {
    find_descendant_with_index(kind, nodes, kind_field).map(|(_, node)| node)
}

/// Like [`find_descendant`], also returning the node's position so it can be
/// replaced in place.
///
/// # Examples
///
/// ```
/// use command_tree_core::find_descendant_with_index;
/// use serde_json::json;
///
/// let nodes = vec![json!({"_": "ArgumentGroups"}), json!({"_": "Arguments"})];
/// let (index, node) = find_descendant_with_index("Arguments", &nodes, "_").unwrap();
/// assert_eq!(index, 1);
/// assert_eq!(node, &nodes[1]);
/// assert!(find_descendant_with_index("Missing", &nodes, "_").is_none());
/// ```
pub fn find_descendant_with_index<'a>(
    kind: &str,
    nodes: &'a [Value],
    kind_field: &str,
) -> Option<(usize, &'a Value)> {
    nodes
        .iter()
        .enumerate()
        .find(|(_, node)| node.get(kind_field).and_then(Value::as_str) == Some(kind))
}
