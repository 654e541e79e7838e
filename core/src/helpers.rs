//! Sequence and mapping utilities shared by the adapter and the builder.

use serde_json::Value;

use crate::definition::ArgumentMap;

/// Which side of a positional spec [`pick_arguments`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickMode {
    /// Arguments named in the positional spec.
    Positional,
    /// Arguments not named in the positional spec.
    #[default]
    NonPositional,
}

/// Returns every unordered pair of distinct keys in `sequence`.
///
/// Keys are extracted with `get` and deduplicated with `equals` (the first
/// occurrence wins) before pairing. Pairs are emitted in left-to-right nesting
/// order: each key is paired with every key after it. Fewer than two distinct
/// keys yield no pairs; `n` distinct keys yield `n * (n - 1) / 2`.
///
/// # Examples
///
/// ```
/// use command_tree_core::unique_pairs;
///
/// let pairs = unique_pairs(&[1, 2, 3], |v| *v, |a, b| a == b);
/// assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3)]);
///
/// let pairs = unique_pairs(&["a", "b", "a"], |v| *v, |a, b| a == b);
/// assert_eq!(pairs, vec![("a", "b")]);
/// ```
pub fn unique_pairs<T, K, G, E>(sequence: &[T], get: G, equals: E) -> Vec<(K, K)>
where
    K: Clone,
    G: Fn(&T) -> K,
    E: Fn(&K, &K) -> bool,
{
    let mut keys: Vec<K> = Vec::with_capacity(sequence.len());
    for item in sequence {
        let key = get(item);
        if !keys.iter().any(|existing| equals(existing, &key)) {
            keys.push(key);
        }
    }

    let mut pairs = Vec::new();
    for (i, first) in keys.iter().enumerate() {
        for second in &keys[i + 1..] {
            pairs.push((first.clone(), second.clone()));
        }
    }
    pairs
}

/// Returns `true` if `value` starts with any of `prefixes`.
///
/// # Examples
///
/// ```
/// use command_tree_core::starts_with_any;
///
/// assert!(starts_with_any(&["one", "lazy"], "lazy brown fox"));
/// assert!(!starts_with_any(&["one", "two"], "lazy brown fox"));
/// ```
pub fn starts_with_any<S: AsRef<str>>(prefixes: &[S], value: &str) -> bool {
    prefixes.iter().any(|prefix| value.starts_with(prefix.as_ref()))
}

/// Splits a space-separated positional spec into argument names.
///
/// Empty segments are dropped, so `""` and `"  "` name no arguments.
pub fn split_positional(spec: &str) -> Vec<&str> {
    spec.split_whitespace().collect()
}

/// Picks the subset of `arguments` selected by `positional_spec` and `mode`.
///
/// # Examples
///
/// ```
/// use command_tree_core::{ArgumentDefinition, ArgumentMap, PickMode, pick_arguments};
///
/// let map: ArgumentMap = ["from", "to", "log"]
///     .into_iter()
///     .map(|n| (n.to_string(), ArgumentDefinition::default()))
///     .collect();
///
/// let positional = pick_arguments(&map, "from to", PickMode::Positional);
/// assert_eq!(positional.names().collect::<Vec<_>>(), vec!["from", "to"]);
///
/// let rest = pick_arguments(&map, "from to", PickMode::NonPositional);
/// assert_eq!(rest.names().collect::<Vec<_>>(), vec!["log"]);
/// ```
pub fn pick_arguments(arguments: &ArgumentMap, positional_spec: &str, mode: PickMode) -> ArgumentMap {
    let names = split_positional(positional_spec);
    arguments
        .iter()
        .filter(|(name, _)| names.contains(name) == (mode == PickMode::Positional))
        .map(|(name, def)| (name.to_string(), def.clone()))
        .collect()
}

/// Resolves a slash-separated path inside `container`.
///
/// Object segments are looked up by key, array segments by numeric index.
/// Empty segments are skipped, so `"a//b"` and `"/a/b"` both mean `a/b`.
///
/// # Examples
///
/// ```
/// use command_tree_core::view_path;
/// use serde_json::json;
///
/// let doc = json!({"cli": {"commands": [{"name": "copy"}]}});
/// assert_eq!(view_path(&doc, "cli/commands/0/name"), Some(&json!("copy")));
/// assert_eq!(view_path(&doc, "cli/missing"), None);
/// ```
pub fn view_path<'a>(container: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .try_fold(container, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}
