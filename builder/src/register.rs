//! Translation of argument definitions into clap arguments, and of clap
//! matches back into JSON values.

use std::ffi::OsStr;

use clap::builder::{PossibleValue, PossibleValuesParser, TypedValueParser, ValueParser};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches};
use command_tree_core::{ArgumentDefinition, ArgumentType};
use serde_json::{Map, Value};

/// How a registered argument's value is stored in clap's matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// Option flag without a value.
    Flag,
    /// Option counted by occurrence.
    Count,
    Number,
    /// Positional taking `true`/`false`.
    Boolean,
    Text,
    /// One or more string values.
    List,
}

/// An argument registered on a command, as needed to read it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredArgument {
    pub name: String,
    pub aliases: Vec<String>,
    pub shape: ValueShape,
    pub positional: bool,
    pub required: bool,
}

impl RegisteredArgument {
    /// Returns `true` if `key` is this argument's name or one of its aliases.
    pub fn answers_to(&self, key: &str) -> bool {
        self.name == key || self.aliases.iter().any(|alias| alias == key)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn text_parser(def: &ArgumentDefinition) -> ValueParser {
    let choices = def.choice_strings();
    if choices.is_empty() {
        clap::value_parser!(String).into()
    } else {
        PossibleValuesParser::new(choices).into()
    }
}

/// Accepts any spelling of one of a fixed set of numbers, so a choice of
/// `1.0` admits both `1` and `1.0`.
#[derive(Debug, Clone)]
struct NumberChoicesParser {
    choices: Vec<f64>,
}

impl NumberChoicesParser {
    fn labels(&self) -> Vec<String> {
        self.choices
            .iter()
            .filter_map(|n| number_value(*n))
            .map(|value| value.to_string())
            .collect()
    }
}

impl TypedValueParser for NumberChoicesParser {
    type Value = f64;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<f64, clap::Error> {
        let text = value.to_string_lossy();
        match text.parse::<f64>() {
            Ok(n) if self.choices.contains(&n) => Ok(n),
            _ => {
                let mut err = clap::Error::new(ErrorKind::InvalidValue).with_cmd(cmd);
                if let Some(arg) = arg {
                    err.insert(ContextKind::InvalidArg, ContextValue::String(arg.to_string()));
                }
                err.insert(ContextKind::InvalidValue, ContextValue::String(text.into_owned()));
                err.insert(ContextKind::ValidValue, ContextValue::Strings(self.labels()));
                Err(err)
            }
        }
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        Some(Box::new(self.labels().into_iter().map(PossibleValue::new)))
    }
}

fn number_parser(def: &ArgumentDefinition) -> ValueParser {
    let choices = def.choice_strings();
    if choices.is_empty() {
        clap::value_parser!(f64).into()
    } else {
        let choices = choices.iter().filter_map(|s| s.parse::<f64>().ok()).collect();
        NumberChoicesParser { choices }.into()
    }
}

fn finish(mut arg: Arg, def: &ArgumentDefinition, shape: ValueShape) -> Arg {
    if let Some(help) = &def.describe {
        arg = arg.help(help.clone());
    }
    if def.is_required() {
        arg = arg.required(true);
    }
    if def.hidden == Some(true) {
        arg = arg.hide(true);
    }

    let defaults = def.default_strings();
    match shape {
        ValueShape::Count => {}
        ValueShape::List => {
            if !defaults.is_empty() {
                arg = arg.default_values(defaults);
            }
        }
        _ => {
            if let Some(first) = defaults.into_iter().next() {
                arg = arg.default_value(first);
            }
        }
    }
    arg
}

/// Builds a flagged option (`--name`, plus `-x` for single-character names
/// and aliases).
pub fn option_arg(name: &str, def: &ArgumentDefinition) -> (Arg, ValueShape) {
    let mut arg = Arg::new(name.to_string()).long(name.to_string());
    if let Some(c) = single_char(name) {
        arg = arg.short(c);
    }
    for alias in def.aliases() {
        arg = match single_char(alias) {
            Some(c) if arg.get_short().is_none() => arg.short(c),
            Some(c) => arg.visible_short_alias(c),
            None => arg.visible_alias(alias.to_string()),
        };
    }

    let (arg, shape) = match def.effective_type() {
        ArgumentType::Boolean => (arg.action(ArgAction::SetTrue), ValueShape::Flag),
        ArgumentType::Count => (arg.action(ArgAction::Count), ValueShape::Count),
        ArgumentType::Number => (
            arg.action(ArgAction::Set).value_parser(number_parser(def)),
            ValueShape::Number,
        ),
        ArgumentType::Array => (
            arg.action(ArgAction::Append)
                .num_args(1..)
                .value_parser(text_parser(def)),
            ValueShape::List,
        ),
        ArgumentType::String => (
            arg.action(ArgAction::Set).value_parser(text_parser(def)),
            ValueShape::Text,
        ),
    };
    (finish(arg, def, shape), shape)
}

/// Builds a positional argument; clap assigns indices in registration order.
pub fn positional_arg(name: &str, def: &ArgumentDefinition) -> (Arg, ValueShape) {
    let arg = Arg::new(name.to_string()).value_name(name.to_string());
    let (arg, shape) = match def.effective_type() {
        ArgumentType::Boolean => (
            arg.action(ArgAction::Set).value_parser(clap::value_parser!(bool)),
            ValueShape::Boolean,
        ),
        ArgumentType::Number => (
            arg.action(ArgAction::Set).value_parser(number_parser(def)),
            ValueShape::Number,
        ),
        ArgumentType::Array => (
            arg.action(ArgAction::Append)
                .num_args(1..)
                .value_parser(text_parser(def)),
            ValueShape::List,
        ),
        ArgumentType::String | ArgumentType::Count => (
            arg.action(ArgAction::Set).value_parser(text_parser(def)),
            ValueShape::Text,
        ),
    };
    (finish(arg, def, shape), shape)
}

fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(Value::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map(Value::Number)
    }
}

fn read_value(matches: &ArgMatches, argument: &RegisteredArgument) -> Option<Value> {
    let id = argument.name.as_str();
    match argument.shape {
        ValueShape::Flag | ValueShape::Boolean => matches
            .try_get_one::<bool>(id)
            .ok()
            .flatten()
            .map(|b| Value::Bool(*b)),
        ValueShape::Count => matches
            .try_get_one::<u8>(id)
            .ok()
            .flatten()
            .map(|n| Value::from(*n)),
        ValueShape::Number => matches
            .try_get_one::<f64>(id)
            .ok()
            .flatten()
            .and_then(|n| number_value(*n)),
        ValueShape::Text => matches
            .try_get_one::<String>(id)
            .ok()
            .flatten()
            .map(|s| Value::String(s.clone())),
        ValueShape::List => matches.try_get_many::<String>(id).ok().flatten().map(|values| {
            Value::Array(values.map(|v| Value::String(v.clone())).collect())
        }),
    }
}

/// Copies matched values into `values`, keyed by name and by every alias.
pub fn collect_values(
    matches: &ArgMatches,
    registered: &[RegisteredArgument],
    values: &mut Map<String, Value>,
) {
    for argument in registered {
        let Some(value) = read_value(matches, argument) else {
            continue;
        };
        for alias in &argument.aliases {
            values.insert(alias.clone(), value.clone());
        }
        values.insert(argument.name.clone(), value);
    }
}
