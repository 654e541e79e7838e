//! Registration of a single adapted command.
//!
//! [`BuilderImpl`] reads an adapted command into a [`CommandDescriptor`] and
//! drives a [`ParserInstance`]: before handler, the command itself
//! (positionals, options, validation groups), fail hook, then the after
//! handler.

use std::sync::Arc;

use command_tree_core::{
    ArgumentMap, BuildError, CommandDescriptor, ConversionSchema, DescriptorReader, PickMode,
    Result, ValidationGroup, pick_arguments, split_positional, unique_pairs,
};
use serde_json::Value;
use tracing::debug;

use crate::handlers::{BuildHandlers, FailContext, HandlerOverrides, OptionRequest};
use crate::instance::{CommandScope, ParserInstance};

/// Formats a command's usage string from its positional spec.
///
/// Each positional name is wrapped in `<name>` when its definition is
/// required and `[name]` otherwise.
///
/// # Errors
///
/// [`BuildError::UndefinedPositional`] if a name has no definition in
/// `arguments`.
///
/// # Examples
///
/// ```
/// use command_tree_builder::decorate_positional_def;
/// use command_tree_core::{ArgumentDefinition, ArgumentMap};
///
/// let mut arguments = ArgumentMap::new();
/// arguments.insert("from", ArgumentDefinition { demand_option: Some(true), ..Default::default() });
/// arguments.insert("to", ArgumentDefinition::default());
///
/// let usage = decorate_positional_def("copy", Some("from to"), &arguments).unwrap();
/// assert_eq!(usage, "copy <from> [to]");
/// assert_eq!(decorate_positional_def("copy", None, &arguments).unwrap(), "copy");
/// ```
pub fn decorate_positional_def(
    name: &str,
    positional: Option<&str>,
    arguments: &ArgumentMap,
) -> Result<String> {
    let mut usage = name.to_string();
    for argument in positional.map(split_positional).unwrap_or_default() {
        let def = arguments
            .get(argument)
            .ok_or_else(|| BuildError::UndefinedPositional {
                command: name.to_string(),
                argument: argument.to_string(),
            })?;
        if def.is_required() {
            usage.push_str(&format!(" <{argument}>"));
        } else {
            usage.push_str(&format!(" [{argument}]"));
        }
    }
    Ok(usage)
}

/// Applies validation groups to `scope`.
///
/// Every unordered pair of distinct members of a `Conflicts` group becomes a
/// mutual exclusion. For `Implies`, the first member of each pair requires the
/// second. Unrecognized kinds are skipped.
pub fn handle_validation_groups(
    scope: &mut CommandScope,
    groups: &[ValidationGroup],
) -> Result<()> {
    for group in groups {
        let pairs = unique_pairs(group.members(), |r| r.name.clone(), |a, b| a == b);
        match group {
            ValidationGroup::Conflicts(_) => {
                for (first, second) in &pairs {
                    scope.conflicts(first, second)?;
                }
            }
            ValidationGroup::Implies(_) => {
                for (first, second) in &pairs {
                    scope.implies(first, second)?;
                }
            }
            ValidationGroup::Unrecognized { kind } => {
                debug!(
                    command = scope.name(),
                    kind = kind.as_str(),
                    "Ignoring unrecognized validation group"
                );
            }
        }
    }
    Ok(())
}

/// Per-command registration, parameterised over handlers.
#[derive(Clone, Default)]
pub struct BuilderImpl {
    schema: ConversionSchema,
    handlers: BuildHandlers,
}

impl BuilderImpl {
    pub fn new(schema: ConversionSchema, handlers: BuildHandlers) -> Self {
        Self { schema, handlers }
    }

    pub fn schema(&self) -> &ConversionSchema {
        &self.schema
    }

    pub fn handlers(&self) -> &BuildHandlers {
        &self.handlers
    }

    /// Reads an adapted command and registers it on `instance`.
    pub fn build_command(
        &self,
        instance: &mut ParserInstance,
        adapted: &Value,
        overrides: &HandlerOverrides,
    ) -> Result<()> {
        let command = DescriptorReader::new(&self.schema.labels).read_command(adapted)?;
        self.build_descriptor(instance, command, overrides)
    }

    /// Registers a typed command on `instance`.
    ///
    /// Handlers are resolved once: each one given in `overrides` replaces the
    /// builder's own for this call only. The fail handler is installed once
    /// the command is registered, so a rejected build leaves the hooks of
    /// other commands untouched.
    pub fn build_descriptor(
        &self,
        instance: &mut ParserInstance,
        command: CommandDescriptor,
        overrides: &HandlerOverrides,
    ) -> Result<()> {
        let handlers = self.handlers.resolve(overrides);
        let command = Arc::new(command);

        (handlers.on_before_command)(instance, &command)?;
        self.command(instance, &command, &handlers)?;

        let on_fail = Arc::clone(&handlers.on_fail);
        let failed = Arc::clone(&command);
        instance.fail(&command.name, move |message, error, inst| {
            on_fail(&FailContext {
                message,
                error,
                instance: inst,
                command: &failed,
            });
        });

        (handlers.on_after_command)(instance, &command)?;

        debug!(command = command.name.as_str(), "Built command");
        Ok(())
    }

    fn command(
        &self,
        instance: &mut ParserInstance,
        command: &CommandDescriptor,
        handlers: &BuildHandlers,
    ) -> Result<()> {
        let empty = ArgumentMap::new();
        let arguments = command.arguments().unwrap_or(&empty);
        let positional = command.positional.as_deref();
        let usage = decorate_positional_def(&command.name, positional, arguments)?;
        let options = pick_arguments(arguments, positional.unwrap_or(""), PickMode::NonPositional);

        let register = |scope: &mut CommandScope| -> Result<()> {
            for name in command.positional_names() {
                // Checked by `decorate_positional_def`.
                let Some(definition) = arguments.get(name) else {
                    continue;
                };
                (handlers.on_option)(
                    scope,
                    &OptionRequest {
                        name,
                        definition,
                        positional: true,
                        command,
                    },
                )?;
            }
            for (name, definition) in options.iter() {
                (handlers.on_option)(
                    scope,
                    &OptionRequest {
                        name,
                        definition,
                        positional: false,
                        command,
                    },
                )?;
            }
            if let Some(groups) = command.validation_groups() {
                handle_validation_groups(scope, groups)?;
            }
            Ok(())
        };

        let describe = command.describe.as_deref();
        if command.is_default {
            instance.default_command_with(&usage, describe, register)
        } else {
            instance.command(&usage, describe, register)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use command_tree_core::ArgumentDefinition;
    use serde_json::json;

    use super::*;

    fn copy_command() -> Value {
        json!({
            "name": "copy",
            "describe": "Copy file",
            "positional": "from to",
            "_children": [
                {
                    "_": "Arguments",
                    "_children": {
                        "from": { "describe": "source file", "demandOption": true },
                        "to": { "describe": "destination", "demandOption": true },
                        "log": { "alias": "l", "type": "boolean" },
                        "print": { "alias": "p", "type": "boolean" }
                    }
                },
                {
                    "_": "ArgumentGroups",
                    "_children": [
                        { "_": "Conflicts", "_children": [ { "name": "log" }, { "name": "print" } ] }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_decorate_positional_undefined_is_error() {
        let err = decorate_positional_def("copy", Some("from"), &ArgumentMap::new()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::UndefinedPositional { command, argument } if command == "copy" && argument == "from"
        ));
    }

    #[test]
    fn test_decorate_positional_collapses_whitespace() {
        let mut arguments = ArgumentMap::new();
        arguments.insert("a", ArgumentDefinition::default());
        arguments.insert("b", ArgumentDefinition::default());
        let usage = decorate_positional_def("cmd", Some("  a   b "), &arguments).unwrap();
        assert_eq!(usage, "cmd [a] [b]");
    }

    #[test]
    fn test_build_command_registers_usage_and_values() {
        let mut instance = ParserInstance::new("app");
        BuilderImpl::default()
            .build_command(&mut instance, &copy_command(), &HandlerOverrides::default())
            .unwrap();

        assert_eq!(instance.usage("copy"), Some("copy <from> <to>"));
        let parsed = instance.parse(["copy", "a", "b", "-l"]).unwrap();
        assert_eq!(parsed.get_str("from"), Some("a"));
        assert_eq!(parsed.get_str("to"), Some("b"));
        assert_eq!(parsed.get_bool("log"), Some(true));
        assert_eq!(parsed.get_bool("print"), Some(false));
    }

    #[test]
    fn test_option_handler_sees_positionals_first() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handlers = BuildHandlers::default().on_option(move |scope, request| {
            sink.lock()
                .unwrap()
                .push((request.name.to_string(), request.positional));
            request.register_default(scope)
        });

        let mut instance = ParserInstance::new("app");
        BuilderImpl::new(ConversionSchema::default(), handlers)
            .build_command(&mut instance, &copy_command(), &HandlerOverrides::default())
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                ("from".to_string(), true),
                ("to".to_string(), true),
                ("log".to_string(), false),
                ("print".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_conflicts_group_pairs_duplicates_once() {
        let mut instance = ParserInstance::new("app");
        instance
            .command("run", None, |scope| {
                let flag: ArgumentDefinition = serde_json::from_value(json!({"type": "boolean"})).unwrap();
                scope.option("a", &flag)?;
                scope.option("b", &flag)?;
                let group = ValidationGroup::Conflicts(vec![
                    command_tree_core::ArgumentRef { name: "a".into() },
                    command_tree_core::ArgumentRef { name: "a".into() },
                    command_tree_core::ArgumentRef { name: "b".into() },
                ]);
                handle_validation_groups(scope, std::slice::from_ref(&group))
            })
            .unwrap();

        assert!(instance.parse(["run", "-a"]).is_ok());
        assert!(instance.parse(["run", "-a", "-b"]).is_err());
    }

    #[test]
    fn test_unrecognized_group_is_skipped() {
        let mut instance = ParserInstance::new("app");
        instance
            .command("run", None, |scope| {
                let group = ValidationGroup::Unrecognized {
                    kind: "Exactly".to_string(),
                };
                handle_validation_groups(scope, &[group])
            })
            .unwrap();
        assert!(instance.parse(["run"]).is_ok());
    }

    #[test]
    fn test_failed_build_installs_no_fail_hook() {
        let mut raw = copy_command();
        raw["positional"] = json!("from dest");

        let mut instance = ParserInstance::new("app");
        let err = BuilderImpl::default()
            .build_command(&mut instance, &raw, &HandlerOverrides::default())
            .unwrap_err();
        assert!(matches!(err, BuildError::UndefinedPositional { .. }));
        assert!(!instance.has_fail_hook("copy"));
    }

    #[test]
    fn test_after_handler_sees_installed_fail_hook() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let handlers = BuildHandlers::default().on_after_command(move |instance, command| {
            *sink.lock().unwrap() = Some(instance.has_fail_hook(&command.name));
            Ok(())
        });

        let mut instance = ParserInstance::new("app");
        BuilderImpl::new(ConversionSchema::default(), handlers)
            .build_command(&mut instance, &copy_command(), &HandlerOverrides::default())
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), Some(true));
    }

    #[test]
    fn test_implies_group_requires_second_member() {
        let mut raw = copy_command();
        raw["_children"][1]["_children"][0]["_"] = json!("Implies");

        let mut instance = ParserInstance::new("app");
        BuilderImpl::default()
            .build_command(&mut instance, &raw, &HandlerOverrides::default())
            .unwrap();

        assert!(instance.parse(["copy", "a", "b", "--print"]).is_ok());
        assert!(instance.parse(["copy", "a", "b", "--log", "--print"]).is_ok());
        let err = instance.parse(["copy", "a", "b", "--log"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
