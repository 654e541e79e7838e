//! clap-backed parser instance.
//!
//! [`ParserInstance`] is the registration surface the builder drives: it
//! owns the root [`clap::Command`], records what was registered on each
//! subcommand so parsed values can be read back, and keeps one fail hook per
//! command.

use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches};
use command_tree_core::{ArgumentDefinition, BuildError, Result, starts_with_any};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::register::{RegisteredArgument, ValueShape, collect_values, option_arg, positional_arg};

/// Id of the root catch-all that collects unlabeled arguments.
pub const UNLABELED_ID: &str = "_";

/// Hook stored by [`ParserInstance::fail`].
pub type FailHook = Arc<dyn Fn(&str, &clap::Error, &ParserInstance) + Send + Sync>;

/// Result of a successful parse.
///
/// Each value is stored under its argument's name and under every alias.
///
/// # Examples
///
/// ```
/// use command_tree_builder::ParsedArguments;
/// use serde_json::json;
///
/// let mut parsed = ParsedArguments::default();
/// parsed.values.insert("log".into(), json!("fs.log"));
/// assert_eq!(parsed.get_str("log"), Some("fs.log"));
/// assert_eq!(parsed.get_str("owner"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArguments {
    /// The command that was matched, or the default command.
    pub command: Option<String>,
    pub values: Map<String, Value>,
    /// Arguments collected by the root catch-all.
    pub unlabeled: Vec<String>,
}

impl ParsedArguments {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }
}

/// Bookkeeping for one registered command.
#[derive(Debug, Clone)]
struct RegisteredCommand {
    name: String,
    usage: String,
    arguments: Vec<RegisteredArgument>,
}

/// Registration surface for a single command.
///
/// Handed to the callback of [`ParserInstance::command`]. A scope created for
/// a default command's root registration ([`is_root`](Self::is_root)) skips
/// positional arguments: without the command name on the line, positional
/// tokens are collected as unlabeled arguments instead.
pub struct CommandScope {
    name: String,
    command: clap::Command,
    arguments: Vec<RegisteredArgument>,
    skipped: Vec<String>,
    at_root: bool,
}

impl CommandScope {
    fn new(name: String, command: clap::Command, at_root: bool) -> Self {
        Self {
            name,
            command,
            arguments: Vec::new(),
            skipped: Vec::new(),
            at_root,
        }
    }

    /// Name of the command being registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this scope registers a default command on the root.
    pub fn is_root(&self) -> bool {
        self.at_root
    }

    /// Arguments registered so far.
    pub fn arguments(&self) -> &[RegisteredArgument] {
        &self.arguments
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.arguments.iter().any(|a| a.name == name)
    }

    /// Applies `f` to the underlying clap command.
    pub fn map_command<F>(&mut self, f: F)
    where
        F: FnOnce(clap::Command) -> clap::Command,
    {
        let command = std::mem::take(&mut self.command);
        self.command = f(command);
    }

    fn malformed(&self, argument: &str, reason: impl Into<String>) -> BuildError {
        BuildError::MalformedArgument {
            command: self.name.clone(),
            argument: argument.to_string(),
            reason: reason.into(),
        }
    }

    fn check_names(&self, name: &str, def: &ArgumentDefinition) -> Result<()> {
        if self.is_registered(name) {
            return Err(self.malformed(name, "registered more than once"));
        }
        for key in std::iter::once(name).chain(def.aliases()) {
            if key == "h" || key == "help" {
                return Err(self.malformed(name, format!("`{key}` is reserved for help")));
            }
            if let Some(other) = self.arguments.iter().find(|a| a.answers_to(key)) {
                return Err(self.malformed(
                    name,
                    format!("`{key}` is already used by `{}`", other.name),
                ));
            }
        }
        Ok(())
    }

    fn push(&mut self, arg: Arg, argument: RegisteredArgument) {
        self.map_command(|command| command.arg(arg));
        self.arguments.push(argument);
    }

    /// Registers a flagged option.
    pub fn option(&mut self, name: &str, def: &ArgumentDefinition) -> Result<()> {
        self.check_names(name, def)?;
        let (arg, shape) = option_arg(name, def);
        self.push(
            arg,
            RegisteredArgument {
                name: name.to_string(),
                aliases: def.aliases().map(String::from).collect(),
                shape,
                positional: false,
                required: def.is_required(),
            },
        );
        Ok(())
    }

    /// Registers a positional argument after those already registered.
    ///
    /// On a root scope this only records the name as skipped.
    pub fn positional(&mut self, name: &str, def: &ArgumentDefinition) -> Result<()> {
        if self.at_root {
            debug!(
                command = self.name.as_str(),
                argument = name,
                "Positional of default command left to unlabeled arguments"
            );
            self.skipped.push(name.to_string());
            return Ok(());
        }

        if self.is_registered(name) {
            return Err(self.malformed(name, "registered more than once"));
        }
        let previous: Vec<&RegisteredArgument> =
            self.arguments.iter().filter(|a| a.positional).collect();
        if let Some(last) = previous.last().filter(|last| last.shape == ValueShape::List) {
            return Err(self.malformed(
                name,
                format!("follows positional `{}` which takes multiple values", last.name),
            ));
        }
        if def.is_required() && previous.iter().any(|a| !a.required) {
            return Err(BuildError::RequiredPositionalAfterOptional {
                command: self.name.clone(),
                argument: name.to_string(),
            });
        }

        let (arg, shape) = positional_arg(name, def);
        self.push(
            arg,
            RegisteredArgument {
                name: name.to_string(),
                aliases: Vec::new(),
                shape,
                positional: true,
                required: def.is_required(),
            },
        );
        Ok(())
    }

    /// Makes `first` and `second` mutually exclusive.
    pub fn conflicts(&mut self, first: &str, second: &str) -> Result<()> {
        self.relate(first, second, |arg, other| arg.conflicts_with(other))
    }

    /// Makes `first` require `second`.
    pub fn implies(&mut self, first: &str, second: &str) -> Result<()> {
        self.relate(first, second, |arg, other| arg.requires(other))
    }

    fn relate<F>(&mut self, first: &str, second: &str, f: F) -> Result<()>
    where
        F: FnOnce(Arg, String) -> Arg,
    {
        for name in [first, second] {
            if self.skipped.iter().any(|s| s == name) {
                debug!(
                    command = self.name.as_str(),
                    argument = name,
                    "Skipping constraint on unregistered positional"
                );
                return Ok(());
            }
            if !self.is_registered(name) {
                return Err(BuildError::UnknownArgumentRef {
                    command: self.name.clone(),
                    argument: name.to_string(),
                });
            }
        }
        let other = second.to_string();
        self.map_command(|command| command.mut_arg(first, |arg| f(arg, other)));
        Ok(())
    }

    fn finish(self) -> (clap::Command, Vec<RegisteredArgument>) {
        (self.command, self.arguments)
    }
}

/// Registration target and parser.
///
/// # Examples
///
/// ```
/// use command_tree_builder::ParserInstance;
/// use command_tree_core::ArgumentDefinition;
///
/// let mut instance = ParserInstance::new("app");
/// instance
///     .command("copy <from>", Some("Copy file"), |scope| {
///         let required = ArgumentDefinition { demand_option: Some(true), ..Default::default() };
///         scope.positional("from", &required)
///     })
///     .unwrap();
///
/// let parsed = instance.parse(["copy", "a.txt"]).unwrap();
/// assert_eq!(parsed.command.as_deref(), Some("copy"));
/// assert_eq!(parsed.get_str("from"), Some("a.txt"));
/// ```
pub struct ParserInstance {
    root: clap::Command,
    commands: Vec<RegisteredCommand>,
    root_arguments: Vec<RegisteredArgument>,
    default_command: Option<String>,
    fail_hooks: Vec<(String, FailHook)>,
}

impl fmt::Debug for ParserInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserInstance")
            .field("name", &self.root.get_name())
            .field("commands", &self.commands)
            .field("default_command", &self.default_command)
            .field("fail_hooks", &self.fail_hooks.len())
            .finish()
    }
}

impl ParserInstance {
    /// Creates an instance with an empty root command named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_command(clap::Command::new(name.into()))
    }

    /// Creates an instance on top of a preconfigured root command.
    pub fn from_command(root: clap::Command) -> Self {
        Self {
            root,
            commands: Vec::new(),
            root_arguments: Vec::new(),
            default_command: None,
            fail_hooks: Vec::new(),
        }
    }

    /// Name of the root command.
    pub fn name(&self) -> &str {
        self.root.get_name()
    }

    /// The root clap command built so far.
    pub fn root(&self) -> &clap::Command {
        &self.root
    }

    pub fn into_command(self) -> clap::Command {
        self.root
    }

    /// Names of registered commands, in registration order.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    /// Positional usage string a command was registered with.
    pub fn usage(&self, command: &str) -> Option<&str> {
        self.find(command).map(|c| c.usage.as_str())
    }

    /// Arguments registered on a command.
    pub fn arguments(&self, command: &str) -> Option<&[RegisteredArgument]> {
        self.find(command).map(|c| c.arguments.as_slice())
    }

    pub fn default_command(&self) -> Option<&str> {
        self.default_command.as_deref()
    }

    fn find(&self, command: &str) -> Option<&RegisteredCommand> {
        self.commands.iter().find(|c| c.name == command)
    }

    /// Returns `true` if a fail hook is installed for `command`.
    pub fn has_fail_hook(&self, command: &str) -> bool {
        self.hook_for(command).is_some()
    }

    /// Installs the fail hook for `command`, replacing any previous one.
    pub fn fail<F>(&mut self, command: &str, hook: F)
    where
        F: Fn(&str, &clap::Error, &ParserInstance) + Send + Sync + 'static,
    {
        self.fail_hooks.retain(|(name, _)| name != command);
        self.fail_hooks.push((command.to_string(), Arc::new(hook)));
    }

    /// Registers a command.
    ///
    /// `usage` is the command name followed by its decorated positionals
    /// (`"copy <from> [to]"`). `builder` registers the command's arguments.
    ///
    /// # Errors
    ///
    /// [`BuildError::DuplicateCommand`] if a command with the same name
    /// exists, plus anything `builder` returns.
    pub fn command<F>(&mut self, usage: &str, describe: Option<&str>, builder: F) -> Result<()>
    where
        F: Fn(&mut CommandScope) -> Result<()>,
    {
        self.register(usage, describe, false, builder)
    }

    /// Registers a command that also applies when no command name is given.
    ///
    /// `builder` runs twice: once for the subcommand and once against the root
    /// command, where positional registration is skipped.
    ///
    /// # Errors
    ///
    /// As [`command`](Self::command), plus
    /// [`BuildError::MultipleDefaultCommands`] if a default command exists.
    pub fn default_command_with<F>(
        &mut self,
        usage: &str,
        describe: Option<&str>,
        builder: F,
    ) -> Result<()>
    where
        F: Fn(&mut CommandScope) -> Result<()>,
    {
        self.register(usage, describe, true, builder)
    }

    fn register<F>(&mut self, usage: &str, describe: Option<&str>, is_default: bool, builder: F) -> Result<()>
    where
        F: Fn(&mut CommandScope) -> Result<()>,
    {
        let mut tokens = usage.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| BuildError::MalformedDescriptor("empty command usage".to_string()))?
            .to_string();
        let positionals: Vec<&str> = tokens.collect();

        if self.find(&name).is_some() {
            return Err(BuildError::DuplicateCommand(name));
        }
        if let Some(existing) = self.default_command.as_ref().filter(|_| is_default) {
            return Err(BuildError::MultipleDefaultCommands(vec![existing.clone(), name]));
        }

        let mut subcommand = clap::Command::new(name.clone());
        if let Some(about) = describe {
            subcommand = subcommand.about(about.to_string());
        }
        if !positionals.is_empty() {
            subcommand = subcommand.override_usage(format!(
                "{} {name} [OPTIONS] {}",
                self.root.get_name(),
                positionals.join(" ")
            ));
        }

        let mut scope = CommandScope::new(name.clone(), subcommand, false);
        builder(&mut scope)?;
        let (subcommand, arguments) = scope.finish();

        if is_default {
            // Works on a copy so a failing callback leaves the root as it was.
            let mut scope = CommandScope::new(name.clone(), self.root.clone(), true);
            builder(&mut scope)?;
            let (root, root_arguments) = scope.finish();

            self.root = root
                .subcommand_negates_reqs(true)
                .arg(
                    Arg::new(UNLABELED_ID)
                        .value_name("ARGS")
                        .num_args(1..)
                        .action(ArgAction::Append)
                        .value_parser(clap::value_parser!(String))
                        .hide(true),
                );
            self.root_arguments = root_arguments;
            self.default_command = Some(name.clone());
        }

        self.root = std::mem::take(&mut self.root).subcommand(subcommand);
        debug!(command = name.as_str(), usage, is_default, "Registered command");
        self.commands.push(RegisteredCommand {
            name,
            usage: usage.to_string(),
            arguments,
        });
        Ok(())
    }

    /// Parses the process command line.
    pub fn go(&self) -> std::result::Result<ParsedArguments, clap::Error> {
        self.parse_from(std::env::args_os())
    }

    /// Parses `args`, which do not include the binary name.
    pub fn parse<I, T>(&self, args: I) -> std::result::Result<ParsedArguments, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let line = std::iter::once(OsString::from(self.name())).chain(args.into_iter().map(Into::into));
        self.parse_from(line)
    }

    /// Parses `args`, whose first element is the binary name.
    ///
    /// Rejected command lines are reported to the fail hook of the addressed
    /// command before the error is returned. Help and version requests are
    /// returned without running a fail hook.
    pub fn parse_from<I, T>(&self, args: I) -> std::result::Result<ParsedArguments, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        match self.root.clone().try_get_matches_from(args.iter().cloned()) {
            Ok(matches) => Ok(self.collect(&matches)),
            Err(error) => {
                if !is_display_request(&error) {
                    self.report_failure(&args, &error);
                }
                Err(error)
            }
        }
    }

    fn collect(&self, matches: &ArgMatches) -> ParsedArguments {
        let mut parsed = ParsedArguments::default();
        match matches.subcommand() {
            Some((name, sub_matches)) => {
                parsed.command = Some(name.to_string());
                if let Some(command) = self.find(name) {
                    collect_values(sub_matches, &command.arguments, &mut parsed.values);
                }
            }
            None => {
                parsed.command = self.default_command.clone();
                collect_values(matches, &self.root_arguments, &mut parsed.values);
                if let Ok(Some(values)) = matches.try_get_many::<String>(UNLABELED_ID) {
                    parsed.unlabeled = values.cloned().collect();
                }
            }
        }
        parsed
    }

    /// First non-flag token naming a registered command.
    fn addressed_command(&self, args: &[OsString]) -> Option<&str> {
        args.iter()
            .skip(1)
            .filter_map(|arg| arg.to_str())
            .filter(|token| !starts_with_any(&["-"], token))
            .find_map(|token| self.find(token).map(|c| c.name.as_str()))
    }

    fn hook_for(&self, command: &str) -> Option<&FailHook> {
        self.fail_hooks
            .iter()
            .find(|(name, _)| name == command)
            .map(|(_, hook)| hook)
    }

    fn report_failure(&self, args: &[OsString], error: &clap::Error) {
        let hook = self
            .addressed_command(args)
            .and_then(|command| self.hook_for(command))
            .or_else(|| self.default_command.as_deref().and_then(|command| self.hook_for(command)))
            .or_else(|| self.fail_hooks.last().map(|(_, hook)| hook));

        match hook {
            Some(hook) => hook(&error.to_string(), error, self),
            None => debug!(kind = ?error.kind(), "Command line rejected without a fail hook"),
        }
    }
}

fn is_display_request(error: &clap::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    fn def(value: Value) -> ArgumentDefinition {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_positional_and_option() {
        let mut instance = ParserInstance::new("app");
        instance
            .command("copy <from> [to]", Some("Copy file"), |scope| {
                scope.positional("from", &def(json!({"demandOption": true})))?;
                scope.positional("to", &def(json!({})))?;
                scope.option("log", &def(json!({"alias": "l"})))
            })
            .unwrap();

        let parsed = instance.parse(["copy", "A", "B", "-l", "fs.log"]).unwrap();
        assert_eq!(parsed.command.as_deref(), Some("copy"));
        assert_eq!(parsed.get_str("from"), Some("A"));
        assert_eq!(parsed.get_str("to"), Some("B"));
        assert_eq!(parsed.get_str("log"), Some("fs.log"));
        assert_eq!(parsed.get_str("l"), Some("fs.log"));
        assert_eq!(instance.usage("copy"), Some("copy <from> [to]"));
    }

    #[test]
    fn test_duplicate_command_is_error() {
        let mut instance = ParserInstance::new("app");
        instance.command("copy", None, |_| Ok(())).unwrap();
        let err = instance.command("copy", None, |_| Ok(())).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateCommand(name) if name == "copy"));
    }

    #[test]
    fn test_second_default_command_is_error() {
        let mut instance = ParserInstance::new("app");
        instance.default_command_with("list", None, |_| Ok(())).unwrap();
        let err = instance
            .default_command_with("show", None, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, BuildError::MultipleDefaultCommands(names) if names == ["list", "show"]));
    }

    #[test]
    fn test_argument_name_collisions() {
        let mut instance = ParserInstance::new("app");
        let err = instance
            .command("copy", None, |scope| {
                scope.option("log", &def(json!({"alias": "l"})))?;
                scope.option("level", &def(json!({"alias": "l"})))
            })
            .unwrap_err();
        assert!(matches!(err, BuildError::MalformedArgument { argument, .. } if argument == "level"));

        let err = instance
            .command("move", None, |scope| scope.option("host", &def(json!({"alias": "h"}))))
            .unwrap_err();
        assert!(matches!(err, BuildError::MalformedArgument { .. }));
    }

    #[test]
    fn test_required_positional_after_optional_is_error() {
        let mut instance = ParserInstance::new("app");
        let err = instance
            .command("copy [from] <to>", None, |scope| {
                scope.positional("from", &def(json!({})))?;
                scope.positional("to", &def(json!({"demandOption": true})))
            })
            .unwrap_err();
        assert!(matches!(err, BuildError::RequiredPositionalAfterOptional { argument, .. } if argument == "to"));
    }

    #[test]
    fn test_constraint_on_unknown_argument_is_error() {
        let mut instance = ParserInstance::new("app");
        let err = instance
            .command("copy", None, |scope| {
                scope.option("log", &def(json!({})))?;
                scope.conflicts("log", "print")
            })
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownArgumentRef { argument, .. } if argument == "print"));
    }

    #[test]
    fn test_fail_hook_receives_rejections() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let mut instance = ParserInstance::new("app");
        instance
            .command("copy", None, |scope| {
                scope.option("log", &def(json!({"type": "boolean"})))?;
                scope.option("print", &def(json!({"type": "boolean"})))?;
                scope.conflicts("log", "print")
            })
            .unwrap();
        let sink = Arc::clone(&messages);
        instance.fail("copy", move |message, error, inst| {
            sink.lock()
                .unwrap()
                .push((message.to_string(), error.kind(), inst.name().to_string()));
        });

        assert!(instance.parse(["copy", "--log"]).is_ok());
        assert!(messages.lock().unwrap().is_empty());

        let err = instance.parse(["copy", "--log", "--print"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
        let recorded = messages.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].1, ErrorKind::ArgumentConflict);
        assert_eq!(recorded[0].2, "app");
    }

    #[test]
    fn test_help_request_skips_fail_hook() {
        let calls = Arc::new(Mutex::new(0usize));
        let mut instance = ParserInstance::new("app");
        instance.command("copy", Some("Copy file"), |_| Ok(())).unwrap();
        let counter = Arc::clone(&calls);
        instance.fail("copy", move |_, _, _| *counter.lock().unwrap() += 1);

        let err = instance.parse(["copy", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_default_command_binds_options_at_root() {
        let mut instance = ParserInstance::new("app");
        instance
            .default_command_with("list [filter]", None, |scope| {
                scope.positional("filter", &def(json!({})))?;
                scope.option("all", &def(json!({"type": "boolean", "alias": "a"})))
            })
            .unwrap();

        let named = instance.parse(["list", "rs", "--all"]).unwrap();
        assert_eq!(named.command.as_deref(), Some("list"));
        assert_eq!(named.get_str("filter"), Some("rs"));
        assert_eq!(named.get_bool("all"), Some(true));
        assert!(named.unlabeled.is_empty());

        let unnamed = instance.parse(["-a", "rs"]).unwrap();
        assert_eq!(unnamed.command.as_deref(), Some("list"));
        assert_eq!(unnamed.get_bool("a"), Some(true));
        assert_eq!(unnamed.get("filter"), None);
        assert_eq!(unnamed.unlabeled, vec!["rs"]);
    }

    #[test]
    fn test_failed_default_command_leaves_root_untouched() {
        let mut instance = ParserInstance::new("app");
        let err = instance
            .default_command_with("list", None, |scope| {
                scope.option("all", &def(json!({"type": "boolean"})))?;
                if scope.is_root() {
                    return Err(BuildError::MalformedDescriptor("root rejected".to_string()));
                }
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, BuildError::MalformedDescriptor(_)));
        assert_eq!(instance.root().get_arguments().count(), 0);
        assert_eq!(instance.default_command(), None);
        assert_eq!(instance.command_names().count(), 0);

        instance
            .default_command_with("tree", None, |scope| {
                scope.option("all", &def(json!({"type": "boolean"})))
            })
            .unwrap();
        let parsed = instance.parse(["--all"]).unwrap();
        assert_eq!(parsed.command.as_deref(), Some("tree"));
        assert_eq!(parsed.get_bool("all"), Some(true));
    }

    #[test]
    fn test_no_command_without_default() {
        let mut instance = ParserInstance::new("app");
        instance.command("copy", None, |_| Ok(())).unwrap();
        let parsed = instance.parse(Vec::<String>::new()).unwrap();
        assert_eq!(parsed.command, None);
        assert!(parsed.values.is_empty());
    }

    #[test]
    fn test_typed_values() {
        let mut instance = ParserInstance::new("app");
        instance
            .command("run", None, |scope| {
                scope.option("jobs", &def(json!({"type": "number"})))?;
                scope.option("ratio", &def(json!({"type": "number"})))?;
                scope.option("v", &def(json!({"type": "count"})))?;
                scope.option("tag", &def(json!({"type": "array"})))?;
                scope.option("dry", &def(json!({"type": "boolean"})))?;
                scope.option("mode", &def(json!({"default": "fast"})))
            })
            .unwrap();

        let parsed = instance
            .parse(["run", "--jobs", "4", "--ratio", "0.5", "-vvv", "--tag", "a", "b"])
            .unwrap();
        assert_eq!(parsed.get("jobs"), Some(&json!(4)));
        assert_eq!(parsed.get_f64("ratio"), Some(0.5));
        assert_eq!(parsed.get("v"), Some(&json!(3)));
        assert_eq!(parsed.get("tag"), Some(&json!(["a", "b"])));
        assert_eq!(parsed.get_bool("dry"), Some(false));
        assert_eq!(parsed.get_str("mode"), Some("fast"));
    }
}
