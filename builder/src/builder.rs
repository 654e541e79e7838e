//! Builder facade: adapt, then register, one command or a whole collective.

use std::ffi::OsString;

use command_tree_core::{
    Adapter, BuildError, CommandAdapter, ConversionSchema, Result, view_path,
};
use serde_json::Value;
use tracing::debug;

use crate::builder_impl::BuilderImpl;
use crate::handlers::{BuildHandlers, HandlerOverrides};
use crate::instance::{ParsedArguments, ParserInstance};

/// Builds a [`ParserInstance`] from raw command descriptors.
///
/// Each command is adapted with the configured [`CommandAdapter`] and then
/// registered by the configured [`BuilderImpl`].
///
/// # Examples
///
/// ```
/// use command_tree_builder::{BuildHandlers, CommandTreeBuilder, ParserInstance};
/// use command_tree_core::ConversionSchema;
/// use serde_json::json;
///
/// let mut builder = CommandTreeBuilder::new(
///     ParserInstance::new("fs"),
///     ConversionSchema::default(),
///     BuildHandlers::default(),
/// );
/// builder
///     .build_all_commands(&json!({
///         "commands": [
///             { "name": "list", "_children": [] },
///             { "name": "remove", "_children": [] }
///         ]
///     }))
///     .unwrap();
///
/// let names: Vec<_> = builder.instance().command_names().collect();
/// assert_eq!(names, vec!["list", "remove"]);
/// ```
pub struct CommandTreeBuilder {
    instance: ParserInstance,
    schema: ConversionSchema,
    adapter: Box<dyn CommandAdapter>,
    imp: BuilderImpl,
}

impl CommandTreeBuilder {
    /// Creates a builder with the default [`Adapter`] and [`BuilderImpl`] for
    /// `schema`.
    pub fn new(instance: ParserInstance, schema: ConversionSchema, handlers: BuildHandlers) -> Self {
        Self {
            instance,
            adapter: Box::new(Adapter::new(schema.clone())),
            imp: BuilderImpl::new(schema.clone(), handlers),
            schema,
        }
    }

    /// Replaces the adapter.
    pub fn with_adapter(mut self, adapter: impl CommandAdapter + 'static) -> Self {
        self.adapter = Box::new(adapter);
        self
    }

    /// Replaces the builder implementation.
    pub fn with_impl(mut self, imp: BuilderImpl) -> Self {
        self.imp = imp;
        self
    }

    pub fn schema(&self) -> &ConversionSchema {
        &self.schema
    }

    pub fn instance(&self) -> &ParserInstance {
        &self.instance
    }

    pub fn instance_mut(&mut self) -> &mut ParserInstance {
        &mut self.instance
    }

    pub fn into_instance(self) -> ParserInstance {
        self.instance
    }

    /// Adapts and registers one command with the builder's handlers.
    pub fn build_command(&mut self, command: &Value) -> Result<&mut ParserInstance> {
        self.build_command_with(command, &HandlerOverrides::default())
    }

    /// Adapts and registers one command; handlers set in `overrides` apply
    /// to this command only.
    pub fn build_command_with(
        &mut self,
        command: &Value,
        overrides: &HandlerOverrides,
    ) -> Result<&mut ParserInstance> {
        let adapted = self.adapter.adapt(command);
        self.imp.build_command(&mut self.instance, &adapted, overrides)?;
        Ok(&mut self.instance)
    }

    /// Registers every command of the collective found in `container` at the
    /// schema's collective path.
    pub fn build_all_commands(&mut self, container: &Value) -> Result<&mut ParserInstance> {
        self.build_all_commands_with(container, &HandlerOverrides::default())
    }

    /// Registers every command of the collective with `overrides` applied to
    /// each of them.
    ///
    /// The collective may be an array or an object. Object members are built
    /// in document order.
    ///
    /// # Errors
    ///
    /// - [`BuildError::CollectiveNotFound`] if nothing (or `null`) is at the
    ///   collective path.
    /// - [`BuildError::CollectiveMalformed`] if the collective is neither an
    ///   array nor an object.
    /// - [`BuildError::MultipleDefaultCommands`] if more than one command is
    ///   marked default. Nothing is registered in that case.
    pub fn build_all_commands_with(
        &mut self,
        container: &Value,
        overrides: &HandlerOverrides,
    ) -> Result<&mut ParserInstance> {
        let path = self.schema.paths.collective.clone();
        let commands: Vec<&Value> = match view_path(container, &path) {
            None | Some(Value::Null) => return Err(BuildError::CollectiveNotFound(path)),
            Some(Value::Array(commands)) => commands.iter().collect(),
            Some(Value::Object(commands)) => commands.values().collect(),
            Some(_) => return Err(BuildError::CollectiveMalformed(path)),
        };

        let name_id = &self.schema.labels.command_name_id;
        let defaults: Vec<String> = commands
            .iter()
            .filter(|command| command.get("default").and_then(Value::as_bool) == Some(true))
            .map(|command| {
                command
                    .get(name_id)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect();
        if defaults.len() > 1 {
            return Err(BuildError::MultipleDefaultCommands(defaults));
        }

        debug!(path = path.as_str(), count = commands.len(), "Building collective");
        for command in commands {
            self.build_command_with(command, overrides)?;
        }
        Ok(&mut self.instance)
    }

    /// Parses the process command line.
    pub fn go(&self) -> std::result::Result<ParsedArguments, clap::Error> {
        self.instance.go()
    }

    /// Parses `args`, which do not include the binary name.
    pub fn parse<I, T>(&self, args: I) -> std::result::Result<ParsedArguments, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.instance.parse(args)
    }

    /// Parses `args`, whose first element is the binary name.
    pub fn parse_from<I, T>(&self, args: I) -> std::result::Result<ParsedArguments, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.instance.parse_from(args)
    }
}

/// Creates a [`CommandTreeBuilder`] with the default adapter and
/// implementation.
pub fn construct(
    instance: ParserInstance,
    schema: ConversionSchema,
    handlers: BuildHandlers,
) -> CommandTreeBuilder {
    CommandTreeBuilder::new(instance, schema, handlers)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Passthrough;

    impl CommandAdapter for Passthrough {
        fn adapt(&self, command: &Value) -> Value {
            command.clone()
        }
    }

    fn builder() -> CommandTreeBuilder {
        construct(
            ParserInstance::new("fs"),
            ConversionSchema::default(),
            BuildHandlers::default(),
        )
    }

    fn command_with_argument(name: &str, argument: Value) -> Value {
        json!({
            "name": name,
            "_children": [ { "_": "Arguments", "_children": { "owner": argument } } ]
        })
    }

    #[test]
    fn test_build_command_strips_excluded_keys() {
        let mut builder = builder();
        let raw = command_with_argument("chown", json!({"name": "owner", "_": "Argument", "alias": "o"}));
        builder.build_command(&raw).unwrap();

        let parsed = builder.parse(["chown", "-o", "root"]).unwrap();
        assert_eq!(parsed.get_str("owner"), Some("root"));
        assert_eq!(parsed.get_str("o"), Some("root"));
    }

    #[test]
    fn test_with_adapter_replaces_adapter() {
        let mut builder = builder().with_adapter(Passthrough);
        let raw = command_with_argument("chown", json!({"name": "owner", "_": "Argument"}));
        builder.build_command(&raw).unwrap();

        let parsed = builder.parse(["chown", "--owner", "root"]).unwrap();
        assert_eq!(parsed.get_str("owner"), Some("root"));
    }

    #[test]
    fn test_collective_missing_or_null() {
        let err = builder().build_all_commands(&json!({})).unwrap_err();
        assert!(matches!(err, BuildError::CollectiveNotFound(path) if path == "commands"));

        let err = builder().build_all_commands(&json!({"commands": null})).unwrap_err();
        assert!(matches!(err, BuildError::CollectiveNotFound(_)));
    }

    #[test]
    fn test_collective_scalar_is_malformed() {
        let err = builder()
            .build_all_commands(&json!({"commands": "hello"}))
            .unwrap_err();
        assert!(matches!(err, BuildError::CollectiveMalformed(path) if path == "commands"));
    }

    #[test]
    fn test_collective_nested_path() {
        let schema: ConversionSchema =
            ConversionSchema::from_json_str(r#"{"paths": {"collective": "spec/commands"}}"#).unwrap();
        let mut builder = construct(ParserInstance::new("fs"), schema, BuildHandlers::default());
        builder
            .build_all_commands(&json!({"spec": {"commands": [ { "name": "list" } ]}}))
            .unwrap();
        assert_eq!(builder.instance().command_names().collect::<Vec<_>>(), vec!["list"]);
    }

    #[test]
    fn test_multiple_defaults_rejected_before_building() {
        let mut builder = builder();
        let err = builder
            .build_all_commands(&json!({"commands": [
                { "name": "list", "default": true },
                { "name": "show" },
                { "name": "tree", "default": true }
            ]}))
            .unwrap_err();
        assert!(matches!(err, BuildError::MultipleDefaultCommands(names) if names == ["list", "tree"]));
        assert_eq!(builder.instance().command_names().count(), 0);
    }

    #[test]
    fn test_into_instance_keeps_registrations() {
        let mut builder = builder();
        builder.build_command(&json!({"name": "list"})).unwrap();
        let instance = builder.into_instance();
        assert_eq!(instance.usage("list"), Some("list"));
    }
}
