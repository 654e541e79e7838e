//! Error types for descriptor reading and command building.
//!
//! Every variant except the I/O and serialization wrappers describes a
//! configuration mistake in the descriptor tree or the schema. These are
//! surfaced to the CLI author at startup, never routed through a fail handler.

use thiserror::Error;

/// Errors that can occur while reading, adapting or building commands.
#[derive(Debug, Error)]
pub enum BuildError {
    /// File I/O failure while loading a schema or descriptor file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A command descriptor has no identifier field.
    #[error("command descriptor is missing its `{0}` field")]
    MissingCommandName(String),

    /// A descriptor node does not have the shape its kind requires.
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),

    /// An argument definition is not an object, or has invalid known fields.
    #[error("argument `{argument}` of command `{command}` is not correctly defined: {reason}")]
    MalformedArgument {
        command: String,
        argument: String,
        reason: String,
    },

    /// The positional spec names an argument with no definition.
    #[error("positional argument `{argument}` of command `{command}` is not defined")]
    UndefinedPositional { command: String, argument: String },

    /// A required positional follows an optional one.
    #[error(
        "required positional argument `{argument}` of command `{command}` follows an optional one"
    )]
    RequiredPositionalAfterOptional { command: String, argument: String },

    /// A validation group references an argument the command does not define.
    #[error("validation group of command `{command}` references unknown argument `{argument}`")]
    UnknownArgumentRef { command: String, argument: String },

    /// Two commands with the same name were registered on one instance.
    #[error("duplicate command: {0}")]
    DuplicateCommand(String),

    /// More than one command is marked as the default command.
    #[error("more than one default command: {}", .0.join(", "))]
    MultipleDefaultCommands(Vec<String>),

    /// Nothing was found at the configured collective path.
    #[error("couldn't find commands at path: {0}")]
    CollectiveNotFound(String),

    /// The collective path resolved to something other than an array or object.
    #[error("commands found at path: {0} is malformed")]
    CollectiveMalformed(String),
}

/// Convenience alias for results with [`BuildError`].
pub type Result<T> = std::result::Result<T, BuildError>;
