//! Override points for command building.
//!
//! [`BuildHandlers`] always carries all four handlers; `Default` fills each
//! with its documented default and the chained setters replace individual
//! entries. [`HandlerOverrides`] is the partial set accepted by a single
//! build call, resolved against the builder's handlers with
//! [`BuildHandlers::resolve`].

use std::sync::Arc;

use command_tree_core::{ArgumentDefinition, CommandDescriptor, Result};
use tracing::debug;

use crate::instance::{CommandScope, ParserInstance};

/// One argument about to be registered.
#[derive(Debug, Clone, Copy)]
pub struct OptionRequest<'a> {
    pub name: &'a str,
    pub definition: &'a ArgumentDefinition,
    /// `true` if the argument is named in the command's positional spec.
    pub positional: bool,
    /// The adapted command the argument belongs to.
    pub command: &'a CommandDescriptor,
}

impl OptionRequest<'_> {
    /// Performs the default registration: positional arguments with
    /// [`CommandScope::positional`], everything else with
    /// [`CommandScope::option`].
    pub fn register_default(&self, scope: &mut CommandScope) -> Result<()> {
        if self.positional {
            scope.positional(self.name, self.definition)
        } else {
            scope.option(self.name, self.definition)
        }
    }
}

/// Context handed to a fail handler when parsing a command line fails.
pub struct FailContext<'a> {
    pub message: &'a str,
    pub error: &'a clap::Error,
    pub instance: &'a ParserInstance,
    /// The adapted command whose fail handler is running.
    pub command: &'a CommandDescriptor,
}

/// Registers one argument on a command scope.
///
/// For a default command the handler runs twice per argument: once on the
/// command's own scope and once on the root scope. Use
/// [`CommandScope::is_root`] to tell the two apart. Positionals registered
/// on the root scope are recorded as skipped.
pub type OptionHandler = Arc<dyn Fn(&mut CommandScope, &OptionRequest<'_>) -> Result<()> + Send + Sync>;
pub type CommandHandler = Arc<dyn Fn(&mut ParserInstance, &CommandDescriptor) -> Result<()> + Send + Sync>;
pub type FailHandler = Arc<dyn Fn(&FailContext<'_>) + Send + Sync>;

fn default_option_handler() -> OptionHandler {
    Arc::new(|scope: &mut CommandScope, request: &OptionRequest<'_>| {
        request.register_default(scope)
    })
}

fn noop_command_handler() -> CommandHandler {
    Arc::new(|_: &mut ParserInstance, _: &CommandDescriptor| -> Result<()> { Ok(()) })
}

fn default_fail_handler() -> FailHandler {
    Arc::new(|context: &FailContext<'_>| {
        debug!(
            command = context.command.name.as_str(),
            message = context.message,
            "Command line rejected"
        );
    })
}

/// Complete handler set owned by a builder.
///
/// # Examples
///
/// ```
/// use command_tree_builder::BuildHandlers;
///
/// let handlers = BuildHandlers::default().on_option(|scope, request| {
///     // Register everything as a flagged option, even positionals.
///     scope.option(request.name, request.definition)
/// });
/// # let _ = handlers;
/// ```
#[derive(Clone)]
pub struct BuildHandlers {
    pub on_option: OptionHandler,
    pub on_before_command: CommandHandler,
    pub on_after_command: CommandHandler,
    pub on_fail: FailHandler,
}

impl Default for BuildHandlers {
    fn default() -> Self {
        Self {
            on_option: default_option_handler(),
            on_before_command: noop_command_handler(),
            on_after_command: noop_command_handler(),
            on_fail: default_fail_handler(),
        }
    }
}

impl BuildHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_option<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut CommandScope, &OptionRequest<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.on_option = Arc::new(handler);
        self
    }

    pub fn on_before_command<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut ParserInstance, &CommandDescriptor) -> Result<()> + Send + Sync + 'static,
    {
        self.on_before_command = Arc::new(handler);
        self
    }

    pub fn on_after_command<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut ParserInstance, &CommandDescriptor) -> Result<()> + Send + Sync + 'static,
    {
        self.on_after_command = Arc::new(handler);
        self
    }

    pub fn on_fail<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FailContext<'_>) + Send + Sync + 'static,
    {
        self.on_fail = Arc::new(handler);
        self
    }

    /// Returns the handlers to use for one build call: each override that is
    /// set wins over the corresponding handler of `self`.
    pub fn resolve(&self, overrides: &HandlerOverrides) -> BuildHandlers {
        BuildHandlers {
            on_option: overrides
                .on_option
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.on_option)),
            on_before_command: overrides
                .on_before_command
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.on_before_command)),
            on_after_command: overrides
                .on_after_command
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.on_after_command)),
            on_fail: overrides
                .on_fail
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.on_fail)),
        }
    }
}

/// Handlers supplied for a single build call.
#[derive(Clone, Default)]
pub struct HandlerOverrides {
    pub on_option: Option<OptionHandler>,
    pub on_before_command: Option<CommandHandler>,
    pub on_after_command: Option<CommandHandler>,
    pub on_fail: Option<FailHandler>,
}

impl HandlerOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_option<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut CommandScope, &OptionRequest<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.on_option = Some(Arc::new(handler));
        self
    }

    pub fn on_before_command<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut ParserInstance, &CommandDescriptor) -> Result<()> + Send + Sync + 'static,
    {
        self.on_before_command = Some(Arc::new(handler));
        self
    }

    pub fn on_after_command<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut ParserInstance, &CommandDescriptor) -> Result<()> + Send + Sync + 'static,
    {
        self.on_after_command = Some(Arc::new(handler));
        self
    }

    pub fn on_fail<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FailContext<'_>) + Send + Sync + 'static,
    {
        self.on_fail = Some(Arc::new(handler));
        self
    }
}
