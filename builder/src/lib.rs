//! clap parser construction from declarative command trees.
//!
//! [`CommandTreeBuilder`] takes raw command descriptors (see
//! `command_tree_core`), adapts them and registers each one on a
//! [`ParserInstance`], which wraps a root [`clap::Command`]. Registration
//! goes through overridable handlers ([`BuildHandlers`]): one per argument,
//! one before and one after each command, and one for rejected command lines.
//!
//! # Example
//!
//! ```
//! use command_tree_builder::{BuildHandlers, ParserInstance, construct};
//! use command_tree_core::ConversionSchema;
//! use serde_json::json;
//!
//! let mut builder = construct(
//!     ParserInstance::new("fs"),
//!     ConversionSchema::default(),
//!     BuildHandlers::default(),
//! );
//! builder
//!     .build_command(&json!({
//!         "name": "copy",
//!         "describe": "Copy file",
//!         "positional": "from to",
//!         "_children": [{
//!             "_": "Arguments",
//!             "_children": {
//!                 "from": { "name": "from", "_": "Argument", "demandOption": true },
//!                 "to": { "name": "to", "_": "Argument", "demandOption": true },
//!                 "log": { "name": "log", "_": "Argument", "alias": "l" }
//!             }
//!         }]
//!     }))
//!     .unwrap();
//!
//! let parsed = builder.parse(["copy", "a.txt", "b.txt", "-l", "copy.log"]).unwrap();
//! assert_eq!(parsed.command.as_deref(), Some("copy"));
//! assert_eq!(parsed.get_str("to"), Some("b.txt"));
//! assert_eq!(parsed.get_str("l"), Some("copy.log"));
//! ```

mod builder;
mod builder_impl;
mod handlers;
mod instance;
mod register;

pub use builder::{CommandTreeBuilder, construct};
pub use builder_impl::{BuilderImpl, decorate_positional_def, handle_validation_groups};
pub use handlers::{
    BuildHandlers, CommandHandler, FailContext, FailHandler, HandlerOverrides, OptionHandler,
    OptionRequest,
};
pub use instance::{CommandScope, FailHook, ParsedArguments, ParserInstance, UNLABELED_ID};
pub use register::{RegisteredArgument, ValueShape};
