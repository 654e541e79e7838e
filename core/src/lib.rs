//! Schema, descriptor model and adapter for declarative command trees.
//!
//! A command tree arrives as a generic JSON-like document produced by an
//! external conversion layer. This crate provides the pieces that prepare it
//! for registration with an argument parser:
//!
//! - [`ConversionSchema`]: names the structural fields of the tree and the
//!   keys to strip from argument definitions.
//! - [`Adapter`]: returns a copy of a command with excluded keys removed.
//! - [`DescriptorReader`]: turns an adapted command into a typed
//!   [`CommandDescriptor`].
//! - [`ArgumentDefinition`]: typed option vocabulary with an open extension
//!   map.
//! - Helpers: [`unique_pairs`], [`starts_with_any`], [`pick_arguments`],
//!   [`find_descendant`], [`view_path`].
//!
//! # Example
//!
//! ```
//! use command_tree_core::*;
//! use serde_json::json;
//!
//! let schema = ConversionSchema::default();
//! let raw = json!({
//!     "name": "copy",
//!     "positional": "to",
//!     "_children": [
//!         { "_": "Arguments", "_children": { "to": { "name": "to", "_": "Argument", "demandOption": true } } }
//!     ]
//! });
//!
//! let adapted = Adapter::new(schema.clone()).adapt(&raw);
//! let command = DescriptorReader::new(&schema.labels).read_command(&adapted).unwrap();
//! let to = command.arguments().unwrap().get("to").unwrap();
//! assert!(to.is_required());
//! assert!(to.extensions.is_empty());
//! ```

mod adapter;
mod definition;
mod descriptor;
mod error;
mod helpers;
mod locate;
mod schema;

pub use adapter::{Adapter, CommandAdapter};
pub use definition::{Aliases, ArgumentDefinition, ArgumentMap, ArgumentType, scalar_to_string};
pub use descriptor::{
    ArgumentContainer, ArgumentRef, CONFLICTS_KIND, CommandDescriptor, DescriptorNode,
    DescriptorReader, IMPLIES_KIND, ValidationGroup,
};
pub use error::{BuildError, Result};
pub use helpers::{PickMode, pick_arguments, split_positional, starts_with_any, unique_pairs, view_path};
pub use locate::{find_descendant, find_descendant_with_index};
pub use schema::{ConversionSchema, Exclusions, Labels, Paths, is_yaml_path};
