//! `tags_core` is the core library for the tags markup engine. It expands
//! custom tags written in a small block syntax inside any text document:
//!
//! ```text
//! {% name arg1 'arg two' %}             a tag without a body
//! {% name arg1 %}some body{% endname %} a tag with a body
//! ```
//!
//! Every tag is backed by a handler registered on a [`TagEngine`]. The engine
//! recognizes only registered names and leaves all other text, including
//! unknown tags and stray delimiters, untouched.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Text + Context
//!   -> Grammar (one matcher built from every registered name)
//!   -> Matcher (finds top-level tag occurrences, with raw arguments and body)
//!   -> Lexer (splits the raw arguments into strings)
//!   -> Registry (validates argument count and body presence)
//!   -> Handler (returns replacement text, which is expanded again)
//! ```
//!
//! ## Modules
//!
//! - [`config`] loads `tags.toml`: delimiters, limits, build globs and extra
//!   context values.
//! - [`builtins`] provides the `include` and `is` tags used to build sites.
//! - [`site`] renders a directory of pages into an output directory.
//!
//! ## Key Types
//!
//! - [`TagEngine`] holds the registered tags and expands them in text.
//! - [`TagDefinition`] is a tag name, its handler and the shape of its uses.
//! - [`TagCall`] is what a handler receives for one occurrence.
//! - [`Context`] carries caller values to every handler.
//! - [`TagsError`] is the error type of the crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use tags_core::Context;
//! use tags_core::TagDefinition;
//! use tags_core::TagEngine;
//!
//! let mut engine = TagEngine::new();
//! engine
//! 	.register(TagDefinition::new("upper", |call| Ok(call.body_or_empty().to_uppercase())).body())
//! 	.unwrap();
//!
//! let output = engine
//! 	.parse("say {% upper %}hello{% endupper %}!", &Context::new())
//! 	.unwrap();
//! assert_eq!(output, "say HELLO!");
//! ```

pub use config::*;
pub use context::*;
pub use engine::*;
pub use error::*;
pub use grammar::*;
pub use position::*;
pub use registry::*;

pub mod builtins;
pub mod config;
mod context;
mod engine;
#[allow(unused_assignments)]
mod error;
mod grammar;
pub(crate) mod lexer;
mod position;
mod registry;
pub mod site;

#[cfg(test)]
mod __fixtures;
