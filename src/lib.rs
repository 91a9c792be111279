//! Position-preserving script extraction for single-file components.
//!
//! Transforms an SFC document (markup, style, and script sections mixed
//! in one file) into a script-only source buffer whose line and byte
//! offsets match the original document, plus the script kind a
//! downstream language front-end should re-parse that buffer under.

#![warn(clippy::all, clippy::pedantic)]

pub mod file_processor;
pub mod scanner;
pub mod syntax;
pub mod tokenizer;
pub mod transform;

pub use syntax::ScriptKind;
pub use transform::{transform, transform_with_options, TransformOptions, TransformResult};
