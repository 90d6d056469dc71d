//! shlower: the front-end lowering stage of a shell-script parallelizing compiler.
//!
//! This crate takes parsed shell syntax trees and rewrites them into an IR in
//! which independently schedulable pipeline stages are explicit. Each stage is
//! bound to an input and an output channel identifier; a downstream scheduler
//! may run the stages of one [`ir::Fragment`] concurrently.
//!
//! # Architecture
//!
//! - **[`parse`]** — Bracket-dialect reader and typed AST, with shape checks.
//! - **[`lower`]** — The recursive lowering pass, pipeline merging, arity contracts.
//! - **[`ir`]** — Channels, fragments, lowered tree nodes, rendering.
//! - **[`config`]** — Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]** — Logger setup for the binary.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Error type shared by every stage.
pub mod error;
/// Lowered IR: channels, fragments, tree nodes.
pub mod ir;
/// Logger initialization.
pub mod logging;
/// AST to IR lowering.
pub mod lower;
/// AST reading: bracket dialect, typed nodes, decoding.
pub mod parse;

pub use error::{Error, Result};

use ir::Lowered;
use lower::LowerOptions;

/// Parse, decode, and lower a whole dialect dump with default options.
///
/// This is the main entry point for tests and simple usage.
pub fn lower_str(text: &str) -> Result<Vec<Lowered>> {
    lower_str_with(text, LowerOptions::default())
}

/// Parse, decode, and lower a whole dialect dump as one compilation run.
///
/// Every top-level node is decoded before any lowering starts, so a malformed
/// node anywhere in the input yields an error and no output.
pub fn lower_str_with(text: &str, options: LowerOptions) -> Result<Vec<Lowered>> {
    let nodes = parse::parse_ast(text)?
        .iter()
        .map(parse::decode_node)
        .collect::<Result<Vec<_>>>()?;
    lower::lower_script(&nodes, options)
}
