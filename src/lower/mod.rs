//! AST to IR lowering.
//!
//! The pass is a recursive walk over [`Node`]s. Commands become single-stage
//! [`Fragment`](crate::ir::Fragment)s with freshly allocated channels,
//! pipelines merge their items into one fragment, and every other construct
//! keeps its tree shape around lowered children.

mod argument;
mod merge;
mod node;
pub mod shape;

pub use merge::merge_pipeline;

use crate::error::Result;
use crate::ir::{ChannelAllocator, Lowered};
use crate::parse::Node;

/// Knobs for one lowering run.
#[derive(Debug, Clone, Copy)]
pub struct LowerOptions {
    /// First channel identifier the run hands out.
    pub first_channel: u64,
    /// Check fragment connectivity after every pipeline merge.
    pub verify_fragments: bool,
}

impl Default for LowerOptions {
    fn default() -> Self {
        Self {
            first_channel: 0,
            verify_fragments: true,
        }
    }
}

/// State of one compilation run: the channel allocator and the options.
#[derive(Debug, Clone)]
pub struct Lowerer {
    channels: ChannelAllocator,
    options: LowerOptions,
}

impl Lowerer {
    pub fn new(options: LowerOptions) -> Self {
        Self {
            channels: ChannelAllocator::starting_at(options.first_channel),
            options,
        }
    }

    pub fn options(&self) -> LowerOptions {
        self.options
    }

    /// Channel identifiers issued so far in this run.
    pub fn channels_issued(&self) -> u64 {
        self.channels.issued_since(self.options.first_channel)
    }
}

impl Default for Lowerer {
    fn default() -> Self {
        Self::new(LowerOptions::default())
    }
}

/// Lower a single program root with a fresh allocator.
pub fn lower_program(root: &Node) -> Result<Lowered> {
    Lowerer::default().lower_node(root)
}

/// Lower every top-level node of one script, sharing one allocator.
pub fn lower_script(nodes: &[Node], options: LowerOptions) -> Result<Vec<Lowered>> {
    let mut lowerer = Lowerer::new(options);
    let lowered = nodes
        .iter()
        .map(|n| lowerer.lower_node(n))
        .collect::<Result<Vec<_>>>()?;
    log::debug!(
        "lowered {} top-level nodes using {} channels",
        lowered.len(),
        lowerer.channels_issued()
    );
    Ok(lowered)
}
