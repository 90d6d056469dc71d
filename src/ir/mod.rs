//! Intermediate representation produced by the lowering pass.

pub mod channel;
pub mod fragment;
pub mod render;
pub mod tree;

pub use channel::{ChannelAllocator, ChannelId, Endpoint};
pub use fragment::{Fragment, FragmentNode, Stage};
pub use tree::{Lowered, LoweredArgument, Tree};
