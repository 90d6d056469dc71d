//! Pipeline fragments: connected runs of stages.
//!
//! A fragment's stages may run concurrently. Stage `i`'s output channel is
//! stage `i + 1`'s input channel, and the fragment's own input and output are
//! the first stage's input and the last stage's output. Opaque tree nodes can
//! sit inside a fragment; their ends are [`Endpoint::Unbound`].

use serde::Serialize;

use super::channel::{ChannelId, Endpoint};
use super::tree::{Lowered, LoweredArgument, Tree};
use crate::error::{Error, Result};
use crate::parse::{Assignment, Redirection};

/// One command inside a fragment, bound to an input and an output channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub name: LoweredArgument,
    pub options: Vec<LoweredArgument>,
    pub input: ChannelId,
    pub output: ChannelId,
    /// Prefix assignments (`FOO=1 cmd`), lowered but not interpreted.
    pub assignments: Vec<Assignment<Lowered>>,
    /// Redirections, carried but not yet applied to the channels.
    pub redirs: Vec<Redirection>,
}

/// An element of a fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FragmentNode {
    Stage(Stage),
    /// A tree node placed in a pipeline position, with no channels of its own.
    Opaque(Tree),
}

impl FragmentNode {
    pub fn input(&self) -> Endpoint {
        match self {
            FragmentNode::Stage(s) => Endpoint::Bound(s.input),
            FragmentNode::Opaque(_) => Endpoint::Unbound,
        }
    }

    pub fn output(&self) -> Endpoint {
        match self {
            FragmentNode::Stage(s) => Endpoint::Bound(s.output),
            FragmentNode::Opaque(_) => Endpoint::Unbound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    nodes: Vec<FragmentNode>,
    input: Endpoint,
    output: Endpoint,
}

impl Fragment {
    /// A fragment holding exactly one stage; its ends are the stage's ends.
    pub fn single_stage(stage: Stage) -> Self {
        Self {
            input: Endpoint::Bound(stage.input),
            output: Endpoint::Bound(stage.output),
            nodes: vec![FragmentNode::Stage(stage)],
        }
    }

    /// Wrap a tree node as a one-element fragment with unbound ends.
    pub fn opaque(tree: Tree) -> Self {
        Self {
            nodes: vec![FragmentNode::Opaque(tree)],
            input: Endpoint::Unbound,
            output: Endpoint::Unbound,
        }
    }

    pub fn nodes(&self) -> &[FragmentNode] {
        &self.nodes
    }

    pub fn input(&self) -> Endpoint {
        self.input
    }

    pub fn output(&self) -> Endpoint {
        self.output
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The command stages, skipping opaque nodes.
    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.nodes.iter().filter_map(|n| match n {
            FragmentNode::Stage(s) => Some(s),
            FragmentNode::Opaque(_) => None,
        })
    }

    /// Append `other` after this fragment, piping our output into its input.
    ///
    /// When both ends are bound, `other`'s head stage reads from our output
    /// channel. Otherwise the boundary stays unbound.
    pub fn splice(&mut self, mut other: Fragment) {
        match (self.output, other.input) {
            (Endpoint::Bound(out), Endpoint::Bound(old_in)) => {
                if let Some(FragmentNode::Stage(head)) = other.nodes.first_mut()
                    && head.input == old_in
                {
                    head.input = out;
                }
                other.input = Endpoint::Bound(out);
                log::debug!("spliced fragment: {old_in} rebound to {out}");
            }
            (out, inp) => {
                log::debug!("spliced fragment across unbound boundary ({out} -> {inp})");
            }
        }
        if self.nodes.is_empty() {
            self.input = other.input;
        }
        self.nodes.append(&mut other.nodes);
        self.output = other.output;
    }

    /// Number of internal boundaries where at least one side is unbound.
    pub fn unbound_boundaries(&self) -> usize {
        self.nodes
            .windows(2)
            .filter(|w| !(w[0].output().is_bound() && w[1].input().is_bound()))
            .count()
    }

    /// Check the connectivity invariant.
    pub fn verify(&self) -> Result<()> {
        let (Some(first), Some(last)) = (self.nodes.first(), self.nodes.last()) else {
            return Err(Error::invariant("fragment has no stages"));
        };
        if first.input() != self.input {
            return Err(Error::invariant(format!(
                "fragment input {} does not match first stage input {}",
                self.input,
                first.input()
            )));
        }
        if last.output() != self.output {
            return Err(Error::invariant(format!(
                "fragment output {} does not match last stage output {}",
                self.output,
                last.output()
            )));
        }
        for (i, pair) in self.nodes.windows(2).enumerate() {
            if let (Endpoint::Bound(out), Endpoint::Bound(inp)) = (pair[0].output(), pair[1].input())
                && out != inp
            {
                return Err(Error::invariant(format!(
                    "stage {i} writes {out} but stage {} reads {inp}",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}
