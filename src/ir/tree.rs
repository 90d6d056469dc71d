//! Lowered values: either a tree node or a pipeline fragment.

use serde::Serialize;

use super::fragment::Fragment;
use crate::parse::{Argument, Assignment, Redirection};

/// Result of lowering one AST node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Lowered {
    Tree(Tree),
    Fragment(Fragment),
}

impl Lowered {
    pub fn as_fragment(&self) -> Option<&Fragment> {
        match self {
            Lowered::Fragment(f) => Some(f),
            Lowered::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Lowered::Tree(t) => Some(t),
            Lowered::Fragment(_) => None,
        }
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self, Lowered::Fragment(_))
    }
}

/// A lowered node that keeps its syntax-tree shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Tree {
    /// An assignment-only statement; there is no process to wire.
    Command {
        line_no: u32,
        assignments: Vec<Assignment<Lowered>>,
        redirs: Vec<Redirection>,
    },
    And(Box<Lowered>, Box<Lowered>),
    Or(Box<Lowered>, Box<Lowered>),
    Semi(Box<Lowered>, Box<Lowered>),
    Redir {
        line_no: u32,
        node: Box<Tree>,
        redirs: Vec<Redirection>,
    },
    Subshell {
        line_no: u32,
        node: Box<Tree>,
        redirs: Vec<Redirection>,
    },
    Defun {
        line_no: u32,
        name: String,
        body: Box<Lowered>,
    },
}

/// Lowered form of a command argument.
pub type LoweredArgument = Argument<Lowered>;
