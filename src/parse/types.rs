//! Types produced by the AST reader and consumed by the lowering pass.

use serde::{Serialize, Serializer};

/// The closed set of syntax kinds the lowering pass understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    Pipe,
    Command,
    And,
    Or,
    Semi,
    Redir,
    Subshell,
    Background,
    Defun,
}

impl Construct {
    /// Every supported construct, in table order.
    pub const ALL: [Construct; 9] = [
        Construct::Pipe,
        Construct::Command,
        Construct::And,
        Construct::Or,
        Construct::Semi,
        Construct::Redir,
        Construct::Subshell,
        Construct::Background,
        Construct::Defun,
    ];

    /// The construct's tag as written by the front end.
    pub fn as_str(self) -> &'static str {
        match self {
            Construct::Pipe => "Pipe",
            Construct::Command => "Command",
            Construct::And => "And",
            Construct::Or => "Or",
            Construct::Semi => "Semi",
            Construct::Redir => "Redir",
            Construct::Subshell => "Subshell",
            Construct::Background => "Background",
            Construct::Defun => "Defun",
        }
    }

    /// Look up a construct by its tag. Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == tag)
    }
}

impl std::fmt::Display for Construct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One character of a command argument.
///
/// Generic over the node type so the same shape describes both parsed
/// arguments (`N = Node`) and lowered ones (`N = Lowered`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArgChar<N> {
    /// A literal character (`C`), written back as its code point.
    #[serde(rename = "C", serialize_with = "char_code")]
    Char(char),
    /// A command substitution wrapping a nested command (`B`).
    #[serde(rename = "B")]
    Subst(Box<N>),
    /// A double-quoted group wrapping a nested argument (`Q`).
    #[serde(rename = "Q")]
    Quoted(Argument<N>),
    /// Any other front-end character form (escapes, tilde, variables,
    /// arithmetic). Kept verbatim.
    #[serde(untagged)]
    Other(serde_json::Value),
}

fn char_code<S: Serializer>(ch: &char, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u32(u32::from(*ch))
}

/// A command argument: an ordered sequence of argument characters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Argument<N>(pub Vec<ArgChar<N>>);

impl<N> Argument<N> {
    /// Build an argument made only of literal characters.
    pub fn literal(text: &str) -> Self {
        Argument(text.chars().map(ArgChar::Char).collect())
    }

    /// The literal text of the argument, if it contains nothing but literals.
    pub fn as_literal(&self) -> Option<String> {
        self.0
            .iter()
            .map(|c| match c {
                ArgChar::Char(ch) => Some(*ch),
                _ => None,
            })
            .collect()
    }

    pub fn chars(&self) -> &[ArgChar<N>] {
        &self.0
    }
}

/// A `NAME=value` assignment. The value follows argument rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment<N> {
    pub name: String,
    pub value: Argument<N>,
}

/// A redirection entry, carried through the pass without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Redirection(pub serde_json::Value);

/// A parsed shell syntax node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `a | b | …`; `items` has at least two entries.
    Pipe { background: bool, items: Vec<Node> },
    /// A simple command. Empty `words` means an assignment-only statement.
    Command {
        line_no: u32,
        assignments: Vec<Assignment<Node>>,
        words: Vec<Argument<Node>>,
        redirs: Vec<Redirection>,
    },
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Semi(Box<Node>, Box<Node>),
    Redir {
        line_no: u32,
        node: Box<Node>,
        redirs: Vec<Redirection>,
    },
    Subshell {
        line_no: u32,
        node: Box<Node>,
        redirs: Vec<Redirection>,
    },
    Background {
        line_no: u32,
        node: Box<Node>,
        redirs: Vec<Redirection>,
    },
    Defun {
        line_no: u32,
        name: String,
        body: Box<Node>,
    },
}

impl Node {
    pub fn construct(&self) -> Construct {
        match self {
            Node::Pipe { .. } => Construct::Pipe,
            Node::Command { .. } => Construct::Command,
            Node::And(..) => Construct::And,
            Node::Or(..) => Construct::Or,
            Node::Semi(..) => Construct::Semi,
            Node::Redir { .. } => Construct::Redir,
            Node::Subshell { .. } => Construct::Subshell,
            Node::Background { .. } => Construct::Background,
            Node::Defun { .. } => Construct::Defun,
        }
    }

    /// A command node with no assignments or redirections, one word per entry.
    pub fn simple_command(line_no: u32, words: &[&str]) -> Self {
        Node::Command {
            line_no,
            assignments: Vec::new(),
            words: words.iter().map(|w| Argument::literal(w)).collect(),
            redirs: Vec::new(),
        }
    }
}
