//! Decoding of generic JSON values into typed AST nodes.
//!
//! Every node is a single-key object `{"<Construct>": [args…]}`. The shape
//! contract of each construct is checked here, before anything is lowered.

use serde_json::Value;

use super::types::{ArgChar, Argument, Assignment, Construct, Node, Redirection};
use crate::error::{Error, Result};
use crate::lower::shape;

/// Decode one AST node.
pub fn decode_node(value: &Value) -> Result<Node> {
    let (tag, args) = split_tagged(value).ok_or_else(|| {
        Error::shape("node", format!("expected a single-key object, found {value}"))
    })?;
    let construct =
        Construct::from_tag(tag).ok_or_else(|| Error::UnsupportedConstruct(tag.to_string()))?;
    let args = args
        .as_array()
        .ok_or_else(|| Error::shape(construct.as_str(), "arguments must be a list"))?;
    shape::check_arity(construct, args.len())?;

    log::trace!("decoding {construct} node");

    let node = match construct {
        Construct::Pipe => {
            let background = args[0]
                .as_bool()
                .ok_or_else(|| Error::shape("Pipe", "background flag must be a boolean"))?;
            let items = list(construct, &args[1], "items")?;
            shape::check_pipe_items(items.len())?;
            Node::Pipe {
                background,
                items: items.iter().map(decode_node).collect::<Result<_>>()?,
            }
        }
        Construct::Command => Node::Command {
            line_no: line_number(construct, &args[0])?,
            assignments: list(construct, &args[1], "assignments")?
                .iter()
                .map(|a| decode_assignment(construct, a))
                .collect::<Result<_>>()?,
            words: list(construct, &args[2], "words")?
                .iter()
                .map(|w| decode_argument(construct, w))
                .collect::<Result<_>>()?,
            redirs: redirections(construct, &args[3])?,
        },
        Construct::And | Construct::Or | Construct::Semi => {
            let left = Box::new(decode_node(&args[0])?);
            let right = Box::new(decode_node(&args[1])?);
            match construct {
                Construct::And => Node::And(left, right),
                Construct::Or => Node::Or(left, right),
                _ => Node::Semi(left, right),
            }
        }
        Construct::Redir | Construct::Subshell | Construct::Background => {
            let line_no = line_number(construct, &args[0])?;
            let node = Box::new(decode_node(&args[1])?);
            let redirs = redirections(construct, &args[2])?;
            match construct {
                Construct::Redir => Node::Redir {
                    line_no,
                    node,
                    redirs,
                },
                Construct::Subshell => Node::Subshell {
                    line_no,
                    node,
                    redirs,
                },
                _ => Node::Background {
                    line_no,
                    node,
                    redirs,
                },
            }
        }
        Construct::Defun => Node::Defun {
            line_no: line_number(construct, &args[0])?,
            name: args[1]
                .as_str()
                .ok_or_else(|| Error::shape("Defun", "function name must be a string"))?
                .to_string(),
            body: Box::new(decode_node(&args[2])?),
        },
    };
    Ok(node)
}

/// Split `{"Tag": payload}` into its tag and payload.
fn split_tagged(value: &Value) -> Option<(&str, &Value)> {
    let obj = value.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    obj.iter().next().map(|(k, v)| (k.as_str(), v))
}

fn list<'a>(construct: Construct, value: &'a Value, what: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::shape(construct.as_str(), format!("{what} must be a list")))
}

fn line_number(construct: Construct, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            Error::shape(
                construct.as_str(),
                format!("line number must be a non-negative integer, found {value}"),
            )
        })
}

fn redirections(construct: Construct, value: &Value) -> Result<Vec<Redirection>> {
    Ok(list(construct, value, "redirections")?
        .iter()
        .cloned()
        .map(Redirection)
        .collect())
}

fn decode_assignment(construct: Construct, value: &Value) -> Result<Assignment<Node>> {
    match value.as_array().map(Vec::as_slice) {
        Some([name, arg]) => {
            let name = name
                .as_str()
                .ok_or_else(|| Error::shape(construct.as_str(), "assignment name must be a string"))?;
            Ok(Assignment {
                name: name.to_string(),
                value: decode_argument(construct, arg)?,
            })
        }
        _ => Err(Error::shape(
            construct.as_str(),
            format!("assignment must be a [name, value] pair, found {value}"),
        )),
    }
}

/// Decode an argument: a list of argument characters.
pub fn decode_argument(construct: Construct, value: &Value) -> Result<Argument<Node>> {
    list(construct, value, "argument")?
        .iter()
        .map(|c| decode_arg_char(construct, c))
        .collect::<Result<Vec<_>>>()
        .map(Argument)
}

fn decode_arg_char(construct: Construct, value: &Value) -> Result<ArgChar<Node>> {
    let (tag, payload) = split_tagged(value).ok_or_else(|| {
        Error::shape(
            construct.as_str(),
            format!("argument character must be a single-key object, found {value}"),
        )
    })?;
    match tag {
        "C" => payload
            .as_u64()
            .and_then(|code| u32::try_from(code).ok())
            .and_then(char::from_u32)
            .map(ArgChar::Char)
            .ok_or_else(|| {
                Error::shape(
                    construct.as_str(),
                    format!("invalid character code {payload}"),
                )
            }),
        "B" => Ok(ArgChar::Subst(Box::new(decode_node(payload)?))),
        "Q" => Ok(ArgChar::Quoted(decode_argument(construct, payload)?)),
        _ => Ok(ArgChar::Other(value.clone())),
    }
}
