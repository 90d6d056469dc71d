//! Per-construct arity contracts, checked before a construct is lowered.

use crate::error::{Error, Result};
use crate::parse::Construct;

/// A pipeline joins at least this many items.
pub const MIN_PIPE_ITEMS: usize = 2;

/// Number of arguments the front end emits for each construct.
pub fn arity(construct: Construct) -> usize {
    match construct {
        Construct::Pipe | Construct::And | Construct::Or | Construct::Semi => 2,
        Construct::Redir | Construct::Subshell | Construct::Background | Construct::Defun => 3,
        Construct::Command => 4,
    }
}

/// Fail unless `found` matches the construct's argument count.
pub fn check_arity(construct: Construct, found: usize) -> Result<()> {
    let expected = arity(construct);
    if found != expected {
        return Err(Error::shape(
            construct.as_str(),
            format!("expected {expected} arguments, found {found}"),
        ));
    }
    Ok(())
}

/// Fail unless a pipeline has enough items to connect.
pub fn check_pipe_items(found: usize) -> Result<()> {
    if found < MIN_PIPE_ITEMS {
        return Err(Error::shape(
            Construct::Pipe.as_str(),
            format!("expected at least {MIN_PIPE_ITEMS} items, found {found}"),
        ));
    }
    Ok(())
}
