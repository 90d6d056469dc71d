//! Lowering of command arguments and assignments.
//!
//! Literal characters pass through. Substitutions and quoted groups are
//! rewritten to hold their lowered contents.

use super::Lowerer;
use crate::error::Result;
use crate::ir::Lowered;
use crate::parse::{ArgChar, Argument, Assignment, Node};

impl Lowerer {
    pub fn lower_arg_char(&mut self, c: &ArgChar<Node>) -> Result<ArgChar<Lowered>> {
        Ok(match c {
            ArgChar::Char(ch) => ArgChar::Char(*ch),
            ArgChar::Subst(node) => {
                let lowered = self.lower_node(node)?;
                // the captured output still needs a channel; a later pass wires it
                log::debug!("command substitution lowered without output channel");
                ArgChar::Subst(Box::new(lowered))
            }
            ArgChar::Quoted(inner) => ArgChar::Quoted(self.lower_argument(inner)?),
            ArgChar::Other(raw) => ArgChar::Other(raw.clone()),
        })
    }

    pub fn lower_argument(&mut self, arg: &Argument<Node>) -> Result<Argument<Lowered>> {
        arg.chars()
            .iter()
            .map(|c| self.lower_arg_char(c))
            .collect::<Result<Vec<_>>>()
            .map(Argument)
    }

    pub fn lower_arguments(&mut self, args: &[Argument<Node>]) -> Result<Vec<Argument<Lowered>>> {
        args.iter().map(|a| self.lower_argument(a)).collect()
    }

    pub fn lower_assignments(
        &mut self,
        assignments: &[Assignment<Node>],
    ) -> Result<Vec<Assignment<Lowered>>> {
        assignments
            .iter()
            .map(|a| {
                Ok(Assignment {
                    name: a.name.clone(),
                    value: self.lower_argument(&a.value)?,
                })
            })
            .collect()
    }
}
